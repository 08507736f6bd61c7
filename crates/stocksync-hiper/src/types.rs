//! Response types for the Hiper `produtos/pontoDeSincronizacao` feed.
//!
//! ## Observed shape
//!
//! ### Codes
//! `codigo` and `codigoDeBarras` are usually strings, but some records carry
//! them as bare JSON numbers. Both forms are accepted and kept as strings.
//!
//! ### `quantidadeEmEstoque`
//! A JSON number that may be fractional (`3.0`, `2.5`) and occasionally a
//! numeric string. Fractions are truncated during conversion.
//!
//! ### `marca` / `categoria`
//! Either a plain string or an object `{ "nome": "..." }` depending on the
//! store configuration. [`NamedRef`] accepts both.
//!
//! ### `variantes`
//! Absent or empty for single-size products. When present, each variant has
//! its own codes and stock, and its size lives in `caracteristicas` under a
//! `"Tamanho"` entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Top-level response from `GET /produtos/pontoDeSincronizacao`.
///
/// Records are kept as raw JSON so that a single malformed product does not
/// fail the whole feed; see [`crate::feed::parse_products`].
#[derive(Debug, Deserialize)]
pub struct HiperProductsResponse {
    #[serde(default)]
    pub produtos: Vec<serde_json::Value>,
}

/// Response from `GET /auth/gerar-token/{key}`.
#[derive(Debug, Deserialize)]
pub struct HiperTokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// A brand or category reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NamedRef {
    Name(String),
    Object {
        #[serde(default)]
        nome: Option<String>,
    },
}

impl NamedRef {
    /// The referenced name, or `None` when blank.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            NamedRef::Name(name) => name.as_str(),
            NamedRef::Object { nome } => nome.as_deref()?,
        };
        let name = name.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HiperCharacteristic {
    #[serde(default)]
    pub nome: String,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub valor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperProduct {
    #[serde(default)]
    pub nome: Option<String>,

    #[serde(default, deserialize_with = "deserialize_code")]
    pub codigo: Option<String>,

    /// Used as both SKU and barcode for products without variants.
    #[serde(default, deserialize_with = "deserialize_code")]
    pub codigo_de_barras: Option<String>,

    #[serde(default)]
    pub quantidade_em_estoque: Option<Decimal>,

    #[serde(default)]
    pub preco: Option<Decimal>,

    #[serde(default)]
    pub marca: Option<NamedRef>,

    #[serde(default)]
    pub categoria: Option<NamedRef>,

    #[serde(default)]
    pub variantes: Vec<HiperVariant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperVariant {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub codigo: Option<String>,

    #[serde(default, deserialize_with = "deserialize_code")]
    pub codigo_de_barras: Option<String>,

    #[serde(default)]
    pub quantidade_em_estoque: Option<Decimal>,

    #[serde(default)]
    pub caracteristicas: Vec<HiperCharacteristic>,
}

impl HiperVariant {
    /// Value of the `"Tamanho"` characteristic, matched case-insensitively.
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        self.caracteristicas
            .iter()
            .find(|c| c.nome.trim().eq_ignore_ascii_case("tamanho"))
            .and_then(|c| c.valor.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Accepts a string, an integer, or null; blank strings become `None`.
fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let code = match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a string or number code, got {other}"
            )))
        }
    };
    Ok(code
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_ref_accepts_string_or_object() {
        let brand: NamedRef = serde_json::from_str(r#""Saphira""#).unwrap();
        assert_eq!(brand.name(), Some("Saphira"));
        let brand: NamedRef = serde_json::from_str(r#"{"nome": "Saphira"}"#).unwrap();
        assert_eq!(brand.name(), Some("Saphira"));
        let brand: NamedRef = serde_json::from_str(r#"{"nome": "  "}"#).unwrap();
        assert_eq!(brand.name(), None);
    }

    #[test]
    fn numeric_codes_become_strings() {
        let product: HiperProduct = serde_json::from_str(
            r#"{"nome": "Blusa", "codigoDeBarras": 9990001234567, "quantidadeEmEstoque": 2.0}"#,
        )
        .unwrap();
        assert_eq!(product.codigo_de_barras.as_deref(), Some("9990001234567"));
        assert_eq!(product.quantidade_em_estoque, Some(Decimal::new(2, 0)));
    }

    #[test]
    fn variant_size_comes_from_characteristics() {
        let variant: HiperVariant = serde_json::from_str(
            r#"{"codigo": "C0700136", "caracteristicas": [
                {"nome": "Cor", "valor": "Azul"},
                {"nome": "TAMANHO", "valor": " 38 "}
            ]}"#,
        )
        .unwrap();
        assert_eq!(variant.size(), Some("38"));
    }
}
