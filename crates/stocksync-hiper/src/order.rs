//! Sales-order payload for `POST /pedido-de-venda/`.
//!
//! Field names follow the Hiper wire format; amounts are serialized as JSON
//! numbers.

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperCustomer {
    /// CPF/CNPJ. Storefront orders carry none, so the phone number stands in.
    pub documento: String,
    pub email: String,
    pub inscricao_estadual: String,
    pub nome_do_cliente: String,
    pub nome_fantasia: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperAddress {
    pub bairro: String,
    /// Digits only.
    pub cep: String,
    pub codigo_ibge: u32,
    pub complemento: String,
    pub logradouro: String,
    pub numero: String,
}

impl Default for HiperAddress {
    fn default() -> Self {
        Self {
            bairro: String::new(),
            cep: String::new(),
            codigo_ibge: 0,
            complemento: String::new(),
            logradouro: String::new(),
            numero: "S/N".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperOrderItem {
    /// Left empty: storefront line items do not carry the ERP product id.
    pub produto_id: String,
    pub quantidade: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco_unitario_bruto: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco_unitario_liquido: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperPayment {
    pub id_meio_de_pagamento: u32,
    pub parcelas: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub valor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HiperMarketplace {
    #[serde(rename = "Cnpj")]
    pub cnpj: String,
    #[serde(rename = "Nome")]
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiperOrder {
    pub cliente: HiperCustomer,
    pub endereco_de_cobranca: HiperAddress,
    pub endereco_de_entrega: HiperAddress,
    pub itens: Vec<HiperOrderItem>,
    pub meios_de_pagamento: Vec<HiperPayment>,
    pub numero_pedido_de_venda: String,
    pub observacao_do_pedido_de_venda: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub valor_do_frete: Decimal,
    #[serde(rename = "Marketplace")]
    pub marketplace: HiperMarketplace,
}

impl HiperOrder {
    /// Problems the ERP is known to reject. Empty when the order looks
    /// submittable.
    #[must_use]
    pub fn validation_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.cliente.documento.trim().is_empty() {
            warnings.push("customer document missing".to_owned());
        }
        if self.cliente.email.trim().is_empty() {
            warnings.push("customer email missing".to_owned());
        }
        if self.endereco_de_entrega.cep.trim().is_empty() {
            warnings.push("delivery CEP missing".to_owned());
        }
        if self.itens.is_empty() {
            warnings.push("order has no items".to_owned());
        }
        warnings
    }
}
