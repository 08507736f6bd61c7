//! Conversion of the raw Hiper feed into platform-neutral catalog items.
//!
//! Every product with variants yields one item per variant; a product
//! without variants yields a single item keyed by its barcode. Records that
//! cannot be converted are returned as [`RejectedRecord`]s and never abort
//! the feed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use stocksync_core::{CatalogItem, RejectedRecord};

use crate::types::{HiperProduct, HiperVariant};

/// Source-side catalog for one run.
#[derive(Debug, Default)]
pub struct SourceFeed {
    pub items: Vec<CatalogItem>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parses raw `produtos` entries one at a time, so a malformed record only
/// rejects itself.
#[must_use]
pub fn parse_products(raw: Vec<serde_json::Value>) -> (Vec<HiperProduct>, Vec<RejectedRecord>) {
    let mut products = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (position, value) in raw.into_iter().enumerate() {
        let reference = value
            .get("nome")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("produto #{position}"), str::to_owned);
        match serde_json::from_value::<HiperProduct>(value) {
            Ok(product) => products.push(product),
            Err(e) => rejected.push(RejectedRecord::new(reference, format!("malformed record: {e}"))),
        }
    }

    (products, rejected)
}

/// Flattens parsed products into catalog items.
#[must_use]
pub fn convert_products(products: &[HiperProduct]) -> SourceFeed {
    let mut feed = SourceFeed::default();

    for product in products {
        let Some(name) = product
            .nome
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        else {
            let reference = product
                .codigo_de_barras
                .clone()
                .or_else(|| product.codigo.clone())
                .unwrap_or_else(|| "<unnamed>".to_owned());
            feed.rejected
                .push(RejectedRecord::new(reference, "missing product name"));
            continue;
        };

        if product.variantes.is_empty() {
            match convert_single(product, name) {
                Ok(item) => feed.items.push(item),
                Err(rejected) => feed.rejected.push(rejected),
            }
        } else {
            for variant in &product.variantes {
                match convert_variant(product, name, variant) {
                    Ok(item) => feed.items.push(item),
                    Err(rejected) => feed.rejected.push(rejected),
                }
            }
        }
    }

    tracing::debug!(
        items = feed.items.len(),
        rejected = feed.rejected.len(),
        "converted Hiper feed"
    );

    feed
}

fn convert_single(product: &HiperProduct, name: &str) -> Result<CatalogItem, RejectedRecord> {
    let Some(code) = product
        .codigo_de_barras
        .as_deref()
        .or(product.codigo.as_deref())
    else {
        return Err(RejectedRecord::new(name, "missing codigoDeBarras"));
    };
    let quantity = stock_quantity(product.quantidade_em_estoque)
        .map_err(|reason| RejectedRecord::new(code, reason))?;

    let mut item = CatalogItem::new(name, quantity)
        .with_sku(code)
        .with_barcode(code);
    apply_product_fields(&mut item, product);
    Ok(item)
}

fn convert_variant(
    product: &HiperProduct,
    name: &str,
    variant: &HiperVariant,
) -> Result<CatalogItem, RejectedRecord> {
    let sku = variant
        .codigo
        .as_deref()
        .or(variant.codigo_de_barras.as_deref());
    let Some(sku) = sku else {
        return Err(RejectedRecord::new(name, "variant has no codigo or codigoDeBarras"));
    };
    let quantity = stock_quantity(variant.quantidade_em_estoque)
        .map_err(|reason| RejectedRecord::new(sku, reason))?;

    let mut item = CatalogItem::new(name, quantity).with_sku(sku);
    if let Some(barcode) = variant.codigo_de_barras.as_deref() {
        item = item.with_barcode(barcode);
    }
    if let Some(size) = variant.size() {
        item = item.with_size(size);
    }
    apply_product_fields(&mut item, product);
    Ok(item)
}

fn apply_product_fields(item: &mut CatalogItem, product: &HiperProduct) {
    item.brand = product
        .marca
        .as_ref()
        .and_then(|m| m.name())
        .map(str::to_owned);
    item.category = product
        .categoria
        .as_ref()
        .and_then(|c| c.name())
        .map(str::to_owned);
    item.price = product.preco.map(|p| p.normalize().to_string());
}

/// Missing stock counts as zero; fractions are truncated toward zero.
fn stock_quantity(raw: Option<Decimal>) -> Result<i64, String> {
    let quantity = raw.unwrap_or(Decimal::ZERO);
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(format!("negative stock quantity {quantity}"));
    }
    quantity
        .trunc()
        .to_i64()
        .ok_or_else(|| format!("stock quantity {quantity} out of range"))
}
