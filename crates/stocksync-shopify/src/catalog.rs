use std::collections::HashMap;

use stocksync_core::{CatalogItem, RejectedRecord, RemoteVariantRef};

use crate::types::ShopifyProduct;

/// Target-side catalog for one run.
#[derive(Debug, Default)]
pub struct TargetCatalog {
    pub location_id: i64,
    pub items: Vec<CatalogItem>,
    pub rejected: Vec<RejectedRecord>,
}

/// One item per variant, named after its product.
///
/// `levels` maps inventory item ids to the quantity at the sync location. A
/// variant with no level there has no stock at that location and gets 0;
/// the all-locations total on the variant is never used. Variants without an
/// inventory item cannot be updated and are rejected.
#[must_use]
pub fn to_catalog_items(
    products: &[ShopifyProduct],
    levels: &HashMap<i64, i64>,
) -> (Vec<CatalogItem>, Vec<RejectedRecord>) {
    let mut items = Vec::new();
    let mut rejected = Vec::new();

    for product in products {
        for variant in &product.variants {
            let Some(inventory_item_id) = variant.inventory_item_id else {
                let reference = variant
                    .sku
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| format!("variant {}", variant.id));
                rejected.push(RejectedRecord::new(reference, "variant has no inventory item"));
                continue;
            };

            let quantity = levels.get(&inventory_item_id).copied().unwrap_or(0);

            let mut item = CatalogItem::new(product.title.clone(), quantity).with_remote(
                RemoteVariantRef {
                    product_id: variant.product_id.unwrap_or(product.id),
                    variant_id: variant.id,
                    inventory_item_id,
                },
            );
            item.sku = non_blank(variant.sku.as_deref());
            item.barcode = non_blank(variant.barcode.as_deref());
            item.size = non_blank(variant.option1.as_deref().or(variant.title.as_deref()));
            item.brand = non_blank(product.vendor.as_deref());
            item.category = non_blank(product.product_type.as_deref());
            item.price = non_blank(variant.price.as_deref());
            items.push(item);
        }
    }

    (items, rejected)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
