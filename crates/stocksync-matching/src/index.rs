//! Lookup tables over one catalog snapshot.

use std::collections::HashMap;

use stocksync_core::{CatalogItem, Identifier};

use crate::keys::compose;
use crate::KeyBuilder;

/// Four lookups over a target catalog: SKU, barcode, normalized name, and
/// normalized name + canonical size.
///
/// SKUs and barcodes share one table keyed by [`Identifier`], so the two key
/// spaces never collide. Identifier keys are trimmed and upper-cased, so
/// lookups ignore case and surrounding whitespace. Within each table the
/// last item inserted for a key wins.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    items: Vec<CatalogItem>,
    by_identifier: HashMap<Identifier, usize>,
    by_name: HashMap<String, usize>,
    by_name_size: HashMap<String, usize>,
}

/// Indexes `items`, which are cloned into the index.
#[must_use]
pub fn build_index(items: &[CatalogItem], keys: &KeyBuilder) -> CatalogIndex {
    let mut index = CatalogIndex {
        items: items.to_vec(),
        ..CatalogIndex::default()
    };

    for (pos, item) in index.items.iter().enumerate() {
        if let Some(sku) = item.sku_identifier() {
            index.by_identifier.insert(sku, pos);
        }
        if let Some(barcode) = item.barcode_identifier() {
            index.by_identifier.insert(barcode, pos);
        }

        let name = keys.name_key(item);
        if name.is_empty() {
            continue;
        }
        if let Some(size) = keys.size_key(item) {
            index.by_name_size.insert(compose(&name, &size), pos);
        }
        index.by_name.insert(name, pos);
    }

    tracing::debug!(
        items = index.items.len(),
        identifiers = index.by_identifier.len(),
        names = index.by_name.len(),
        name_sizes = index.by_name_size.len(),
        "catalog index built"
    );

    index
}

impl CatalogIndex {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&CatalogItem> {
        self.by_identifier.get(id).map(|&pos| &self.items[pos])
    }

    #[must_use]
    pub fn by_sku(&self, sku: &str) -> Option<&CatalogItem> {
        Identifier::sku(sku).and_then(|id| self.get(&id))
    }

    #[must_use]
    pub fn by_barcode(&self, barcode: &str) -> Option<&CatalogItem> {
        Identifier::barcode(barcode).and_then(|id| self.get(&id))
    }

    /// Looks up an already-normalized name.
    #[must_use]
    pub fn by_name(&self, name_key: &str) -> Option<&CatalogItem> {
        self.by_name.get(name_key).map(|&pos| &self.items[pos])
    }

    /// Looks up an already-normalized name and canonical size.
    #[must_use]
    pub fn by_name_size(&self, name_key: &str, size: &str) -> Option<&CatalogItem> {
        self.by_name_size
            .get(&compose(name_key, size))
            .map(|&pos| &self.items[pos])
    }

    /// Returns `true` when some indexed SKU starts with `prefix`
    /// (case-insensitive).
    #[must_use]
    pub fn has_sku_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim().to_uppercase();
        !prefix.is_empty()
            && self.by_identifier.keys().any(|id| match id {
                Identifier::Sku(code) => code.starts_with(prefix.as_str()),
                Identifier::Barcode(_) => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksync_core::MatchingRules;

    fn keys() -> KeyBuilder {
        KeyBuilder::new(MatchingRules::default()).unwrap()
    }

    #[test]
    fn indexes_every_key_kind() {
        let items = vec![CatalogItem::new("Blusa Alba - 38", 5)
            .with_sku("c0700136")
            .with_barcode("9990001234567")];
        let index = build_index(&items, &keys());

        assert_eq!(index.by_sku("C0700136").map(|i| i.stock_quantity), Some(5));
        assert!(index.by_barcode("9990001234567").is_some());
        assert!(index.by_name("blusa alba").is_some());
        assert!(index.by_name_size("blusa alba", "38").is_some());
        assert!(index.by_name_size("blusa alba", "40").is_none());
    }

    #[test]
    fn sku_and_barcode_key_spaces_are_separate() {
        let items = vec![CatalogItem::new("A", 1).with_barcode("C01")];
        let index = build_index(&items, &keys());
        assert!(index.by_barcode("C01").is_some());
        assert!(index.by_sku("C01").is_none());
    }

    #[test]
    fn duplicate_keys_keep_the_last_item() {
        let items = vec![
            CatalogItem::new("Blusa Alba", 1).with_sku("C01"),
            CatalogItem::new("Blusa Alba", 2).with_sku("c01"),
        ];
        let index = build_index(&items, &keys());
        assert_eq!(index.len(), 2);
        assert_eq!(index.by_sku("C01").map(|i| i.stock_quantity), Some(2));
        assert_eq!(index.by_name("blusa alba").map(|i| i.stock_quantity), Some(2));
    }

    #[test]
    fn items_without_keys_are_kept_but_not_looked_up() {
        let items = vec![CatalogItem::new("", 3)];
        let index = build_index(&items, &keys());
        assert_eq!(index.len(), 1);
        assert!(index.by_name("").is_none());
    }

    #[test]
    fn sku_prefix_search_ignores_barcodes() {
        let items = vec![
            CatalogItem::new("A", 0).with_sku("C070013638"),
            CatalogItem::new("B", 0).with_barcode("C0800"),
        ];
        let index = build_index(&items, &keys());
        assert!(index.has_sku_prefix("c0700136"));
        assert!(!index.has_sku_prefix("C0800"));
        assert!(!index.has_sku_prefix(""));
    }
}
