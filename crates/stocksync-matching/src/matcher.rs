use serde::{Deserialize, Serialize};
use stocksync_core::CatalogItem;

use crate::{CatalogIndex, KeyBuilder};

/// How a source item was paired with a target item, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Sku,
    Barcode,
    NameSize,
    /// Name-only pairing. Weak: every size variant of a product shares it.
    Name,
    None,
}

impl MatchMethod {
    /// Methods that pin down a single variant. Name-only matches do not.
    #[must_use]
    pub fn is_precise(self) -> bool {
        matches!(self, Self::Sku | Self::Barcode | Self::NameSize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub source: CatalogItem,
    pub target: Option<CatalogItem>,
    pub method: MatchMethod,
}

/// Pairs `source` with at most one item of `index`.
///
/// Strategies are tried in order and the first hit wins: SKU, barcode,
/// normalized name + canonical size, normalized name. When nothing matches
/// the result carries `MatchMethod::None` and no target.
///
/// SKU and barcode lookups compare [`stocksync_core::Identifier`] values,
/// which are trimmed and upper-cased: `" c01"` and `"C01"` are the same SKU.
/// Only case and padding are folded; any other difference is a miss.
#[must_use]
pub fn match_item(source: &CatalogItem, index: &CatalogIndex, keys: &KeyBuilder) -> MatchResult {
    let hit = |target: &CatalogItem, method| MatchResult {
        source: source.clone(),
        target: Some(target.clone()),
        method,
    };

    if let Some(target) = source.sku_identifier().and_then(|id| index.get(&id)) {
        return hit(target, MatchMethod::Sku);
    }
    if let Some(target) = source.barcode_identifier().and_then(|id| index.get(&id)) {
        return hit(target, MatchMethod::Barcode);
    }

    let name = keys.name_key(source);
    if !name.is_empty() {
        if let Some(target) = keys
            .size_key(source)
            .and_then(|size| index.by_name_size(&name, &size))
        {
            return hit(target, MatchMethod::NameSize);
        }
        if let Some(target) = index.by_name(&name) {
            return hit(target, MatchMethod::Name);
        }
    }

    MatchResult {
        source: source.clone(),
        target: None,
        method: MatchMethod::None,
    }
}

/// Matches every source item, preserving order.
#[must_use]
pub fn match_all(sources: &[CatalogItem], index: &CatalogIndex, keys: &KeyBuilder) -> Vec<MatchResult> {
    sources
        .iter()
        .map(|source| match_item(source, index, keys))
        .collect()
}
