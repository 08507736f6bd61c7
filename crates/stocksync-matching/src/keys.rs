use stocksync_core::{CatalogItem, MatchingRules};

use crate::normalize::{base_name, normalize_name};
use crate::{MatchingError, SizeExtractor};

/// Derives the fallback lookup keys (normalized name, canonical size) for
/// catalog items. Built once per run from the loaded rules.
#[derive(Debug)]
pub struct KeyBuilder {
    rules: MatchingRules,
    sizes: SizeExtractor,
    brands: Vec<String>,
}

impl KeyBuilder {
    /// # Errors
    ///
    /// Returns [`MatchingError`] if the size synonyms cannot be compiled.
    pub fn new(rules: MatchingRules) -> Result<Self, MatchingError> {
        let sizes = SizeExtractor::new(&rules)?;
        let brands = rules
            .brand_filters
            .iter()
            .map(|b| normalize_name(b, &rules))
            .filter(|b| !b.is_empty())
            .collect();
        Ok(Self {
            rules,
            sizes,
            brands,
        })
    }

    #[must_use]
    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    #[must_use]
    pub fn sizes(&self) -> &SizeExtractor {
        &self.sizes
    }

    /// Normalized base name of `item`: the title before its first `" - "`.
    #[must_use]
    pub fn name_key(&self, item: &CatalogItem) -> String {
        normalize_name(base_name(&item.name), &self.rules)
    }

    /// Canonical size of `item`, or `None` when its size text is missing or
    /// unrecognized.
    #[must_use]
    pub fn size_key(&self, item: &CatalogItem) -> Option<String> {
        item.size_hint().and_then(|raw| self.sizes.canonical(raw))
    }

    /// Composite `"{name}_{size}"` key, present only when both halves are.
    #[must_use]
    pub fn name_size_key(&self, item: &CatalogItem) -> Option<String> {
        let name = self.name_key(item);
        if name.is_empty() {
            return None;
        }
        self.size_key(item).map(|size| compose(&name, &size))
    }

    /// Returns `true` when no brand filter is configured, or the item's name
    /// or brand mentions one of the configured brands.
    #[must_use]
    pub fn in_brand_scope(&self, item: &CatalogItem) -> bool {
        if self.brands.is_empty() {
            return true;
        }
        let name = normalize_name(&item.name, &self.rules);
        let brand = item
            .brand
            .as_deref()
            .map(|b| normalize_name(b, &self.rules))
            .unwrap_or_default();
        self.brands
            .iter()
            .any(|b| name.contains(b.as_str()) || brand.contains(b.as_str()))
    }
}

pub(crate) fn compose(name: &str, size: &str) -> String {
    format!("{name}_{size}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> KeyBuilder {
        KeyBuilder::new(MatchingRules::default()).unwrap()
    }

    #[test]
    fn name_key_uses_base_name() {
        let item = CatalogItem::new("Calça Médio - Kit - 38", 1);
        assert_eq!(keys().name_key(&item), "calca medio");
    }

    #[test]
    fn composite_key_from_name_suffix() {
        let item = CatalogItem::new("Blusa Alba - Tamanho 38", 1);
        assert_eq!(keys().name_size_key(&item).as_deref(), Some("blusa alba_38"));
    }

    #[test]
    fn composite_key_from_explicit_size() {
        let item = CatalogItem::new("Blusa Alba", 1).with_size("Extra Large");
        assert_eq!(keys().name_size_key(&item).as_deref(), Some("blusa alba_GG"));
    }

    #[test]
    fn no_composite_key_for_unrecognized_size() {
        let item = CatalogItem::new("Blusa Alba", 1).with_size("Default Title");
        assert_eq!(keys().name_size_key(&item), None);
    }

    #[test]
    fn brand_scope_is_open_without_filters() {
        assert!(keys().in_brand_scope(&CatalogItem::new("Anything", 0)));
    }

    #[test]
    fn brand_scope_checks_name_and_brand() {
        let mut rules = MatchingRules::default();
        rules.brand_filters = vec!["Saphira".to_string()];
        let keys = KeyBuilder::new(rules).unwrap();

        assert!(keys.in_brand_scope(&CatalogItem::new("Calça SAPHIRA Jeans", 0)));

        let mut branded = CatalogItem::new("Calça Jeans", 0);
        branded.brand = Some("Saphira".to_string());
        assert!(keys.in_brand_scope(&branded));

        assert!(!keys.in_brand_scope(&CatalogItem::new("Calça Jeans", 0)));
    }
}
