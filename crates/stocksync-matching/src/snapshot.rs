use chrono::{DateTime, Duration, Utc};
use stocksync_core::CatalogItem;

use crate::{build_index, CatalogIndex, KeyBuilder};

/// An indexed catalog plus the time window in which it may be reused.
///
/// A snapshot never refreshes itself. Callers check [`is_fresh`] and rebuild
/// from a new fetch once it expires. Within the window the catalog shape is
/// reused but stock moves, so quantities are swapped in through
/// [`with_quantities`] before each use.
///
/// [`is_fresh`]: CatalogSnapshot::is_fresh
/// [`with_quantities`]: CatalogSnapshot::with_quantities
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub index: CatalogIndex,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn build(
        items: &[CatalogItem],
        keys: &KeyBuilder,
        fetched_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            index: build_index(items, keys),
            fetched_at,
            expires_at: fetched_at + ttl,
        }
    }

    /// Re-indexes the same items with `quantity(item)` as their stock,
    /// keeping the original fetch window.
    #[must_use]
    pub fn with_quantities<F>(self, keys: &KeyBuilder, quantity: F) -> Self
    where
        F: Fn(&CatalogItem) -> i64,
    {
        let items: Vec<CatalogItem> = self
            .index
            .items()
            .iter()
            .map(|item| CatalogItem {
                stock_quantity: quantity(item),
                ..item.clone()
            })
            .collect();
        Self {
            index: build_index(&items, keys),
            fetched_at: self.fetched_at,
            expires_at: self.expires_at,
        }
    }

    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
