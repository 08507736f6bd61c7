//! Platform-neutral catalog records shared by the source feed, the target
//! storefront, and the matching engine.

use serde::{Deserialize, Serialize};

/// A precise product/variant identifier.
///
/// SKUs and barcodes live in separate key spaces even when a platform fills
/// both with the same code. Values are trimmed and upper-cased on
/// construction, so two identifiers compare equal when the underlying codes
/// differ only by case or surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Identifier {
    Sku(String),
    Barcode(String),
}

impl Identifier {
    /// Builds a SKU identifier, or `None` when `raw` is blank.
    #[must_use]
    pub fn sku(raw: &str) -> Option<Self> {
        normalize_code(raw).map(Identifier::Sku)
    }

    /// Builds a barcode identifier, or `None` when `raw` is blank.
    #[must_use]
    pub fn barcode(raw: &str) -> Option<Self> {
        normalize_code(raw).map(Identifier::Barcode)
    }

    /// The normalized code without its kind tag.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Identifier::Sku(code) | Identifier::Barcode(code) => code,
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Sku(code) => write!(f, "sku:{code}"),
            Identifier::Barcode(code) => write!(f, "barcode:{code}"),
        }
    }
}

fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Handles needed to mutate a target-platform variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVariantRef {
    pub product_id: i64,
    pub variant_id: i64,
    pub inventory_item_id: i64,
}

/// One sellable unit as seen by one platform during one run.
///
/// Identity is platform-specific (`sku`/`barcode`); `name` + `size` is the
/// fallback identity used by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub size: Option<String>,
    pub stock_quantity: i64,
    /// Brand name, when the platform exposes one.
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Unit price as a decimal string, exactly as received.
    #[serde(default)]
    pub price: Option<String>,
    /// Present only on target-side items.
    #[serde(default)]
    pub remote: Option<RemoteVariantRef>,
}

impl CatalogItem {
    /// Convenience constructor for an item with only the core fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, stock_quantity: i64) -> Self {
        Self {
            name: name.into(),
            sku: None,
            barcode: None,
            size: None,
            stock_quantity,
            brand: None,
            category: None,
            price: None,
            remote: None,
        }
    }

    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    #[must_use]
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_remote(mut self, remote: RemoteVariantRef) -> Self {
        self.remote = Some(remote);
        self
    }

    #[must_use]
    pub fn sku_identifier(&self) -> Option<Identifier> {
        self.sku.as_deref().and_then(Identifier::sku)
    }

    #[must_use]
    pub fn barcode_identifier(&self) -> Option<Identifier> {
        self.barcode.as_deref().and_then(Identifier::barcode)
    }

    /// Human-readable reference for logs and reports: SKU, then barcode,
    /// then the name.
    #[must_use]
    pub fn reference(&self) -> String {
        self.sku_identifier()
            .or_else(|| self.barcode_identifier())
            .map_or_else(|| self.name.clone(), |id| id.code().to_owned())
    }

    /// The free-text size for this item: the explicit size field, else the
    /// segment after the last `" - "` in the name.
    #[must_use]
    pub fn size_hint(&self) -> Option<&str> {
        self.size
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.name
                    .rsplit_once(" - ")
                    .map(|(_, tail)| tail)
                    .filter(|tail| !tail.trim().is_empty())
            })
    }
}

/// A feed record that could not be turned into a [`CatalogItem`].
///
/// Rejections are data, not errors: the run skips the record, logs it, and
/// lists it in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Best available reference to the record (code, name, or position).
    pub reference: String,
    pub reason: String,
}

impl RejectedRecord {
    #[must_use]
    pub fn new(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}
