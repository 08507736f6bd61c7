//! Admin REST API request and response types.
//!
//! Only the fields the sync reads are modeled; everything else in the
//! payloads is ignored.
//!
//! ### Money
//! Prices and totals arrive as decimal strings (`"129.90"`) and are kept as
//! strings here. Arithmetic happens in the caller.
//!
//! ### `sku` / `barcode`
//! Either may be `null` or `""`. Blank values never become identifiers.
//!
//! ### Stock
//! Variants carry `inventory_quantity` summed over all locations; it is not
//! modeled. Stock is read per location from `inventory_levels.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub product: ShopifyProduct,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyVariant {
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    /// `"Default Title"` for single-variant products.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    pub locations: Vec<ShopifyLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyLocation {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Missing on some API versions; treated as active.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct InventoryLevelsResponse {
    pub inventory_levels: Vec<InventoryLevel>,
}

#[derive(Debug, Deserialize)]
pub struct InventoryLevelResponse {
    pub inventory_level: InventoryLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryLevel {
    pub inventory_item_id: i64,
    pub location_id: i64,
    /// `null` when the item is not tracked at the location.
    #[serde(default)]
    pub available: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetInventoryLevel {
    pub location_id: i64,
    pub inventory_item_id: i64,
    pub available: i64,
}

#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<ShopifyOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyOrder {
    pub id: i64,
    pub order_number: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub customer: Option<ShopifyCustomer>,
    #[serde(default)]
    pub billing_address: Option<ShopifyAddress>,
    #[serde(default)]
    pub shipping_address: Option<ShopifyAddress>,
    #[serde(default)]
    pub line_items: Vec<ShopifyLineItem>,
    #[serde(default)]
    pub total_shipping_price_set: Option<PriceSet>,
}

impl ShopifyOrder {
    /// Shipping charged, in shop currency, as received.
    #[must_use]
    pub fn shipping_amount(&self) -> Option<&str> {
        self.total_shipping_price_set
            .as_ref()
            .map(|set| set.shop_money.amount.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyCustomer {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopifyAddress {
    #[serde(default)]
    pub address1: Option<String>,
    /// Stores in Brazil use this line for the street number.
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyLineItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub quantity: i64,
    pub price: String,
    /// Discount over the whole line, not per unit.
    #[serde(default)]
    pub total_discount: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceSet {
    pub shop_money: Money,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    pub amount: String,
}

/// Body of `POST products.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    pub vendor: String,
    pub product_type: String,
    pub options: Vec<NewProductOption>,
    pub variants: Vec<NewVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProductOption {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVariant {
    pub option1: String,
    pub sku: String,
    pub price: String,
    pub inventory_management: String,
    pub inventory_quantity: i64,
    pub requires_shipping: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewProductEnvelope<'a> {
    pub product: &'a NewProduct,
}
