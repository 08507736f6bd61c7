//! Shopify Admin REST client: catalog, locations, inventory levels, orders,
//! and product creation.

pub mod catalog;
pub mod client;
pub mod error;
pub mod pagination;
pub mod types;

pub use catalog::{to_catalog_items, TargetCatalog};
pub use client::{admin_base_url, ShopifyAdminClient};
pub use error::ShopifyError;
pub use types::{
    InventoryLevel, NewProduct, NewProductOption, NewVariant, ShopifyAddress, ShopifyCustomer,
    ShopifyLineItem, ShopifyLocation, ShopifyOrder, ShopifyProduct, ShopifyVariant,
};
