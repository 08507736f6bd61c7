//! Client for the Hiper ERP e-commerce API: the source inventory feed and
//! sales-order submission.

pub mod client;
pub mod error;
pub mod feed;
pub mod order;
pub mod types;

pub use client::HiperClient;
pub use error::HiperError;
pub use feed::{convert_products, parse_products, SourceFeed};
pub use order::{
    HiperAddress, HiperCustomer, HiperMarketplace, HiperOrder, HiperOrderItem, HiperPayment,
};
pub use types::{HiperProduct, HiperVariant, NamedRef};
