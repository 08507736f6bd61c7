use stocksync_core::Retriable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Shopify (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The Admin API refused the request body (HTTP 422).
    #[error("Shopify rejected {context}: {message}")]
    Rejected { context: String, message: String },

    #[error("pagination limit reached for {resource}: exceeded {max_pages} pages")]
    PaginationLimit { resource: String, max_pages: usize },

    #[error("no active Shopify location")]
    NoLocation,

    #[error("invalid shop \"{0}\"")]
    InvalidShop(String),
}

impl Retriable for ShopifyError {
    fn is_retriable(&self) -> bool {
        match self {
            ShopifyError::Http(_) | ShopifyError::RateLimited { .. } => true,
            ShopifyError::UnexpectedStatus { status, .. } => *status >= 500,
            ShopifyError::Deserialize { .. }
            | ShopifyError::NotFound { .. }
            | ShopifyError::Rejected { .. }
            | ShopifyError::PaginationLimit { .. }
            | ShopifyError::NoLocation
            | ShopifyError::InvalidShop(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_retriable() {
        assert!(ShopifyError::RateLimited {
            retry_after_secs: 2
        }
        .is_retriable());
        assert!(ShopifyError::UnexpectedStatus {
            status: 502,
            url: "x".into()
        }
        .is_retriable());
    }

    #[test]
    fn rejections_are_permanent() {
        assert!(!ShopifyError::Rejected {
            context: "product".into(),
            message: "sku taken".into()
        }
        .is_retriable());
        assert!(!ShopifyError::UnexpectedStatus {
            status: 401,
            url: "x".into()
        }
        .is_retriable());
    }
}
