use stocksync_core::Retriable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HiperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token generation failed or the API rejected the token.
    #[error("Hiper authentication failed: {0}")]
    Auth(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Hiper (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid Hiper base URL \"{0}\"")]
    InvalidBaseUrl(String),
}

impl Retriable for HiperError {
    fn is_retriable(&self) -> bool {
        match self {
            HiperError::Http(_) | HiperError::RateLimited { .. } => true,
            HiperError::UnexpectedStatus { status, .. } => *status >= 500,
            HiperError::Auth(_)
            | HiperError::Deserialize { .. }
            | HiperError::NotFound { .. }
            | HiperError::InvalidBaseUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(HiperError::RateLimited {
            retry_after_secs: 1
        }
        .is_retriable());
        assert!(HiperError::UnexpectedStatus {
            status: 503,
            url: "x".into()
        }
        .is_retriable());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!HiperError::UnexpectedStatus {
            status: 400,
            url: "x".into()
        }
        .is_retriable());
        assert!(!HiperError::Auth("bad key".into()).is_retriable());
        assert!(!HiperError::NotFound { url: "x".into() }.is_retriable());
    }
}
