//! Shared types and configuration for the stock synchronization workspace.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod retry;
pub mod rules;

use thiserror::Error;

pub use app_config::AppConfig;
pub use catalog::{CatalogItem, Identifier, RejectedRecord, RemoteVariantRef};
pub use config::{load_app_config, load_app_config_from_env};
pub use retry::{retry_with_backoff, Retriable, RetryPolicy};
pub use rules::{
    load_rules, load_rules_or_default, LetterSize, MatchingRules, NameCorrection, ProductDefaults,
    SkuPolicy,
};

/// Fatal configuration failures. Raised before any remote call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read matching rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse matching rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("invalid matching rules: {0}")]
    Validation(String),
}
