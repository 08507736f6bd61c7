use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct AppConfig {
    pub shopify_shop: String,
    pub shopify_access_token: String,
    pub shopify_api_version: String,
    pub hiper_security_key: String,
    pub hiper_base_url: String,
    pub log_level: String,
    pub rules_path: PathBuf,
    pub reports_dir: PathBuf,
    pub orders_cache_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub update_delay_ms: u64,
    pub page_delay_ms: u64,
    pub catalog_ttl_secs: u64,
    pub accept_name_only_matches: bool,
    pub checkpoint_every: usize,
    pub marketplace_cnpj: String,
    pub marketplace_name: String,
    pub payment_method_id: u32,
}

impl AppConfig {
    /// Retry policy shared by every remote call in a run.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.backoff_base_ms),
        }
    }

    #[must_use]
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    #[must_use]
    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shopify_shop", &self.shopify_shop)
            .field("shopify_access_token", &"[redacted]")
            .field("shopify_api_version", &self.shopify_api_version)
            .field("hiper_security_key", &"[redacted]")
            .field("hiper_base_url", &self.hiper_base_url)
            .field("log_level", &self.log_level)
            .field("rules_path", &self.rules_path)
            .field("reports_dir", &self.reports_dir)
            .field("orders_cache_path", &self.orders_cache_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("update_delay_ms", &self.update_delay_ms)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("catalog_ttl_secs", &self.catalog_ttl_secs)
            .field("accept_name_only_matches", &self.accept_name_only_matches)
            .field("checkpoint_every", &self.checkpoint_every)
            .field("marketplace_cnpj", &self.marketplace_cnpj)
            .field("marketplace_name", &self.marketplace_name)
            .field("payment_method_id", &self.payment_method_id)
            .finish()
    }
}
