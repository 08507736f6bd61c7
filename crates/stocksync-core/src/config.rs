use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_HIPER_BASE_URL: &str = "https://ms-ecommerce.hiper.com.br/api/v1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let shopify_shop = require("SHOPIFY_SHOP")?;
    let shopify_access_token = require("SHOPIFY_ACCESS_TOKEN")?;
    let hiper_security_key = require("HIPER_SECURITY_KEY")?;

    let shopify_api_version = or_default("SHOPIFY_API_VERSION", "2024-01");
    let hiper_base_url = or_default("HIPER_BASE_URL", DEFAULT_HIPER_BASE_URL);
    let log_level = or_default("STOCKSYNC_LOG_LEVEL", "info");
    let rules_path = PathBuf::from(or_default(
        "STOCKSYNC_RULES_PATH",
        "./config/matching.yaml",
    ));
    let reports_dir = PathBuf::from(or_default("STOCKSYNC_REPORTS_DIR", "./reports"));
    let orders_cache_path = PathBuf::from(or_default(
        "STOCKSYNC_ORDERS_CACHE_PATH",
        "./cache/synced_orders.json",
    ));

    let request_timeout_secs = parse_u64("STOCKSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STOCKSYNC_USER_AGENT", "stocksync/0.1 (inventory-sync)");
    let max_attempts = parse_u32("STOCKSYNC_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOCKSYNC_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let backoff_base_ms = parse_u64("STOCKSYNC_BACKOFF_BASE_MS", "1000")?;
    let update_delay_ms = parse_u64("STOCKSYNC_UPDATE_DELAY_MS", "500")?;
    let page_delay_ms = parse_u64("STOCKSYNC_PAGE_DELAY_MS", "500")?;
    let catalog_ttl_secs = parse_u64("STOCKSYNC_CATALOG_TTL_SECS", "600")?;
    let accept_name_only_matches = parse_bool(
        "STOCKSYNC_ACCEPT_NAME_ONLY_MATCHES",
        &or_default("STOCKSYNC_ACCEPT_NAME_ONLY_MATCHES", "false"),
    )?;
    let checkpoint_every = parse_usize("STOCKSYNC_CHECKPOINT_EVERY", "10")?;

    let marketplace_cnpj = or_default("STOCKSYNC_MARKETPLACE_CNPJ", "");
    let marketplace_name = or_default("STOCKSYNC_MARKETPLACE_NAME", "Shopify");
    let payment_method_id = parse_u32("STOCKSYNC_PAYMENT_METHOD_ID", "1")?;

    Ok(AppConfig {
        shopify_shop,
        shopify_access_token,
        shopify_api_version,
        hiper_security_key,
        hiper_base_url,
        log_level,
        rules_path,
        reports_dir,
        orders_cache_path,
        request_timeout_secs,
        user_agent,
        max_attempts,
        backoff_base_ms,
        update_delay_ms,
        page_delay_ms,
        catalog_ttl_secs,
        accept_name_only_matches,
        checkpoint_every,
        marketplace_cnpj,
        marketplace_name,
        payment_method_id,
    })
}

/// Parse a boolean flag. Accepts `true`/`false`/`1`/`0`/`yes`/`no`, case-insensitive.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
