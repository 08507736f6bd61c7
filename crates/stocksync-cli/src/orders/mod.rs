//! `stocksync orders`: transfer storefront orders into the ERP as sales
//! orders.

mod cache;
mod mapping;

use std::collections::BTreeMap;

use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use stocksync_core::AppConfig;
use stocksync_hiper::HiperClient;
use stocksync_shopify::ShopifyAdminClient;

use crate::report::{summary_line, ReportBuckets, RunReport};

use cache::OrdersCache;
use mapping::{map_order, OrderSettings};

#[derive(Debug, Subcommand)]
pub enum OrdersCommands {
    /// Map new Shopify orders to Hiper sales orders (logged only, unless --submit)
    Sync {
        /// Send the orders to Hiper instead of logging the payloads
        #[arg(long)]
        submit: bool,

        /// Process at most this many new orders
        #[arg(long)]
        max_orders: Option<usize>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProcessedOrder {
    pub order_id: i64,
    pub order_number: i64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FailedOrder {
    pub order_id: i64,
    pub order_number: i64,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct OrderSyncOutcome {
    pub submitted: Vec<ProcessedOrder>,
    /// Mapped and logged, not sent.
    pub simulated: Vec<ProcessedOrder>,
    pub errored: Vec<FailedOrder>,
}

impl ReportBuckets for OrderSyncOutcome {
    fn totals(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("submitted", self.submitted.len()),
            ("simulated", self.simulated.len()),
            ("errored", self.errored.len()),
        ])
    }
}

/// List orders newest first, skip the ones already in the cache, and map
/// each remaining one to a sales order.
///
/// Without `submit` the payloads are only logged and the cache is left
/// alone, so a later submitting run still sees those orders. With `submit`,
/// each accepted order is added to the cache right away.
///
/// # Errors
///
/// Returns an error if the cache cannot be opened or written, the orders
/// cannot be listed, or Hiper authentication fails. Per-order mapping and
/// submission failures are logged and recorded, not propagated.
pub(crate) async fn run_orders_sync(
    config: &AppConfig,
    submit: bool,
    max_orders: Option<usize>,
) -> anyhow::Result<()> {
    let report = RunReport::start(&config.reports_dir, "orders", !submit, Utc::now());
    tracing::info!(run_id = %report.run_id(), submit, "orders sync started");

    let mut cache = OrdersCache::open(&config.orders_cache_path)?;
    tracing::info!(last_sync = ?cache.last_sync(), cached = cache.len(), "orders cache loaded");
    let settings = OrderSettings::from_config(config);

    let shopify = ShopifyAdminClient::new(config)
        .map_err(|e| anyhow::anyhow!("failed to build Shopify client: {e}"))?;
    let orders = shopify
        .fetch_orders(|order| !cache.contains(order.id), max_orders)
        .await?;
    tracing::info!(new_orders = orders.len(), "orders to process");

    let hiper = if submit {
        let mut client = HiperClient::new(config)
            .map_err(|e| anyhow::anyhow!("failed to build Hiper client: {e}"))?;
        client.authenticate().await?;
        Some(client)
    } else {
        None
    };

    let mut outcome = OrderSyncOutcome::default();
    for order in &orders {
        let mapped = match map_order(order, &settings) {
            Ok(mapped) => mapped,
            Err(e) => {
                tracing::error!(order_number = order.order_number, error = %e, "order mapping failed");
                outcome.errored.push(FailedOrder {
                    order_id: order.id,
                    order_number: order.order_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let warnings = mapped.validation_warnings();
        for warning in &warnings {
            tracing::warn!(order_number = order.order_number, warning = %warning, "order validation");
        }
        let processed = ProcessedOrder {
            order_id: order.id,
            order_number: order.order_number,
            warnings,
        };

        let Some(hiper) = hiper.as_ref() else {
            tracing::info!(
                order_number = order.order_number,
                payload = %serde_json::to_string_pretty(&mapped)?,
                "simulation: sales order not sent"
            );
            outcome.simulated.push(processed);
            continue;
        };

        match hiper.submit_order(&mapped).await {
            Ok(response) => {
                tracing::info!(order_number = order.order_number, response = %response, "sales order submitted");
                cache.record(order.id, Utc::now())?;
                outcome.submitted.push(processed);
            }
            Err(e) => {
                tracing::error!(order_number = order.order_number, error = %e, "sales order submission failed");
                outcome.errored.push(FailedOrder {
                    order_id: order.id,
                    order_number: order.order_number,
                    error: e.to_string(),
                });
            }
        }
    }

    let path = report.finish(&outcome, &[], Utc::now())?;
    println!(
        "orders sync complete: {} (cached: {}, report: {})",
        summary_line(&outcome.totals()),
        cache.len(),
        path.display()
    );
    Ok(())
}
