//! `stocksync stock`: one or more reconciliation passes from Hiper into
//! Shopify.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use stocksync_core::{AppConfig, CatalogItem, MatchingRules};
use stocksync_hiper::HiperClient;
use stocksync_matching::{match_all, CatalogSnapshot, KeyBuilder};
use stocksync_shopify::ShopifyAdminClient;

use crate::reconcile::{reconcile, ReconcileOptions, ShopifyInventoryWriter};
use crate::report::{summary_line, ReportBuckets, RunReport};

struct StockRun<'a> {
    config: &'a AppConfig,
    keys: KeyBuilder,
    hiper: HiperClient,
    shopify: ShopifyAdminClient,
    options: ReconcileOptions,
    catalog_ttl: chrono::Duration,
}

/// Run a stock pass, or keep running passes when `watch` is set.
///
/// Rules, clients and durations are all built before the first request, so
/// a bad configuration fails without touching either API. In watch mode a
/// failed pass is logged and the loop continues; a single pass propagates
/// its error. The target product list is reused across passes while the
/// snapshot is fresh; its quantities are re-read from the location on every
/// pass.
///
/// # Errors
///
/// Returns an error if the rules do not compile, a client cannot be built,
/// no stock location exists, or (outside watch mode) the pass fails.
pub(crate) async fn run_stock(
    config: &AppConfig,
    rules: MatchingRules,
    dry_run: bool,
    watch: Option<u64>,
) -> anyhow::Result<()> {
    let mut run = StockRun::new(config, rules, dry_run)?;

    let location = run.shopify.default_location().await?;
    tracing::info!(location_id = location.id, location = %location.name, "syncing stock at location");

    let mut snapshot = None;
    loop {
        match run.pass(location.id, snapshot.take()).await {
            Ok(kept) => snapshot = Some(kept),
            Err(e) if watch.is_some() => {
                tracing::error!(error = %e, "stock pass failed");
            }
            Err(e) => return Err(e),
        }

        let Some(interval) = watch else { break };
        tracing::info!(interval_secs = interval, "waiting for next pass");
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }

    Ok(())
}

impl<'a> StockRun<'a> {
    /// Builds everything a pass needs without any network I/O.
    fn new(config: &'a AppConfig, rules: MatchingRules, dry_run: bool) -> anyhow::Result<Self> {
        let keys = KeyBuilder::new(rules)?;
        let catalog_ttl = chrono::Duration::from_std(config.catalog_ttl()).map_err(|e| {
            anyhow::anyhow!("invalid catalog TTL {}s: {e}", config.catalog_ttl_secs)
        })?;
        let hiper = HiperClient::new(config)
            .map_err(|e| anyhow::anyhow!("failed to build Hiper client: {e}"))?;
        let shopify = ShopifyAdminClient::new(config)
            .map_err(|e| anyhow::anyhow!("failed to build Shopify client: {e}"))?;

        Ok(Self {
            config,
            keys,
            hiper,
            shopify,
            options: ReconcileOptions {
                retry: config.retry_policy(),
                update_delay: config.update_delay(),
                accept_name_only: config.accept_name_only_matches,
                dry_run,
            },
            catalog_ttl,
        })
    }

    /// One full pass. Returns the snapshot for the next pass to reuse.
    async fn pass(
        &mut self,
        location_id: i64,
        previous: Option<CatalogSnapshot>,
    ) -> anyhow::Result<CatalogSnapshot> {
        let started_at = Utc::now();
        let report = RunReport::start(
            &self.config.reports_dir,
            "stock",
            self.options.dry_run,
            started_at,
        );
        tracing::info!(run_id = %report.run_id(), dry_run = self.options.dry_run, "stock pass started");

        self.hiper.authenticate().await?;
        let feed = self.hiper.fetch_feed().await?;
        let mut rejected = feed.rejected;
        let sources: Vec<CatalogItem> = feed
            .items
            .into_iter()
            .filter(|item| self.keys.in_brand_scope(item))
            .collect();

        let now = Utc::now();
        let snapshot = match previous {
            Some(snapshot) if snapshot.is_fresh(now) => {
                let item_ids: Vec<i64> = snapshot
                    .index
                    .items()
                    .iter()
                    .filter_map(|item| item.remote.as_ref().map(|r| r.inventory_item_id))
                    .collect();
                let levels = self
                    .shopify
                    .fetch_inventory_levels(location_id, &item_ids)
                    .await?;
                tracing::info!(
                    fetched_at = %snapshot.fetched_at,
                    levels = levels.len(),
                    "reusing target catalog snapshot with current levels"
                );
                with_location_levels(snapshot, &self.keys, &levels)
            }
            _ => {
                let catalog = self.shopify.fetch_catalog(location_id).await?;
                rejected.extend(catalog.rejected);
                let targets: Vec<CatalogItem> = catalog
                    .items
                    .into_iter()
                    .filter(|item| self.keys.in_brand_scope(item))
                    .collect();
                CatalogSnapshot::build(&targets, &self.keys, now, self.catalog_ttl)
            }
        };

        tracing::info!(
            sources = sources.len(),
            targets = snapshot.index.len(),
            rejected = rejected.len(),
            "matching catalogs"
        );
        let results = match_all(&sources, &snapshot.index, &self.keys);

        let writer = ShopifyInventoryWriter::new(&self.shopify, location_id);
        let outcome = reconcile(&results, &writer, self.options).await;

        let path = report.finish(&outcome, &rejected, Utc::now())?;
        println!(
            "stock pass complete: {} (report: {})",
            summary_line(&outcome.totals()),
            path.display()
        );

        Ok(snapshot)
    }
}

/// Replaces every quantity in `snapshot` with the level read at the sync
/// location. Items with no level there hold no stock at that location.
fn with_location_levels(
    snapshot: CatalogSnapshot,
    keys: &KeyBuilder,
    levels: &HashMap<i64, i64>,
) -> CatalogSnapshot {
    snapshot.with_quantities(keys, |item| {
        item.remote
            .as_ref()
            .and_then(|r| levels.get(&r.inventory_item_id))
            .copied()
            .unwrap_or(0)
    })
}
