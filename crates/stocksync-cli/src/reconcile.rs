//! Applies source stock quantities to matched target variants.
//!
//! Updates are issued one at a time, in match order, with a fixed pause
//! between consecutive writes. Each write is retried with backoff on
//! transient failures; a write that still fails is recorded and the run
//! moves on. Quantities are absolute, so re-running a partially applied
//! pass converges on the same state.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use stocksync_core::{retry_with_backoff, Retriable, RemoteVariantRef, RetryPolicy};
use stocksync_matching::{MatchMethod, MatchResult};
use stocksync_shopify::{ShopifyAdminClient, ShopifyError};

use crate::report::ReportBuckets;

/// Sets the absolute available quantity of one target variant.
///
/// Implementations make a single attempt; the reconciler owns retries.
pub(crate) trait InventoryWriter {
    type Error: Retriable + std::fmt::Display;

    fn set_available(
        &self,
        target: &RemoteVariantRef,
        quantity: i64,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Writes inventory levels at one Shopify location.
pub(crate) struct ShopifyInventoryWriter<'a> {
    client: &'a ShopifyAdminClient,
    location_id: i64,
}

impl<'a> ShopifyInventoryWriter<'a> {
    pub(crate) fn new(client: &'a ShopifyAdminClient, location_id: i64) -> Self {
        Self {
            client,
            location_id,
        }
    }
}

impl InventoryWriter for ShopifyInventoryWriter<'_> {
    type Error = ShopifyError;

    async fn set_available(
        &self,
        target: &RemoteVariantRef,
        quantity: i64,
    ) -> Result<(), ShopifyError> {
        self.client
            .set_inventory_level(self.location_id, target.inventory_item_id, quantity)
            .await
            .map(|_| ())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReconcileOptions {
    pub retry: RetryPolicy,
    /// Pause before every write except the first one of the pass.
    pub update_delay: Duration,
    pub accept_name_only: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MatchedPair {
    pub reference: String,
    pub target_reference: String,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StockChange {
    pub reference: String,
    pub name: String,
    pub target_reference: String,
    pub method: MatchMethod,
    pub previous: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UnmatchedItem {
    pub reference: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FailedUpdate {
    pub reference: String,
    pub name: String,
    pub target_reference: String,
    pub quantity: i64,
    pub error: String,
}

/// Every source item lands in exactly one of `updated`, `planned`,
/// `unchanged`, `unmatched`, or `errored`. Accepted pairs are also listed in
/// `matched`.
#[derive(Debug, Default, Serialize)]
pub(crate) struct ReconciliationOutcome {
    pub matched: Vec<MatchedPair>,
    pub updated: Vec<StockChange>,
    /// Writes skipped because the pass was a dry run.
    pub planned: Vec<StockChange>,
    pub unchanged: Vec<StockChange>,
    pub unmatched: Vec<UnmatchedItem>,
    pub errored: Vec<FailedUpdate>,
}

impl ReportBuckets for ReconciliationOutcome {
    fn totals(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("matched", self.matched.len()),
            ("updated", self.updated.len()),
            ("planned", self.planned.len()),
            ("unchanged", self.unchanged.len()),
            ("unmatched", self.unmatched.len()),
            ("errored", self.errored.len()),
        ])
    }
}

/// Walks `results` in order and brings each matched target's quantity to
/// the source quantity.
///
/// Name-only matches are treated as unmatched unless
/// `options.accept_name_only` is set.
pub(crate) async fn reconcile<W: InventoryWriter>(
    results: &[MatchResult],
    writer: &W,
    options: ReconcileOptions,
) -> ReconciliationOutcome {
    let mut outcome = ReconciliationOutcome::default();
    let mut writes_issued = 0usize;

    for result in results {
        let source = &result.source;
        let reference = source.reference();

        let target = match (&result.target, result.method) {
            (None, _) | (_, MatchMethod::None) => {
                tracing::warn!(reference = %reference, name = %source.name, "no match on target");
                outcome.unmatched.push(UnmatchedItem {
                    reference,
                    name: source.name.clone(),
                    reason: "no match".to_owned(),
                });
                continue;
            }
            (Some(_), method) if !method.is_precise() && !options.accept_name_only => {
                tracing::warn!(reference = %reference, name = %source.name, "name-only match not accepted");
                outcome.unmatched.push(UnmatchedItem {
                    reference,
                    name: source.name.clone(),
                    reason: "ambiguous name-only match".to_owned(),
                });
                continue;
            }
            (Some(target), _) => target,
        };

        let target_reference = target.reference();
        tracing::debug!(
            reference = %reference,
            target = %target_reference,
            method = ?result.method,
            "matched"
        );
        outcome.matched.push(MatchedPair {
            reference: reference.clone(),
            target_reference: target_reference.clone(),
            method: result.method,
        });

        let change = StockChange {
            reference,
            name: source.name.clone(),
            target_reference,
            method: result.method,
            previous: target.stock_quantity,
            quantity: source.stock_quantity,
        };

        if change.previous == change.quantity {
            outcome.unchanged.push(change);
            continue;
        }

        let Some(remote) = target.remote.as_ref() else {
            outcome.errored.push(FailedUpdate {
                reference: change.reference,
                name: change.name,
                target_reference: change.target_reference,
                quantity: change.quantity,
                error: "target variant has no inventory handle".to_owned(),
            });
            continue;
        };

        if options.dry_run {
            tracing::info!(
                reference = %change.reference,
                from = change.previous,
                to = change.quantity,
                "dry-run: would update stock"
            );
            outcome.planned.push(change);
            continue;
        }

        if writes_issued > 0 {
            tokio::time::sleep(options.update_delay).await;
        }
        writes_issued += 1;

        let quantity = change.quantity;
        let written = retry_with_backoff(options.retry, "set_inventory_level", move || {
            writer.set_available(remote, quantity)
        })
        .await;

        match written {
            Ok(()) => {
                tracing::info!(
                    reference = %change.reference,
                    method = ?change.method,
                    from = change.previous,
                    to = change.quantity,
                    "stock updated"
                );
                outcome.updated.push(change);
            }
            Err(e) => {
                tracing::error!(reference = %change.reference, error = %e, "stock update failed");
                outcome.errored.push(FailedUpdate {
                    reference: change.reference,
                    name: change.name,
                    target_reference: change.target_reference,
                    quantity: change.quantity,
                    error: e.to_string(),
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
