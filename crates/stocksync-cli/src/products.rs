//! `stocksync products`: create storefront products for ERP items the
//! storefront does not carry yet.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use stocksync_core::{AppConfig, CatalogItem, MatchingRules, RejectedRecord};
use stocksync_hiper::HiperClient;
use stocksync_matching::{build_index, CatalogIndex};
use stocksync_shopify::{NewProduct, NewProductOption, NewVariant, ShopifyAdminClient};

use crate::report::{summary_line, ReportBuckets, RunReport};

#[derive(Debug, Subcommand)]
pub enum ProductsCommands {
    /// Create Shopify products for Hiper items with no matching SKU
    CreateMissing {
        /// List the products that would be created without creating them
        #[arg(long)]
        dry_run: bool,

        /// Stop after this many candidates
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// A source item chosen for creation and the product built from it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub sku: String,
    pub product: NewProduct,
}

#[derive(Debug, Default)]
pub(crate) struct CandidateSelection {
    pub candidates: Vec<Candidate>,
    /// SKUs already present on the storefront, as a variant SKU prefix.
    pub already_exists: Vec<String>,
    /// Items whose code is not a catalog SKU.
    pub skipped: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatedProduct {
    pub sku: String,
    pub title: String,
    /// `None` on dry runs.
    pub product_id: Option<i64>,
    pub variant_skus: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FailedCreation {
    pub sku: String,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct CreationOutcome {
    pub created: Vec<CreatedProduct>,
    pub already_exists: Vec<String>,
    pub errored: Vec<FailedCreation>,
}

impl ReportBuckets for CreationOutcome {
    fn totals(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("created", self.created.len()),
            ("already_exists", self.already_exists.len()),
            ("errored", self.errored.len()),
        ])
    }
}

/// Picks the source items that need a storefront product.
///
/// An item qualifies when its SKU follows the SKU policy, is not purely
/// numeric, and no target variant SKU starts with it (created variants carry
/// `{sku}{size}`). Each SKU is considered once.
pub(crate) fn select_candidates(
    sources: &[CatalogItem],
    targets: &CatalogIndex,
    rules: &MatchingRules,
) -> CandidateSelection {
    let mut selection = CandidateSelection::default();
    let mut seen = HashSet::new();

    for item in sources {
        let Some(sku) = item.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            selection
                .skipped
                .push(RejectedRecord::new(item.reference(), "no SKU"));
            continue;
        };
        if !seen.insert(sku.to_uppercase()) {
            continue;
        }
        if !rules.sku_policy.is_valid(sku) {
            selection
                .skipped
                .push(RejectedRecord::new(sku, "SKU does not follow the catalog convention"));
            continue;
        }
        if sku.chars().all(|c| c.is_ascii_digit()) {
            selection
                .skipped
                .push(RejectedRecord::new(sku, "numeric SKU"));
            continue;
        }
        if targets.has_sku_prefix(sku) {
            selection.already_exists.push(sku.to_owned());
            continue;
        }

        selection.candidates.push(Candidate {
            sku: sku.to_owned(),
            product: new_product(item, sku, rules),
        });
    }

    selection
}

/// One variant per default size, SKU `{sku}{size}`, stock 0.
pub(crate) fn new_product(item: &CatalogItem, sku: &str, rules: &MatchingRules) -> NewProduct {
    let defaults = &rules.product_defaults;
    let price = item.price.clone().unwrap_or_else(|| "0.00".to_owned());

    NewProduct {
        title: item.name.trim().to_owned(),
        body_html: None,
        vendor: item
            .brand
            .clone()
            .unwrap_or_else(|| defaults.vendor.clone()),
        product_type: item
            .category
            .clone()
            .unwrap_or_else(|| defaults.product_type.clone()),
        options: vec![NewProductOption {
            name: defaults.size_option.clone(),
            values: defaults.sizes.clone(),
        }],
        variants: defaults
            .sizes
            .iter()
            .map(|size| NewVariant {
                option1: size.clone(),
                sku: format!("{sku}{size}"),
                price: price.clone(),
                inventory_management: "shopify".to_owned(),
                inventory_quantity: 0,
                requires_shipping: true,
            })
            .collect(),
    }
}

/// Create missing products one at a time, pacing requests and writing a
/// checkpoint report every `checkpoint_every` candidates.
///
/// # Errors
///
/// Returns an error if either feed cannot be loaded or a report cannot be
/// written. Per-product failures are logged and recorded, not propagated.
pub(crate) async fn run_create_missing(
    config: &AppConfig,
    rules: MatchingRules,
    dry_run: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let report = RunReport::start(&config.reports_dir, "products", dry_run, Utc::now());
    tracing::info!(run_id = %report.run_id(), dry_run, "create-missing started");

    let mut hiper = HiperClient::new(config)
        .map_err(|e| anyhow::anyhow!("failed to build Hiper client: {e}"))?;
    hiper.authenticate().await?;
    let feed = hiper.fetch_feed().await?;

    let shopify = ShopifyAdminClient::new(config)
        .map_err(|e| anyhow::anyhow!("failed to build Shopify client: {e}"))?;
    let products = shopify.fetch_all_products().await?;
    // Only SKUs matter here, so per-location levels are not fetched.
    let (targets, target_rejected) = stocksync_shopify::to_catalog_items(&products, &HashMap::new());

    let keys = stocksync_matching::KeyBuilder::new(rules)?;
    let index = build_index(&targets, &keys);
    let sources: Vec<CatalogItem> = feed
        .items
        .into_iter()
        .filter(|item| keys.in_brand_scope(item))
        .collect();
    let selection = select_candidates(&sources, &index, keys.rules());

    let mut rejected = feed.rejected;
    rejected.extend(target_rejected);
    rejected.extend(selection.skipped);

    let mut outcome = CreationOutcome {
        already_exists: selection.already_exists,
        ..CreationOutcome::default()
    };
    let total = selection.candidates.len();
    let candidates = selection
        .candidates
        .into_iter()
        .take(limit.unwrap_or(usize::MAX));

    for (i, candidate) in candidates.enumerate() {
        let variant_skus: Vec<String> = candidate
            .product
            .variants
            .iter()
            .map(|v| v.sku.clone())
            .collect();

        if dry_run {
            println!("dry-run: would create '{}' ({})", candidate.product.title, candidate.sku);
            outcome.created.push(CreatedProduct {
                sku: candidate.sku,
                title: candidate.product.title,
                product_id: None,
                variant_skus,
            });
        } else {
            if i > 0 {
                tokio::time::sleep(config.update_delay()).await;
            }
            match shopify.create_product(&candidate.product).await {
                Ok(created) => {
                    tracing::info!(sku = %candidate.sku, product_id = created.id, "product created");
                    outcome.created.push(CreatedProduct {
                        sku: candidate.sku,
                        title: candidate.product.title,
                        product_id: Some(created.id),
                        variant_skus,
                    });
                }
                Err(e) => {
                    tracing::error!(sku = %candidate.sku, error = %e, "product creation failed");
                    outcome.errored.push(FailedCreation {
                        sku: candidate.sku,
                        title: candidate.product.title,
                        error: e.to_string(),
                    });
                }
            }
        }

        let processed = i + 1;
        if config.checkpoint_every > 0 && processed % config.checkpoint_every == 0 {
            tracing::info!(processed, total, "checkpoint");
            report.checkpoint(&outcome, &rejected)?;
        }
    }

    let path = report.finish(&outcome, &rejected, Utc::now())?;
    println!(
        "create-missing complete: {} (report: {})",
        summary_line(&outcome.totals()),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksync_core::RemoteVariantRef;
    use stocksync_matching::KeyBuilder;

    fn index(targets: &[CatalogItem]) -> CatalogIndex {
        let keys = KeyBuilder::new(MatchingRules::default()).unwrap();
        build_index(targets, &keys)
    }

    fn target(sku: &str) -> CatalogItem {
        CatalogItem::new("Blusa Alba", 1)
            .with_sku(sku)
            .with_remote(RemoteVariantRef {
                product_id: 1,
                variant_id: 2,
                inventory_item_id: 3,
            })
    }

    #[test]
    fn selects_only_new_catalog_skus() {
        let sources = vec![
            CatalogItem::new("Blusa Alba", 4).with_sku("C0700136"),
            CatalogItem::new("Saia Lua", 2).with_sku("C0700200"),
            CatalogItem::new("Meia", 9).with_sku("9990000000017"),
            CatalogItem::new("Brinde", 1).with_sku("XYZ"),
            CatalogItem::new("Sem codigo", 1),
        ];
        let selection = select_candidates(
            &sources,
            &index(&[target("C070013638")]),
            &MatchingRules::default(),
        );

        let skus: Vec<&str> = selection.candidates.iter().map(|c| c.sku.as_str()).collect();
        assert_eq!(skus, vec!["C0700200"]);
        assert_eq!(selection.already_exists, vec!["C0700136".to_owned()]);
        let reasons: Vec<&str> = selection.skipped.iter().map(|r| r.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec!["numeric SKU", "SKU does not follow the catalog convention", "no SKU"]
        );
    }

    #[test]
    fn repeated_sku_is_considered_once() {
        let sources = vec![
            CatalogItem::new("Saia Lua", 2).with_sku("C0700200"),
            CatalogItem::new("Saia Lua", 3).with_sku("c0700200"),
        ];
        let selection = select_candidates(&sources, &index(&[]), &MatchingRules::default());
        assert_eq!(selection.candidates.len(), 1);
    }

    #[test]
    fn product_has_one_variant_per_default_size() {
        let mut item = CatalogItem::new("Saia Lua ", 2).with_sku("C0700200");
        item.price = Some("89.90".to_owned());
        item.brand = Some("Saphira".to_owned());

        let product = new_product(&item, "C0700200", &MatchingRules::default());

        assert_eq!(product.title, "Saia Lua");
        assert_eq!(product.vendor, "Saphira");
        assert_eq!(product.product_type, "Categoria não especificada");
        assert_eq!(product.options[0].name, "Tamanho");
        let skus: Vec<&str> = product.variants.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["C070020036", "C070020038", "C070020040", "C070020042"]);
        assert!(product
            .variants
            .iter()
            .all(|v| v.price == "89.90" && v.inventory_quantity == 0 && v.inventory_management == "shopify"));
    }

    #[test]
    fn missing_price_defaults_to_zero() {
        let item = CatalogItem::new("Saia Lua", 2);
        let product = new_product(&item, "C0700200", &MatchingRules::default());
        assert_eq!(product.variants[0].price, "0.00");
        assert_eq!(product.vendor, "Marca não especificada");
    }
}
