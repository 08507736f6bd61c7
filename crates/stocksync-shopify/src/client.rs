//! HTTP client for the Shopify Admin REST API.
//!
//! Reads (listings, inventory levels) go through [`retry_with_backoff`] and
//! follow `Link` cursors with a fixed delay between pages. Writes are sent
//! once; callers that want retries for idempotent writes such as
//! [`ShopifyAdminClient::set_inventory_level`] wrap the call themselves.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use stocksync_core::{retry_with_backoff, AppConfig, RetryPolicy};

use crate::catalog::{to_catalog_items, TargetCatalog};
use crate::error::ShopifyError;
use crate::pagination::{next_page_info, MAX_PAGES};
use crate::types::{
    InventoryLevel, InventoryLevelResponse, InventoryLevelsResponse, LocationsResponse,
    NewProduct, NewProductEnvelope, OrdersResponse, ProductResponse, ProductsResponse,
    SetInventoryLevel, ShopifyLocation, ShopifyOrder, ShopifyProduct,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const CALL_LIMIT_HEADER: &str = "X-Shopify-Shop-Api-Call-Limit";

/// Largest page the Admin API will return.
const PAGE_LIMIT: &str = "250";

/// Inventory item ids per `inventory_levels.json` request.
const INVENTORY_BATCH: usize = 50;

pub struct ShopifyAdminClient {
    client: Client,
    base_url: String,
    access_token: String,
    retry: RetryPolicy,
    page_delay: Duration,
}

impl std::fmt::Debug for ShopifyAdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"[redacted]")
            .field("retry", &self.retry)
            .field("page_delay", &self.page_delay)
            .finish_non_exhaustive()
    }
}

/// Builds `https://{shop}/admin/api/{version}` from a shop domain or handle.
///
/// A bare handle (`"minha-loja"`) is expanded to `minha-loja.myshopify.com`;
/// a scheme and trailing slash are tolerated.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidShop`] for a blank value or one with a path.
pub fn admin_base_url(shop: &str, api_version: &str) -> Result<String, ShopifyError> {
    let host = shop
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    if host.is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
        return Err(ShopifyError::InvalidShop(shop.to_owned()));
    }

    let host = if host.contains('.') {
        host.to_owned()
    } else {
        format!("{host}.myshopify.com")
    };
    Ok(format!("https://{host}/admin/api/{}", api_version.trim()))
}

impl ShopifyAdminClient {
    /// Creates a client for the configured shop and API version.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidShop`] for a malformed shop, or
    /// [`ShopifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ShopifyError> {
        let base_url = admin_base_url(&config.shopify_shop, &config.shopify_api_version)?;
        Self::with_base_url(
            &base_url,
            &config.shopify_access_token,
            config.request_timeout_secs,
            &config.user_agent,
            config.retry_policy(),
            Duration::from_millis(config.page_delay_ms),
        )
    }

    /// Creates a client against an explicit Admin API root (for testing
    /// with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidShop`] if `base_url` does not parse,
    /// or [`ShopifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        page_delay: Duration,
    ) -> Result<Self, ShopifyError> {
        Url::parse(base_url).map_err(|_| ShopifyError::InvalidShop(base_url.to_owned()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            access_token: access_token.to_owned(),
            retry,
            page_delay,
        })
    }

    /// Every product in the shop, across all pages.
    ///
    /// # Errors
    ///
    /// Propagates request errors after retries, or
    /// [`ShopifyError::PaginationLimit`] past [`MAX_PAGES`].
    pub async fn fetch_all_products(&self) -> Result<Vec<ShopifyProduct>, ShopifyError> {
        let products = self
            .fetch_paginated(
                "products",
                &[],
                |r: ProductsResponse| r.products,
                |_: &ShopifyProduct| true,
                None,
            )
            .await?;
        tracing::info!(products = products.len(), "fetched Shopify products");
        Ok(products)
    }

    /// Orders of any status, newest first, keeping only those `keep`
    /// accepts. Paging stops once `max_kept` orders have been kept.
    ///
    /// # Errors
    ///
    /// Propagates request errors after retries, or
    /// [`ShopifyError::PaginationLimit`] past [`MAX_PAGES`].
    pub async fn fetch_orders(
        &self,
        keep: impl FnMut(&ShopifyOrder) -> bool,
        max_kept: Option<usize>,
    ) -> Result<Vec<ShopifyOrder>, ShopifyError> {
        self.fetch_paginated(
            "orders",
            &[("status", "any"), ("order", "created_at desc")],
            |r: OrdersResponse| r.orders,
            keep,
            max_kept,
        )
        .await
    }

    /// # Errors
    ///
    /// Propagates request errors after retries.
    pub async fn fetch_locations(&self) -> Result<Vec<ShopifyLocation>, ShopifyError> {
        let url = self.endpoint("locations", &[])?;
        let (response, _): (LocationsResponse, _) = self.get_page(&url, "shopify_locations").await?;
        Ok(response.locations)
    }

    /// The first active location, where all stock is synced.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NoLocation`] when the shop has none, or
    /// propagates request errors.
    pub async fn default_location(&self) -> Result<ShopifyLocation, ShopifyError> {
        let location = self
            .fetch_locations()
            .await?
            .into_iter()
            .find(|l| l.active)
            .ok_or(ShopifyError::NoLocation)?;
        tracing::info!(location_id = location.id, name = %location.name, "using Shopify location");
        Ok(location)
    }

    /// Available quantity at `location_id` per inventory item, fetched in
    /// batches. Untracked items are absent from the map.
    ///
    /// # Errors
    ///
    /// Propagates request errors after retries.
    pub async fn fetch_inventory_levels(
        &self,
        location_id: i64,
        inventory_item_ids: &[i64],
    ) -> Result<HashMap<i64, i64>, ShopifyError> {
        let mut levels = HashMap::with_capacity(inventory_item_ids.len());
        let location = location_id.to_string();

        for (batch_no, batch) in inventory_item_ids.chunks(INVENTORY_BATCH).enumerate() {
            if batch_no > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            let ids = batch
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let url = self.endpoint(
                "inventory_levels",
                &[
                    ("location_ids", location.as_str()),
                    ("inventory_item_ids", ids.as_str()),
                    ("limit", PAGE_LIMIT),
                ],
            )?;
            let (response, _): (InventoryLevelsResponse, _) =
                self.get_page(&url, "shopify_inventory_levels").await?;
            for level in response.inventory_levels {
                if let Some(available) = level.available {
                    levels.insert(level.inventory_item_id, available);
                }
            }
        }

        tracing::debug!(
            requested = inventory_item_ids.len(),
            tracked = levels.len(),
            "fetched inventory levels"
        );
        Ok(levels)
    }

    /// Products, location quantities, and conversion in one call.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::fetch_all_products`] and
    /// [`Self::fetch_inventory_levels`].
    pub async fn fetch_catalog(&self, location_id: i64) -> Result<TargetCatalog, ShopifyError> {
        let products = self.fetch_all_products().await?;
        let item_ids: Vec<i64> = products
            .iter()
            .flat_map(|p| p.variants.iter().filter_map(|v| v.inventory_item_id))
            .collect();
        let levels = self.fetch_inventory_levels(location_id, &item_ids).await?;

        let (items, rejected) = to_catalog_items(&products, &levels);
        for record in &rejected {
            tracing::warn!(
                reference = %record.reference,
                reason = %record.reason,
                "skipping Shopify variant"
            );
        }

        Ok(TargetCatalog {
            location_id,
            items,
            rejected,
        })
    }

    /// Sets the absolute available quantity of one inventory item at one
    /// location. Sent once.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::Rejected`] on HTTP 422, otherwise the status or
    /// network error of the single attempt.
    pub async fn set_inventory_level(
        &self,
        location_id: i64,
        inventory_item_id: i64,
        available: i64,
    ) -> Result<InventoryLevel, ShopifyError> {
        let url = format!("{}/inventory_levels/set.json", self.base_url);
        let body = SetInventoryLevel {
            location_id,
            inventory_item_id,
            available,
        };
        let response = self
            .client
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&body)
            .send()
            .await?;
        let response = into_success(response, &url).await?;
        let body = response.text().await?;
        let parsed: InventoryLevelResponse =
            serde_json::from_str(&body).map_err(|e| ShopifyError::Deserialize {
                context: format!("inventory_levels/set for item {inventory_item_id}"),
                source: e,
            })?;
        Ok(parsed.inventory_level)
    }

    /// Creates a product with its variants. Sent once.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::Rejected`] when Shopify refuses the payload (e.g. a
    /// duplicate SKU), otherwise the status or network error of the attempt.
    pub async fn create_product(&self, product: &NewProduct) -> Result<ShopifyProduct, ShopifyError> {
        let url = format!("{}/products.json", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&NewProductEnvelope { product })
            .send()
            .await?;
        let response = into_success(response, &url).await?;
        let body = response.text().await?;
        let parsed: ProductResponse =
            serde_json::from_str(&body).map_err(|e| ShopifyError::Deserialize {
                context: format!("created product \"{}\"", product.title),
                source: e,
            })?;
        Ok(parsed.product)
    }

    /// Walks a cursor-paginated listing.
    ///
    /// `filters` apply to the first page only; later pages carry just
    /// `limit` and `page_info`.
    async fn fetch_paginated<R, I>(
        &self,
        resource: &str,
        filters: &[(&str, &str)],
        take: impl Fn(R) -> Vec<I>,
        mut keep: impl FnMut(&I) -> bool,
        max_kept: Option<usize>,
    ) -> Result<Vec<I>, ShopifyError>
    where
        R: DeserializeOwned,
    {
        let operation = format!("shopify_{resource}");
        let mut kept: Vec<I> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ShopifyError::PaginationLimit {
                    resource: resource.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }
            if page_count > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let url = match cursor.as_deref() {
                Some(page_info) => {
                    self.endpoint(resource, &[("limit", PAGE_LIMIT), ("page_info", page_info)])?
                }
                None => {
                    let mut params = vec![("limit", PAGE_LIMIT)];
                    params.extend_from_slice(filters);
                    self.endpoint(resource, &params)?
                }
            };

            let (response, link) = self.get_page::<R>(&url, &operation).await?;
            for entry in take(response) {
                if keep(&entry) {
                    kept.push(entry);
                    if max_kept.is_some_and(|max| kept.len() >= max) {
                        tracing::info!(resource, kept = kept.len(), "reached requested maximum");
                        return Ok(kept);
                    }
                }
            }

            cursor = next_page_info(link.as_deref());
            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!(resource, pages = page_count, kept = kept.len(), "pagination complete");
        Ok(kept)
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, ShopifyError> {
        let raw = format!("{}/{resource}.json", self.base_url);
        let mut url = Url::parse(&raw).map_err(|_| ShopifyError::InvalidShop(raw.clone()))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET with retry; returns the parsed body and the raw `Link` header.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &Url,
        operation: &str,
    ) -> Result<(T, Option<String>), ShopifyError> {
        retry_with_backoff(self.retry, operation, || async move {
            let response = self
                .client
                .get(url.clone())
                .header(ACCESS_TOKEN_HEADER, &self.access_token)
                .send()
                .await?;
            let response = into_success(response, url.as_str()).await?;

            if let Some(limit) = response
                .headers()
                .get(CALL_LIMIT_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                tracing::debug!(call_limit = limit, "Shopify API call budget");
            }

            let link = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let body = response.text().await?;
            let parsed = serde_json::from_str::<T>(&body).map_err(|e| ShopifyError::Deserialize {
                context: url.path().to_owned(),
                source: e,
            })?;
            Ok((parsed, link))
        })
        .await
    }
}

/// Maps non-2xx responses to typed errors. Reads the body only for 422,
/// where it carries Shopify's validation messages.
async fn into_success(response: Response, url: &str) -> Result<Response, ShopifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            // Shopify sends fractional seconds ("2.0").
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split('.').next())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(2);
            Err(ShopifyError::RateLimited { retry_after_secs })
        }
        StatusCode::NOT_FOUND => Err(ShopifyError::NotFound {
            url: url.to_owned(),
        }),
        StatusCode::UNPROCESSABLE_ENTITY => {
            let message = response.text().await.unwrap_or_default();
            Err(ShopifyError::Rejected {
                context: url.to_owned(),
                message,
            })
        }
        _ => Err(ShopifyError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        }),
    }
}
