//! HTTP client for the Hiper e-commerce API.
//!
//! Authentication is a two-step handshake: the store's security key is
//! exchanged for a bearer token at `auth/gerar-token/{key}`, and the token
//! authorizes every later call. Reads are retried with the configured
//! [`RetryPolicy`]; order submission is not, since a replayed POST could
//! create a duplicate sales order.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use stocksync_core::{retry_with_backoff, AppConfig, RetryPolicy};

use crate::error::HiperError;
use crate::feed::{convert_products, parse_products, SourceFeed};
use crate::order::HiperOrder;
use crate::types::{HiperProductsResponse, HiperTokenResponse};

pub struct HiperClient {
    client: Client,
    base_url: String,
    security_key: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for HiperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiperClient")
            .field("base_url", &self.base_url)
            .field("security_key", &"[redacted]")
            .field("authenticated", &self.token.is_some())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HiperClient {
    /// Creates a client from the run configuration.
    ///
    /// # Errors
    ///
    /// See [`HiperClient::with_base_url`].
    pub fn new(config: &AppConfig) -> Result<Self, HiperError> {
        Self::with_base_url(
            &config.hiper_base_url,
            &config.hiper_security_key,
            config.request_timeout_secs,
            &config.user_agent,
            config.retry_policy(),
        )
    }

    /// Creates a client against an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`HiperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`HiperError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        security_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, HiperError> {
        Url::parse(base_url).map_err(|_| HiperError::InvalidBaseUrl(base_url.to_owned()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            security_key: security_key.to_owned(),
            token: None,
            retry,
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exchanges the security key for a bearer token and keeps it for later
    /// calls.
    ///
    /// # Errors
    ///
    /// - [`HiperError::Auth`] if the key is rejected or the response has no
    ///   token.
    /// - [`HiperError::Http`] / [`HiperError::UnexpectedStatus`] after all
    ///   retries are exhausted.
    pub async fn authenticate(&mut self) -> Result<(), HiperError> {
        let url = format!("{}/auth/gerar-token/{}", self.base_url, self.security_key);
        let display = format!("{}/auth/gerar-token/[redacted]", self.base_url);

        let response: HiperTokenResponse = self
            .get_json(&url, &display, &self.security_key, "hiper_auth")
            .await?;

        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| HiperError::Auth("token missing from gerar-token response".to_owned()))?;

        tracing::info!("Hiper token acquired");
        self.token = Some(token);
        Ok(())
    }

    /// Fetches the full inventory feed and converts it to catalog items.
    ///
    /// Malformed or invalid records are returned in [`SourceFeed::rejected`]
    /// and logged; they never fail the call.
    ///
    /// # Errors
    ///
    /// - [`HiperError::Auth`] if [`HiperClient::authenticate`] has not
    ///   succeeded yet, or the token is rejected.
    /// - [`HiperError::Http`] / [`HiperError::UnexpectedStatus`] /
    ///   [`HiperError::RateLimited`] after all retries are exhausted.
    /// - [`HiperError::Deserialize`] if the envelope is not the expected shape.
    pub async fn fetch_feed(&self) -> Result<SourceFeed, HiperError> {
        let token = self.token()?;
        let url = format!("{}/produtos/pontoDeSincronizacao", self.base_url);

        let response: HiperProductsResponse =
            self.get_json(&url, &url, token, "hiper_products").await?;
        let total = response.produtos.len();

        let (products, mut rejected) = parse_products(response.produtos);
        let mut feed = convert_products(&products);
        rejected.append(&mut feed.rejected);
        feed.rejected = rejected;

        for record in &feed.rejected {
            tracing::warn!(
                reference = %record.reference,
                reason = %record.reason,
                "skipping Hiper record"
            );
        }
        tracing::info!(
            products = total,
            items = feed.items.len(),
            rejected = feed.rejected.len(),
            "fetched Hiper feed"
        );

        Ok(feed)
    }

    /// Submits one sales order. Not retried.
    ///
    /// Returns the response body as JSON (`Null` when empty).
    ///
    /// # Errors
    ///
    /// - [`HiperError::Auth`] if not authenticated or the token is rejected.
    /// - [`HiperError::UnexpectedStatus`] if the order is refused.
    /// - [`HiperError::Http`] on network failure.
    pub async fn submit_order(&self, order: &HiperOrder) -> Result<serde_json::Value, HiperError> {
        let token = self.token()?;
        let url = format!("{}/pedido-de-venda/", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(order)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response, &url)?;
        let body = response.text().await.map_err(transport_error)?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| HiperError::Deserialize {
            context: format!("pedido-de-venda #{}", order.numero_pedido_de_venda),
            source: e,
        })
    }

    fn token(&self) -> Result<&str, HiperError> {
        self.token
            .as_deref()
            .ok_or_else(|| HiperError::Auth("not authenticated".to_owned()))
    }

    /// GET with bearer auth, status mapping, retry, and JSON parsing.
    ///
    /// `display_url` is used in errors and logs in place of `url`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        display_url: &str,
        bearer: &str,
        operation: &str,
    ) -> Result<T, HiperError> {
        retry_with_backoff(self.retry, operation, || async move {
            let response = self
                .client
                .get(url)
                .bearer_auth(bearer)
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, display_url)?;
            let body = response.text().await.map_err(transport_error)?;
            serde_json::from_str::<T>(&body).map_err(|e| HiperError::Deserialize {
                context: display_url.to_owned(),
                source: e,
            })
        })
        .await
    }
}

/// The auth URL embeds the security key, so request URLs never reach the
/// error.
fn transport_error(err: reqwest::Error) -> HiperError {
    HiperError::Http(err.without_url())
}

fn check_status(response: Response, display_url: &str) -> Result<Response, HiperError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(HiperError::RateLimited { retry_after_secs });
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(HiperError::Auth(format!("HTTP {status} from {display_url}")));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(HiperError::NotFound {
            url: display_url.to_owned(),
        });
    }
    if !status.is_success() {
        return Err(HiperError::UnexpectedStatus {
            status: status.as_u16(),
            url: display_url.to_owned(),
        });
    }
    Ok(response)
}
