//! WooCommerce REST API client.
//!
//! Fetches the full product catalog page by page and hands it to the engine
//! as a [`CatalogSource`].
//!
//! # API Reference
//!
//! - Endpoint: `{base}/wp-json/wc/v3/products?per_page=N&page=P`
//! - Authentication: HTTP basic auth with the consumer key and secret
//! - Paging: `X-WP-TotalPages` response header; a short page, or one with
//!   no unseen ids, ends the listing

use async_trait::async_trait;
use catalog_engine::{error::Result as EngineResult, CatalogSource, Error, RemoteProduct};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::WooCommerceConfig;

/// Path of the products listing, relative to the store URL.
const PRODUCTS_PATH: &str = "/wp-json/wc/v3/products";

/// Header carrying the total page count.
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Request timeout per page.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// First retry delay; doubled after every attempt.
const RETRY_BASE: Duration = Duration::from_millis(250);

/// Errors that can occur when talking to WooCommerce.
#[derive(Debug, thiserror::Error)]
pub enum WooCommerceError {
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the API.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl WooCommerceError {
    /// Whether trying the same request again may succeed.
    fn is_retryable(&self) -> bool {
        match self {
            WooCommerceError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            WooCommerceError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
        }
    }
}

/// One page of the product listing.
#[derive(Debug)]
struct Page {
    products: Vec<RemoteProduct>,
    total_pages: Option<u32>,
}

/// WooCommerce products client.
#[derive(Debug, Clone)]
pub struct WooCommerceClient {
    client: reqwest::Client,
    products_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
    per_page: u32,
    max_retries: u32,
    retry_base: Duration,
}

impl WooCommerceClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WooCommerceConfig) -> Result<Self, WooCommerceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("catalog-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            products_url: format!("{}{}", config.base_url, PRODUCTS_PATH),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            per_page: config.per_page,
            max_retries: config.max_retries,
            retry_base: RETRY_BASE,
        })
    }

    /// URL of the products listing.
    pub fn products_url(&self) -> &str {
        &self.products_url
    }

    /// Fetch every product across all pages.
    pub async fn fetch_products(&self) -> Result<Vec<RemoteProduct>, WooCommerceError> {
        let mut products = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1;

        loop {
            let Page {
                products: batch,
                total_pages,
            } = self.fetch_page(page).await?;
            let fetched = batch.len();
            let new_ids = batch.iter().filter(|p| seen.insert(p.id)).count();

            tracing::debug!(page, fetched, new_ids, ?total_pages, "fetched product page");

            // A remote that ignores `page` repeats the same full page forever.
            if fetched > 0 && new_ids == 0 {
                tracing::warn!(page, "page repeated earlier products, stopping");
                break;
            }
            products.extend(batch);

            if !has_more(page, fetched, self.per_page, total_pages) {
                break;
            }
            page += 1;
        }

        tracing::info!(count = products.len(), pages = page, "fetched remote catalog");
        Ok(products)
    }

    /// Fetch one page, retrying transient failures with exponential backoff.
    async fn fetch_page(&self, page: u32) -> Result<Page, WooCommerceError> {
        let mut attempt = 0;
        loop {
            match self.request_page(page).await {
                Ok(result) => return Ok(result),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    let delay = backoff(self.retry_base, attempt);
                    tracing::warn!(page, attempt, ?delay, error = %err, "retrying product page");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn request_page(&self, page: u32) -> Result<Page, WooCommerceError> {
        let response = self
            .client
            .get(&self.products_url)
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .query(&[("per_page", self.per_page), ("page", page)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WooCommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let products = response.json().await?;

        Ok(Page {
            products,
            total_pages,
        })
    }
}

#[async_trait]
impl CatalogSource for WooCommerceClient {
    async fn fetch_all(&self) -> EngineResult<Vec<RemoteProduct>> {
        self.fetch_products()
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))
    }
}

/// Decide whether another page follows the one just fetched.
fn has_more(page: u32, fetched: usize, per_page: u32, total_pages: Option<u32>) -> bool {
    if fetched < per_page as usize {
        return false;
    }
    match total_pages {
        Some(total) => page < total,
        None => true,
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
