//! Client for the keyed `/product` endpoint.

use dealscan_core::KeepaSettings;
use reqwest::{Client, Url};

use crate::error::CatalogError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{KeepaProductResponse, RawItem};

use super::{provider_error, CatalogProvider};

const PROVIDER: &str = "keepa";
const MAX_BATCH: usize = 100;
const DEFAULT_BASE_URL: &str = "https://api.keepa.com/";
const BACKOFF_BASE_MS: u64 = 2_000;

/// Client for the keyed catalog API.
///
/// The GET call is idempotent, so transient failures (timeouts, 429, 5xx)
/// are retried up to `max_retries` times with backoff.
pub struct KeepaClient {
    client: Client,
    settings: KeepaSettings,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl KeepaClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if the base URL is invalid.
    pub fn new(
        client: Client,
        settings: KeepaSettings,
        max_retries: u32,
    ) -> Result<Self, CatalogError> {
        Self::with_base_url(client, settings, max_retries, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        client: Client,
        settings: KeepaSettings,
        max_retries: u32,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        // Trailing slash so `join("product")` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| CatalogError::InvalidEndpoint {
            endpoint: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            settings,
            base_url: parsed,
            max_retries,
            backoff_base_ms: BACKOFF_BASE_MS,
        })
    }

    /// Overrides the retry backoff base; tests set it to zero.
    #[must_use]
    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    fn product_url(&self, api_key: &str, identifiers: &[String]) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join("product")
            .map_err(|e| CatalogError::InvalidEndpoint {
                endpoint: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .append_pair("domain", &self.settings.domain.to_string())
            .append_pair("asin", &identifiers.join(","))
            .append_pair("stats", "1");
        Ok(url)
    }

    /// Fetches up to a hundred products in one GET call.
    ///
    /// Without an API key no request is made: a warning is logged and the
    /// result is empty, so every identifier in the batch is reported missing.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Provider`] for a non-2xx status after retries.
    /// - [`CatalogError::Http`] on network failure after retries.
    /// - [`CatalogError::Deserialize`] if the body is not the expected JSON.
    pub async fn get_products(
        &self,
        identifiers: &[String],
    ) -> Result<Vec<RawItem>, CatalogError> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            tracing::warn!(
                provider = PROVIDER,
                identifiers = identifiers.len(),
                "no API key configured; skipping provider call"
            );
            return Ok(Vec::new());
        };

        let url = self.product_url(api_key, identifiers)?;

        let parsed = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(provider_error(PROVIDER, response).await);
                }
                let text = response.text().await?;
                serde_json::from_str::<KeepaProductResponse>(&text).map_err(|e| {
                    CatalogError::Deserialize {
                        context: format!("product response for {} identifiers", identifiers.len()),
                        source: e,
                    }
                })
            }
        })
        .await?;

        if let Some(tokens_left) = parsed.tokens_left {
            tracing::debug!(provider = PROVIDER, tokens_left, "provider token balance");
        }

        Ok(parsed.products.into_iter().map(RawItem::Keepa).collect())
    }
}

impl CatalogProvider for KeepaClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH
    }

    fn makes_requests(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn fetch_batch(&self, identifiers: &[String]) -> Result<Vec<RawItem>, CatalogError> {
        self.get_products(identifiers).await
    }
}
