//! Catalog provider clients.
//!
//! Two providers are supported, selected by configuration:
//! - [`PaapiClient`]: signed JSON POST, up to 10 identifiers per call.
//! - [`KeepaClient`]: keyed GET, up to 100 identifiers per call.
//!
//! Both implement [`CatalogProvider`]; [`CatalogClient`] wraps whichever one
//! the configuration selects.

mod keepa;
mod paapi;

use std::future::Future;
use std::time::Duration;

use dealscan_core::{AppConfig, ProviderKind};
use reqwest::Client;

use crate::error::CatalogError;
use crate::types::RawItem;

pub use keepa::KeepaClient;
pub use paapi::PaapiClient;

/// A source of raw catalog items keyed by identifier.
///
/// Implementations make exactly one provider call per `fetch_batch` (plus
/// retries where the call is idempotent). Items the provider does not know
/// are simply absent from the result; the caller detects them.
pub trait CatalogProvider {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Largest batch the provider accepts.
    fn max_batch_size(&self) -> usize;

    /// Whether `fetch_batch` reaches the network. A provider that answers
    /// locally does not consume a rate-limiter slot.
    fn makes_requests(&self) -> bool {
        true
    }

    /// Fetches raw items for `identifiers` in one provider call.
    fn fetch_batch(
        &self,
        identifiers: &[String],
    ) -> impl Future<Output = Result<Vec<RawItem>, CatalogError>> + Send;
}

/// The provider selected for a run.
pub enum CatalogClient {
    Paapi(PaapiClient),
    Keepa(KeepaClient),
}

impl CatalogClient {
    /// Builds the client for `config.provider`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] if the HTTP client cannot be constructed
    ///   (e.g. an unparseable proxy URL).
    /// - [`CatalogError::InvalidEndpoint`] if the signed API is selected but
    ///   its credentials are absent, or its host does not form a valid URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let http = build_http_client(
            config.request_timeout_secs,
            &config.user_agent,
            config.proxy_url.as_deref(),
        )?;

        match config.provider {
            ProviderKind::Paapi => {
                let credentials =
                    config
                        .paapi
                        .clone()
                        .ok_or_else(|| CatalogError::InvalidEndpoint {
                            endpoint: "paapi".to_owned(),
                            reason: "signed API selected without credentials".to_owned(),
                        })?;
                Ok(Self::Paapi(PaapiClient::new(http, credentials)?))
            }
            ProviderKind::Keepa => Ok(Self::Keepa(KeepaClient::new(
                http,
                config.keepa.clone(),
                config.max_retries,
            )?)),
        }
    }
}

impl CatalogProvider for CatalogClient {
    fn name(&self) -> &'static str {
        match self {
            CatalogClient::Paapi(c) => c.name(),
            CatalogClient::Keepa(c) => c.name(),
        }
    }

    fn max_batch_size(&self) -> usize {
        match self {
            CatalogClient::Paapi(c) => c.max_batch_size(),
            CatalogClient::Keepa(c) => c.max_batch_size(),
        }
    }

    fn makes_requests(&self) -> bool {
        match self {
            CatalogClient::Paapi(c) => c.makes_requests(),
            CatalogClient::Keepa(c) => c.makes_requests(),
        }
    }

    async fn fetch_batch(&self, identifiers: &[String]) -> Result<Vec<RawItem>, CatalogError> {
        match self {
            CatalogClient::Paapi(c) => c.fetch_batch(identifiers).await,
            CatalogClient::Keepa(c) => c.fetch_batch(identifiers).await,
        }
    }
}

/// Builds the shared `reqwest` client: request and connect timeouts, a fixed
/// `User-Agent`, and an optional proxy applied to every scheme.
///
/// # Errors
///
/// Returns [`CatalogError::Http`] if the proxy URL is invalid or the client
/// cannot be constructed.
pub fn build_http_client(
    timeout_secs: u64,
    user_agent: &str,
    proxy_url: Option<&str>,
) -> Result<Client, CatalogError> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent);

    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}

/// Reads a failed response into [`CatalogError::Provider`], falling back to
/// the status reason when the body is empty or unreadable.
pub(crate) async fn provider_error(
    provider: &'static str,
    response: reqwest::Response,
) -> CatalogError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_owned()
    } else {
        body
    };
    CatalogError::Provider {
        provider,
        status: status.as_u16(),
        body,
    }
}
