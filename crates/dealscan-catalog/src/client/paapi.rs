//! Client for the signed `GetItems` operation.

use chrono::Utc;
use dealscan_core::PaapiCredentials;
use reqwest::{Client, Url};

use crate::error::CatalogError;
use crate::signer::{sign_request, SigningParams};
use crate::types::{PaapiGetItemsResponse, RawItem};

use super::{provider_error, CatalogProvider};

const PROVIDER: &str = "paapi";
const MAX_BATCH: usize = 10;
const SERVICE: &str = "ProductAdvertisingAPI";
const TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems";
const GET_ITEMS_PATH: &str = "/paapi5/getitems";
const PARTNER_TYPE: &str = "Associates";

/// Response fields requested for every item.
pub const RESOURCES: [&str; 4] = [
    "ItemInfo.Title",
    "Offers.Listings.Price",
    "Offers.Listings.SavingBasis",
    "Images.Primary.Large",
];

/// Client for the signed catalog API.
///
/// Each call is a single signed POST. The call is never retried: a replayed
/// request would need a fresh signature and counts against the same quota.
pub struct PaapiClient {
    client: Client,
    credentials: PaapiCredentials,
    endpoint: Url,
}

impl PaapiClient {
    /// Creates a client posting to `https://{host}/paapi5/getitems`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if the configured host does
    /// not form a valid URL.
    pub fn new(client: Client, credentials: PaapiCredentials) -> Result<Self, CatalogError> {
        let endpoint = format!("https://{}{GET_ITEMS_PATH}", credentials.host);
        Self::with_endpoint(client, credentials, &endpoint)
    }

    /// Creates a client posting to an explicit endpoint (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute URL with a host.
    pub fn with_endpoint(
        client: Client,
        credentials: PaapiCredentials,
        endpoint: &str,
    ) -> Result<Self, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason,
        };
        let endpoint_url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if endpoint_url.host_str().is_none() {
            return Err(invalid("URL has no host".to_owned()));
        }

        Ok(Self {
            client,
            credentials,
            endpoint: endpoint_url,
        })
    }

    /// `host[:port]` exactly as the HTTP client will send it.
    fn host_header(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        }
    }

    fn request_body(&self, identifiers: &[String]) -> String {
        serde_json::json!({
            "ItemIds": identifiers,
            "PartnerTag": self.credentials.partner_tag,
            "PartnerType": PARTNER_TYPE,
            "Marketplace": self.credentials.marketplace,
            "Resources": RESOURCES,
        })
        .to_string()
    }

    /// Fetches up to ten items in one signed call.
    ///
    /// Items the API reports under `Errors` are logged and omitted.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Provider`] for any non-2xx status.
    /// - [`CatalogError::Http`] on network or TLS failure.
    /// - [`CatalogError::Deserialize`] if the body is not the expected JSON.
    /// - [`CatalogError::Signing`] if the request cannot be signed.
    pub async fn get_items(&self, identifiers: &[String]) -> Result<Vec<RawItem>, CatalogError> {
        let body = self.request_body(identifiers);
        let host = self.host_header();
        let params = SigningParams {
            access_key: &self.credentials.access_key,
            secret_key: &self.credentials.secret_key,
            region: &self.credentials.region,
            service: SERVICE,
            host: &host,
            target: TARGET,
            path: self.endpoint.path(),
        };
        let signed = sign_request(&params, &body, Utc::now())?;

        let mut request = self.client.post(self.endpoint.clone());
        for (name, value) in &signed.headers {
            // reqwest derives Host from the URL; it matches the signed value.
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request.body(signed.body).send().await?;
        if !response.status().is_success() {
            return Err(provider_error(PROVIDER, response).await);
        }

        let text = response.text().await?;
        let parsed: PaapiGetItemsResponse =
            serde_json::from_str(&text).map_err(|e| CatalogError::Deserialize {
                context: format!("GetItems response for {} identifiers", identifiers.len()),
                source: e,
            })?;

        for error in &parsed.errors {
            tracing::warn!(
                provider = PROVIDER,
                code = error.code.as_deref().unwrap_or("unknown"),
                message = error.message.as_deref().unwrap_or(""),
                "provider reported item error"
            );
        }

        Ok(parsed
            .items_result
            .map(|result| result.items)
            .unwrap_or_default()
            .into_iter()
            .map(RawItem::Paapi)
            .collect())
    }
}

impl CatalogProvider for PaapiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH
    }

    async fn fetch_batch(&self, identifiers: &[String]) -> Result<Vec<RawItem>, CatalogError> {
        self.get_items(identifiers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> PaapiCredentials {
        PaapiCredentials {
            access_key: "AKIDEXAMPLE".to_owned(),
            secret_key: "secret".to_owned(),
            partner_tag: "deals-20".to_owned(),
            host: "webservices.amazon.com".to_owned(),
            region: "us-east-1".to_owned(),
            marketplace: "www.amazon.com".to_owned(),
        }
    }

    #[test]
    fn default_endpoint_uses_configured_host() {
        let client = PaapiClient::new(Client::new(), credentials()).unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "https://webservices.amazon.com/paapi5/getitems"
        );
        assert_eq!(client.host_header(), "webservices.amazon.com");
    }

    #[test]
    fn host_header_keeps_explicit_port() {
        let client = PaapiClient::with_endpoint(
            Client::new(),
            credentials(),
            "http://127.0.0.1:8123/paapi5/getitems",
        )
        .unwrap();
        assert_eq!(client.host_header(), "127.0.0.1:8123");
    }

    #[test]
    fn rejects_relative_endpoint() {
        let result = PaapiClient::with_endpoint(Client::new(), credentials(), "/paapi5/getitems");
        assert!(matches!(result, Err(CatalogError::InvalidEndpoint { .. })));
    }

    #[test]
    fn request_body_lists_identifiers_and_resources() {
        let client = PaapiClient::new(Client::new(), credentials()).unwrap();
        let ids = vec!["B000111222".to_owned(), "B000333444".to_owned()];
        let body: serde_json::Value = serde_json::from_str(&client.request_body(&ids)).unwrap();

        assert_eq!(body["ItemIds"], serde_json::json!(["B000111222", "B000333444"]));
        assert_eq!(body["PartnerTag"], "deals-20");
        assert_eq!(body["PartnerType"], "Associates");
        assert_eq!(body["Marketplace"], "www.amazon.com");
        assert_eq!(body["Resources"].as_array().unwrap().len(), RESOURCES.len());
    }
}
