//! Authenticated HTTP client for the ledger provider API.
//!
//! # Responsibilities
//! - Attach credentials to every request (bearer key, secret, project id)
//! - Stamp every request with a fresh timestamp and random nonce
//! - Surface non-2xx responses with their body instead of swallowing them
//! - Enforce the upstream timeout on each call

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::chain::types::{ChainError, ChainResult, Network};
use crate::config::Credentials;

pub const X_API_SECRET: &str = "x-api-secret";
pub const X_PROJECT_ID: &str = "x-project-id";
pub const X_TIMESTAMP: &str = "x-timestamp";
pub const X_NONCE: &str = "x-nonce";

/// Per-request freshness metadata. Advisory only; nothing verifies it locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFingerprint {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// 16 random bytes, hex-encoded.
    pub nonce: String,
}

impl RequestFingerprint {
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            nonce: hex::encode(bytes),
        }
    }
}

/// Provider API client bound to one network and one credential bundle.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    network: Network,
}

impl ApiClient {
    /// Create a client for the network's public API.
    pub fn new(network: Network, credentials: &Credentials, timeout: Duration) -> ChainResult<Self> {
        let base_url = Url::parse(network.base_url())
            .map_err(|e| ChainError::Config(format!("invalid base URL: {}", e)))?;
        Self::with_base_url(base_url, network, credentials, timeout)
    }

    /// Create a client against an explicit base URL (gateways, local mocks).
    pub fn with_base_url(
        base_url: Url,
        network: Network,
        credentials: &Credentials,
        timeout: Duration,
    ) -> ChainResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ChainError::Config(format!("'{}' cannot be used as a base URL", base_url)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            sensitive_header(&format!("Bearer {}", credentials.api_key()))?,
        );
        headers.insert(X_API_SECRET, sensitive_header(credentials.api_secret())?);
        headers.insert(
            X_PROJECT_ID,
            HeaderValue::from_str(credentials.project_id())
                .map_err(|_| ChainError::Config("project id is not a valid header value".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        tracing::info!(
            network = %network,
            base_url = %base_url,
            project_id = credentials.project_id(),
            "Ledger API client initialized"
        );

        Ok(Self {
            http,
            base_url,
            network,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded.
    pub fn url(&self, segments: &[&str]) -> ChainResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ChainError::Config(format!("'{}' cannot be a base", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// GET an endpoint and decode its JSON body.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ChainResult<T> {
        let url = self.url(segments)?;
        self.execute(self.request(Method::GET, url)).await
    }

    /// GET an endpoint with query parameters.
    pub async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> ChainResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        self.execute(self.request(Method::GET, url).query(query)).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<B, T>(&self, segments: &[&str], body: &B) -> ChainResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        self.execute(self.request(Method::POST, url).json(body)).await
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let fingerprint = RequestFingerprint::generate();
        self.http
            .request(method, url)
            .header(X_TIMESTAMP, fingerprint.timestamp_ms.to_string())
            .header(X_NONCE, fingerprint.nonce)
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ChainResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "Ledger API error");
            return Err(ChainError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ChainError::Decode(e.to_string()))
    }
}

fn sensitive_header(value: &str) -> ChainResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| ChainError::Config("credential is not a valid header value".into()))?;
    header.set_sensitive(true);
    Ok(header)
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("network", &self.network)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("key", "secret", "project").unwrap()
    }

    #[test]
    fn test_fingerprint_shape() {
        let a = RequestFingerprint::generate();
        let b = RequestFingerprint::generate();
        assert_eq!(a.nonce.len(), 32);
        assert!(a.nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.nonce, b.nonce);
        assert!(a.timestamp_ms > 1_600_000_000_000);
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = ApiClient::new(Network::Testnet, &credentials(), Duration::from_secs(5)).unwrap();
        let url = client.url(&["api", "v1", "wallet", "a b/c", "balance"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://service-testnet.maschain.com/api/v1/wallet/a%20b%2Fc/balance"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let base = Url::parse("http://localhost:9000/proxy/").unwrap();
        let client =
            ApiClient::with_base_url(base, Network::Testnet, &credentials(), Duration::from_secs(5)).unwrap();
        let url = client.url(&["api", "v1", "health"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/proxy/api/v1/health");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        let result = ApiClient::with_base_url(base, Network::Testnet, &credentials(), Duration::from_secs(5));
        assert!(matches!(result, Err(ChainError::Config(_))));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let client = ApiClient::new(Network::Mainnet, &credentials(), Duration::from_secs(5)).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("service.maschain.com"));
        assert!(!debug.contains("secret"));
    }
}
