//! HTTP client for the Netbox REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{NetboxError, Result};
use crate::query::Query;
use crate::traits::InventoryApi;
use crate::types::Page;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a single Netbox instance
#[derive(Debug, Clone)]
pub struct NetboxClient {
    client: Client,
    base_url: Url,
}

impl NetboxClient {
    /// Create a client authenticating with an API token
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid, the token cannot be sent
    /// as a header, or the TLS backend fails to initialize.
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use sshgen_netbox::NetboxClient;
    ///
    /// let client = NetboxClient::new("https://netbox.example.com", "0123abcd", Duration::from_secs(30))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, token: &str, timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Token {token}"))
            .map_err(|e| NetboxError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom `reqwest::Client`
    ///
    /// The caller is responsible for authentication headers.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Keep a sub-path install (https://host/netbox) when joining endpoints
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL from a path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(NetboxError::Url)
    }

    /// Build the URL of one result page
    fn page_url(&self, query: &Query, limit: u64, offset: u64) -> Result<Url> {
        let mut url = self.url(query.class().endpoint())?;
        {
            let mut pairs = url.query_pairs_mut();
            for (field, value) in query.pairs() {
                pairs.append_pair(field, value);
            }
            pairs.append_pair("limit", &limit.to_string());
            pairs.append_pair("offset", &offset.to_string());
        }
        Ok(url)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(NetboxError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InventoryApi for NetboxClient {
    async fn fetch_page(&self, query: &Query, limit: u64, offset: u64) -> Result<Page<Value>> {
        let url = self.page_url(query, limit, offset)?;
        self.get(url).await
    }
}
