//! HTTP entity fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::defaults::{REQUEST_TIMEOUT_SECS, SERVER_URL, SERVER_URL_ENV};
use crate::entity::name::EntityName;
use crate::error::Result;
use crate::fetch::{EntityFetcher, FetchResponse};

/// Fetches entity JSON from a CIM server over HTTP.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher for the server named by `CIM_SERVER_URL`, or the
    /// local default server.
    pub fn new() -> Self {
        let base_url = std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| SERVER_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Create a fetcher for an explicit server, like `https://cim.example.org`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn entity_url(&self, name: &EntityName) -> String {
        format!("{}{}", self.base_url, name.url_path())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityFetcher for HttpFetcher {
    async fn fetch(&self, name: &EntityName) -> Result<FetchResponse> {
        let url = self.entity_url(name);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
