//! PVT feed HTTP client.

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::FeedError;
use crate::payload::{resolve_payload, SampleSelection};

/// One raw sample and the endpoint it came from.
#[derive(Debug, Clone)]
pub struct FetchedSample {
    pub endpoint: String,
    pub raw: Value,
}

/// HTTP client that cycles through a fixed list of feed endpoints.
pub struct FeedClient {
    client: Client,
    endpoints: Vec<String>,
    cursor: usize,
    selection: SampleSelection,
}

impl FeedClient {
    /// Create a client polling `endpoints` in order.
    pub fn new(
        endpoints: Vec<String>,
        timeout: Duration,
        selection: SampleSelection,
    ) -> Result<Self, FeedError> {
        if endpoints.is_empty() {
            return Err(FeedError::NoEndpoints);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FeedError::Client)?;
        Ok(Self {
            client,
            endpoints,
            cursor: 0,
            selection,
        })
    }

    /// Create a client for `paths` served under `base_url`.
    pub fn with_base_url(
        base_url: &str,
        paths: &[String],
        timeout: Duration,
        selection: SampleSelection,
    ) -> Result<Self, FeedError> {
        let endpoints = paths.iter().map(|path| join_url(base_url, path)).collect();
        Self::new(endpoints, timeout, selection)
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn selection(&self) -> SampleSelection {
        self.selection
    }

    /// Endpoint the next fetch will hit.
    pub fn peek_endpoint(&self) -> &str {
        &self.endpoints[self.cursor]
    }

    fn advance(&mut self) -> String {
        let endpoint = self.endpoints[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.endpoints.len();
        endpoint
    }

    /// Fetch one sample from the next endpoint in the rotation.
    ///
    /// The rotation moves on whether or not the request succeeds, so a dead
    /// endpoint does not starve the others.
    pub async fn fetch_next(&mut self) -> Result<FetchedSample, FeedError> {
        let endpoint = self.advance();
        let body = self.fetch_json(&endpoint).await?;

        match resolve_payload(body, self.selection) {
            Some(raw) => Ok(FetchedSample { endpoint, raw }),
            None => Err(FeedError::EmptyPayload { endpoint }),
        }
    }

    async fn fetch_json(&self, endpoint: &str) -> Result<Value, FeedError> {
        let transport = |source: reqwest::Error| FeedError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self
            .client
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        tracing::trace!("GET {} -> {}", endpoint, status);
        if !status.is_success() {
            return Err(FeedError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|source| FeedError::NotJson {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
