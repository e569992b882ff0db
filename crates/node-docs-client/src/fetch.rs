use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ClientError;

/// Transport contract: fetch a URL and hand back its JSON body.
#[async_trait]
pub trait DocumentFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// `reqwest`-backed fetcher used outside of tests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!(target: "node_docs_client", url, "fetching documentation");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;
        if !response.status().is_success() {
            warn!(target: "node_docs_client", status = %response.status(), url, "documentation request failed");
            return Err(ClientError::Status(response.status()).into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;
        let value = serde_json::from_slice::<Value>(&bytes)
            .with_context(|| format!("failed to parse json from {url}"))?;
        Ok(value)
    }
}
