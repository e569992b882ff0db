pub mod cache;
pub mod fetch;
pub mod types;

pub use cache::{CacheStatsSnapshot, DocumentCache, MemoryCache};
pub use fetch::{DocumentFetcher, HttpFetcher};
pub use types::{DocNode, DocumentTree, NodeKind};

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use dashmap::DashMap;
use reqwest::StatusCode;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

pub const DEFAULT_API_BASE: &str = "https://nodejs.org";
pub const DEFAULT_VERSION: &str = "latest-v18.x";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("unexpected status code: {0}")]
    Status(StatusCode),
    #[error("invalid documentation payload: {0}")]
    InvalidDocument(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host that serve `/dist/...` and `/docs/...`, without a trailing slash.
    pub api_base: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: "NodeDocsLookup/1.0".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches `all.json` per documentation version and keeps every decoded tree
/// for the lifetime of the client. Misses for the same URL wait on one fetch;
/// different URLs fetch independently.
#[derive(Debug)]
pub struct NodeDocsClient {
    fetcher: Arc<dyn DocumentFetcher>,
    cache: Arc<dyn DocumentCache>,
    fetch_locks: DashMap<String, Arc<Mutex<()>>>,
    config: ClientConfig,
}

impl NodeDocsClient {
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout)?;
        Ok(Self::from_parts(
            config,
            Arc::new(fetcher),
            Arc::new(MemoryCache::<Arc<DocumentTree>>::new()),
        ))
    }

    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Builds a client around an explicit transport and cache.
    pub fn from_parts(
        config: ClientConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        cache: Arc<dyn DocumentCache>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            fetch_locks: DashMap::new(),
            config,
        }
    }

    pub fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    pub fn document_url(&self, version: &str) -> String {
        format!("{}/dist/{version}/docs/api/all.json", self.api_base())
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    #[instrument(name = "node_docs_client.get_tree", skip(self))]
    pub async fn get_tree(&self, version: &str) -> Result<Arc<DocumentTree>> {
        let url = self.document_url(version);
        if let Some(tree) = self.cache.get(&url) {
            debug!(target: "node_docs_client", url, "documentation served from memory cache");
            return Ok(tree);
        }

        let lock = self.fetch_locks.entry(url.clone()).or_default().clone();
        let _guard = lock.lock().await;
        if let Some(tree) = self.cache.peek(&url) {
            debug!(target: "node_docs_client", url, "documentation served from memory cache after lock");
            return Ok(tree);
        }

        let value = self
            .fetcher
            .fetch_json(&url)
            .await
            .with_context(|| format!("failed to fetch documentation for {version}"))?;
        let tree = Arc::new(
            DocumentTree::from_value(&value)
                .with_context(|| format!("failed to decode documentation from {url}"))?,
        );

        info!(
            target: "node_docs_client",
            url,
            nodes = tree.node_count(),
            "documentation cached"
        );
        self.cache.set(url, tree.clone());
        Ok(tree)
    }
}
