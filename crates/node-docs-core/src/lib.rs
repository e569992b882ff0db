use std::{sync::Arc, time::Duration};

use anyhow::Result;
use node_docs_client::{ClientConfig, NodeDocsClient, DEFAULT_API_BASE, DEFAULT_VERSION};
use serde::Deserialize;
use tracing::info;

pub mod format;
pub mod html;
pub mod markdown;
pub mod reply;
pub mod search;
pub mod service;

pub use node_docs_client;
pub use reply::{Reply, ReplyStatus};
pub use service::{DocLookupService, LookupRequest};

/// Settings for a lookup service. Every field has a default, so partial
/// configuration sources deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Host serving both `all.json` and the HTML pages.
    pub api_base: String,
    pub default_version: String,
    /// Custom emoji shown in the header as `<:node:{id}>`.
    pub emoji_id: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            default_version: DEFAULT_VERSION.to_string(),
            emoji_id: None,
            user_agent: client.user_agent,
            request_timeout_secs: client.request_timeout.as_secs(),
        }
    }
}

impl LookupConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base: self.api_base.clone(),
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Builds the HTTP-backed lookup service.
pub fn bootstrap(config: LookupConfig) -> Result<DocLookupService> {
    let client = NodeDocsClient::with_config(config.client_config())?;

    info!(
        target: "node_docs_core",
        api_base = %config.api_base,
        default_version = %config.default_version,
        "documentation lookup service ready"
    );

    Ok(DocLookupService::new(Arc::new(client), config))
}
