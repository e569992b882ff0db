use std::sync::Arc;

use anyhow::Result;
use node_docs_client::NodeDocsClient;
use tracing::{debug, error, instrument};

use crate::format::EntrySummary;
use crate::markdown::inline_code;
use crate::reply::Reply;
use crate::search::search;
use crate::LookupConfig;

pub const GENERIC_FAILURE: &str = "Something went wrong.";

/// Inbound lookup: a free-text query plus optional version, target user, and visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    pub query: String,
    pub version: Option<String>,
    pub target: Option<String>,
    pub ephemeral: Option<bool>,
}

impl LookupRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = Some(ephemeral);
        self
    }
}

pub fn not_found_message(query: &str) -> String {
    format!("No result found for query {}.", inline_code(query))
}

#[derive(Debug, Clone)]
pub struct DocLookupService {
    client: Arc<NodeDocsClient>,
    config: LookupConfig,
}

impl DocLookupService {
    pub fn new(client: Arc<NodeDocsClient>, config: LookupConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> Arc<NodeDocsClient> {
        self.client.clone()
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Always produces a reply; failures are logged and reported generically.
    #[instrument(name = "doc_lookup.lookup", skip_all, fields(query = %request.query, version = ?request.version))]
    pub async fn lookup(&self, request: &LookupRequest) -> Reply {
        match self.try_lookup(request).await {
            Ok(reply) => reply,
            Err(error) => {
                error!(
                    target: "node_docs_core",
                    error = ?error,
                    query = %request.query,
                    "documentation lookup failed"
                );
                Reply::error(GENERIC_FAILURE)
            }
        }
    }

    async fn try_lookup(&self, request: &LookupRequest) -> Result<Reply> {
        let query = request.query.trim();
        let version = request
            .version
            .as_deref()
            .map(str::trim)
            .filter(|version| !version.is_empty())
            .unwrap_or(&self.config.default_version);

        let tree = self.client.get_tree(version).await?;
        let Some(hit) = search(&tree, query) else {
            debug!(target: "node_docs_core", query, version, "no documentation entry matched");
            return Ok(Reply::error(not_found_message(query)));
        };

        debug!(
            target: "node_docs_core",
            query,
            version,
            kind = hit.kind.as_str(),
            module = ?hit.module,
            "documentation entry matched"
        );

        let summary = EntrySummary::build(&hit, self.client.api_base(), version);
        let content = summary.render(self.config.emoji_id.as_deref(), request.target.as_deref());
        let mentions = request.target.iter().cloned().collect();
        Ok(Reply::success(
            content,
            request.ephemeral.unwrap_or(false),
            mentions,
        ))
    }
}
