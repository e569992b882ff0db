use std::sync::Arc;

use crate::types::DocumentTree;

pub mod memory;
pub mod stats;

pub use memory::MemoryCache;
pub use stats::{CacheStats, CacheStatsSnapshot};

/// Storage for decoded documentation trees, keyed by the URL they were fetched from.
pub trait DocumentCache: Send + Sync + std::fmt::Debug {
    fn get(&self, url: &str) -> Option<Arc<DocumentTree>>;
    /// Like [`DocumentCache::get`] but leaves hit/miss counters untouched.
    fn peek(&self, url: &str) -> Option<Arc<DocumentTree>>;
    fn set(&self, url: String, tree: Arc<DocumentTree>);
    fn stats(&self) -> CacheStatsSnapshot;
}
