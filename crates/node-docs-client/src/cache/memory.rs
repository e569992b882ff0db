use std::sync::Arc;

use dashmap::DashMap;

use super::stats::{CacheStats, CacheStatsSnapshot};
use super::DocumentCache;
use crate::types::DocumentTree;

/// Process-lifetime map from key to value. Entries are never expired or evicted.
#[derive(Debug)]
pub struct MemoryCache<T> {
    entries: DashMap<String, T>,
    stats: CacheStats,
}

impl<T: Clone> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: CacheStats::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let result = self.entries.get(key).map(|entry| entry.value().clone());

        if result.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }

        result
    }

    /// Reads without recording a hit or miss.
    pub fn peek(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Inserts or replaces; the last write for a key wins.
    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), value);
        self.stats.set_entry_count(self.entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl DocumentCache for MemoryCache<Arc<DocumentTree>> {
    fn get(&self, url: &str) -> Option<Arc<DocumentTree>> {
        MemoryCache::get(self, url)
    }

    fn peek(&self, url: &str) -> Option<Arc<DocumentTree>> {
        MemoryCache::peek(self, url)
    }

    fn set(&self, url: String, tree: Arc<DocumentTree>) {
        self.insert(url, tree);
    }

    fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}
