//! Time-boxed memoization for the expensive coordinator queries.
//!
//! Entries live in a `moka::sync::Cache` with a fixed time-to-live and are
//! keyed by `"<operation>:<serialized params>"`. The whole cache is dropped on
//! every graph update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};

use super::models::{Centralities, KCoreResult, LabelPropagationResult, LouvainResult};

/// Upper bound on live entries; the key space per graph is tiny.
const MAX_ENTRIES: u64 = 1_024;

/// One cached payload per memoized operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResult {
    Centralities(Centralities),
    Louvain(LouvainResult),
    LabelPropagation(LabelPropagationResult),
    KCore(KCoreResult),
}

/// Hit/miss counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct QueryCache {
    /// `None` when the TTL is zero (caching disabled)
    inner: Option<Cache<String, CachedResult>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build()
        });
        Self {
            inner,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Build a key from an operation name and its serializable parameters.
    pub fn key<P: Serialize + ?Sized>(operation: &str, params: &P) -> String {
        let params = serde_json::to_string(params).unwrap_or_default();
        format!("{operation}:{params}")
    }

    pub fn get(&self, key: &str) -> Option<CachedResult> {
        let found = self.inner.as_ref().and_then(|cache| cache.get(key));
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit: {}", key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache miss: {}", key);
        }
        found
    }

    pub fn insert(&self, key: String, value: CachedResult) {
        if let Some(cache) = &self.inner {
            cache.insert(key, value);
        }
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
