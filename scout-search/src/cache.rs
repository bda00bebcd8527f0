//! Run-scoped cache of per-query search results.
//!
//! Query generation pads short lists by repeating queries, and related
//! drivers often produce identical queries. The executor consults this
//! cache before calling the backend so each distinct query is only paid
//! for once per freshness window. Uses [`moka`] with a TTL and a bounded
//! entry count.

use std::time::Duration;

use moka::future::Cache;

use crate::config::SearchConfig;
use crate::types::SearchResultItem;

/// Maximum number of cached query result lists.
const MAX_CACHE_ENTRIES: u64 = 1_000;

/// Cache key: normalised query text plus the freshness window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    freshness_days: u32,
}

impl CacheKey {
    /// Build a key. The query is trimmed and lowercased.
    pub fn new(query: &str, freshness_days: u32) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            freshness_days,
        }
    }
}

/// Per-query result cache. Disabled when `cache_ttl_seconds` is 0.
#[derive(Clone)]
pub struct SearchCache {
    inner: Option<Cache<CacheKey, Vec<SearchResultItem>>>,
}

impl SearchCache {
    /// Create a cache sized and timed from `config`.
    pub fn new(config: &SearchConfig) -> Self {
        let inner = (config.cache_ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
                .build()
        });
        Self { inner }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// `true` if lookups can hit.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Cached results for `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<SearchResultItem>> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Store results for `key`. No-op when disabled.
    pub async fn insert(&self, key: CacheKey, results: Vec<SearchResultItem>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, results).await;
        }
    }
}
