//! Search and dedup configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the search backend, timeouts, freshness window
//! and caching. [`DedupConfig`] controls near-duplicate filtering.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Default Brave web search endpoint.
pub const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Environment variable consulted when no API key is configured.
pub const BRAVE_API_KEY_ENV: &str = "BRAVE_API_KEY";

/// Default Hamming-distance threshold for near-duplicate detection.
pub const DEFAULT_SIMHASH_THRESHOLD: u32 = 5;

/// Configuration for search execution and article fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Brave subscription token. Falls back to `BRAVE_API_KEY` when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Search API endpoint.
    pub endpoint: String,
    /// Results requested per query.
    pub results_per_query: u32,
    /// Search language code.
    pub search_lang: String,
    /// Only return results published within this many days.
    pub freshness_days: u32,
    /// Search request timeout in seconds.
    pub timeout_seconds: u64,
    /// Article fetch timeout in seconds.
    pub fetch_timeout_seconds: u64,
    /// Queries of one driver sent to the backend at the same time.
    pub max_concurrent_queries: usize,
    /// How long to cache per-query results in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Fixed User-Agent for both clients; `None` picks a browser string at random.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: BRAVE_ENDPOINT.to_owned(),
            results_per_query: 10,
            search_lang: "en".to_owned(),
            freshness_days: 4,
            timeout_seconds: 20,
            fetch_timeout_seconds: 12,
            max_concurrent_queries: 2,
            cache_ttl_seconds: 600,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if a count, timeout, the query
    /// concurrency or the freshness window is zero, or the endpoint is blank.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.results_per_query == 0 {
            return Err(SearchError::Config(
                "results_per_query must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_queries == 0 {
            return Err(SearchError::Config(
                "max_concurrent_queries must be greater than 0".into(),
            ));
        }
        if self.freshness_days == 0 {
            return Err(SearchError::Config(
                "freshness_days must be greater than 0".into(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(SearchError::Config("endpoint must not be empty".into()));
        }
        Ok(())
    }

    /// Resolve the API key from config, then from `BRAVE_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if neither source yields a non-empty key.
    pub fn resolve_api_key(&self) -> Result<String, SearchError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_owned());
        }
        match std::env::var(BRAVE_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SearchError::Config(format!(
                "no API key configured and {BRAVE_API_KEY_ENV} is not set"
            ))),
        }
    }
}

/// Configuration for per-driver deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Maximum Hamming distance at which two fingerprints count as
    /// near-duplicates. Larger values suppress more aggressively.
    pub simhash_threshold: u32,
    /// Compare URLs after normalisation (case, default ports, tracking
    /// parameters, fragments) instead of byte-for-byte.
    pub normalize_urls: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            simhash_threshold: DEFAULT_SIMHASH_THRESHOLD,
            normalize_urls: false,
        }
    }
}

impl DedupConfig {
    /// Build a config with the given threshold and raw URL matching.
    pub fn with_threshold(simhash_threshold: u32) -> Self {
        Self {
            simhash_threshold,
            ..Default::default()
        }
    }

    /// Validates this configuration.
    ///
    /// A threshold above the fingerprint width would mark every pair as a
    /// near-duplicate.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.simhash_threshold > 64 {
            return Err(SearchError::Config(
                "simhash_threshold must be <= 64".into(),
            ));
        }
        Ok(())
    }
}
