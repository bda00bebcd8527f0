//! # scout-search
//!
//! Search execution and cleanup for signal-scout's driver research.
//!
//! ## Design
//!
//! - Runs generated queries against the Brave web search API, grouped by
//!   driver then by query
//! - Removes duplicates per driver: exact URL first, then SimHash
//!   near-duplicates of title + description under a Hamming threshold
//! - Fetches article bodies with layered extraction fallbacks
//! - Fail-safe at the edges: a failed query or fetch yields an empty
//!   result, never an aborted run
//!
//! ## Security
//!
//! - The API key is read from config or `BRAVE_API_KEY` and never logged
//! - Query text is logged only at trace level

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod http;
pub mod orchestrator;
pub mod types;

pub use cache::SearchCache;
pub use config::{DedupConfig, SearchConfig};
pub use engine::SearchBackend;
pub use engines::BraveEngine;
pub use error::{Result, SearchError};
pub use fetch::{fetch_article, fetch_page_content};
pub use orchestrator::dedup::{deduplicate_search_results, deduplicate_with_report, DedupReport};
pub use orchestrator::fingerprint::Fingerprint;
pub use types::{PageContent, SearchResultItem, SearchResults};

use indexmap::IndexMap;

/// Run every driver's queries against `backend` and group the results.
///
/// Validates `config` first. Individual query failures are logged and
/// produce empty buckets.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scout_search::Result<()> {
/// use indexmap::IndexMap;
/// use scout_search::{BraveEngine, DedupConfig, SearchConfig};
///
/// let config = SearchConfig::default();
/// let backend = BraveEngine::new(&config)?;
/// let mut queries = IndexMap::new();
/// queries.insert("capex".to_string(), vec!["hyperscaler data center buildout".to_string()]);
///
/// let raw = scout_search::search_drivers(&backend, &queries, &config).await?;
/// let cleaned = scout_search::deduplicate_search_results(raw, &DedupConfig::default());
/// # let _ = cleaned;
/// # Ok(())
/// # }
/// ```
pub async fn search_drivers<B: SearchBackend>(
    backend: &B,
    queries_by_driver: &IndexMap<String, Vec<String>>,
    config: &SearchConfig,
) -> Result<SearchResults> {
    config.validate()?;
    let cache = SearchCache::new(config);
    Ok(orchestrator::search::run_search(backend, queries_by_driver, config, &cache).await)
}
