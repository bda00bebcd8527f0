//! Trait definition for pluggable search backends.
//!
//! The executor only needs "query in, ordered results out". The Brave API
//! client implements [`SearchBackend`]; tests substitute canned backends.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::SearchResultItem;

/// A web search backend.
///
/// Implementations handle URL construction, authentication, the HTTP call
/// and response parsing. Results are returned in the backend's relevance
/// order with `rank` populated where known.
///
/// All implementations must be `Send + Sync` so the executor can be shared
/// across tasks.
pub trait SearchBackend: Send + Sync {
    /// Run one query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, times out, or the
    /// response cannot be parsed.
    fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResultItem>, SearchError>> + Send;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
