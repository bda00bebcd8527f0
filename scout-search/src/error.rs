//! Error types for the scout-search crate.
//!
//! Payloads are plain strings so errors stay `Clone`-free and cheap to log.
//! API keys are never formatted into a message.

/// Failure while searching or fetching an article.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search API or article host did not answer in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Transport failure or non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Unexpected search API JSON or unreadable page HTML.
    #[error("unparseable response: {0}")]
    Parse(String),

    /// Rejected `SearchConfig` or `DedupConfig` value.
    #[error("invalid search config: {0}")]
    Config(String),
}

/// Result alias used throughout scout-search.
pub type Result<T> = std::result::Result<T, SearchError>;
