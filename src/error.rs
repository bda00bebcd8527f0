//! Error types for the signal-scout pipeline.

use scout_search::SearchError;

/// Top-level error type for a research run.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Missing context, metric or drivers.
    #[error("invalid research context: {0}")]
    InvalidContext(String),

    /// Text-generation provider error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search backend or article fetch error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Pipeline coordination error.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_convert() {
        let err: ScoutError = SearchError::Http("connection refused".into()).into();
        assert_eq!(
            err.to_string(),
            "search error: HTTP request failed: connection refused"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: ScoutError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn display_invalid_context() {
        let err = ScoutError::InvalidContext("no drivers".into());
        assert_eq!(err.to_string(), "invalid research context: no drivers");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoutError>();
    }
}
