//! Core types for search results and extracted pages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Search results grouped by partition (driver), then by originating query.
///
/// Insertion order is significant: dedup keeps the first-seen item, so the
/// iteration order of this map decides which duplicate survives.
pub type SearchResults = IndexMap<String, IndexMap<String, Vec<SearchResultItem>>>;

/// A single web result returned by a search backend.
///
/// Every field is optional because upstream APIs omit them freely. Only
/// `url`, `title` and `description` take part in deduplication; the rest is
/// passthrough metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page URL. Items without one are never accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Snippet describing the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publisher or site name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Publication date or age string as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// 1-based position in the backend's result list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// Query that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Driver the query was generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Freshness window (days) the search was restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_window_days: Option<u32>,
}

impl SearchResultItem {
    /// Build an item from the three fields dedup looks at.
    pub fn new(url: &str, title: &str, description: &str) -> Self {
        Self {
            url: Some(url.to_owned()),
            title: Some(title.to_owned()),
            description: Some(description.to_owned()),
            ..Default::default()
        }
    }

    /// The URL if present and non-empty.
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Title, or `""` when absent.
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Description, or `""` when absent.
    pub fn description_str(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Extracted readable content from a fetched web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// The page title extracted from HTML.
    pub title: String,
    /// Cleaned, readable text content with HTML boilerplate stripped.
    pub text: String,
    /// Number of words in the extracted text.
    pub word_count: usize,
}
