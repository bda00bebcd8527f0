//! Brave Search web API backend.
//!
//! Uses the JSON endpoint (`/res/v1/web/search`) with a subscription token.
//! Results are restricted to a freshness window ending today (UTC).

use chrono::{Days, NaiveDate, Utc};
use scraper::Html;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::engine::SearchBackend;
use crate::error::SearchError;
use crate::http;
use crate::types::SearchResultItem;

/// Brave web search API client.
pub struct BraveEngine {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl BraveEngine {
    /// Build a client from config, resolving the key from config or
    /// `BRAVE_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if no API key is available, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let api_key = config.resolve_api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit key.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn with_api_key(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_search_client(config)?,
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
        })
    }
}

impl SearchBackend for BraveEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        tracing::trace!(query, "Brave search");

        let freshness = freshness_window(Utc::now().date_naive(), config.freshness_days);
        let count = config.results_per_query.to_string();
        let params = [
            ("q", query),
            ("count", count.as_str()),
            ("search_lang", config.search_lang.as_str()),
            ("spellcheck", "1"),
            ("freshness", freshness.as_str()),
        ];

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(format!("Brave request exceeded {}s", config.timeout_seconds))
                } else {
                    SearchError::Http(format!("Brave request failed: {e}"))
                }
            })?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("brave request: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Brave response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "Brave response received");

        parse_brave_response(&body)
    }

    fn name(&self) -> &'static str {
        "Brave"
    }
}

/// Freshness parameter covering the `days` days up to and including `today`.
///
/// Formatted as `YYYY-MM-DDtoYYYY-MM-DD`.
pub fn freshness_window(today: NaiveDate, days: u32) -> String {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    format!("{start}to{today}")
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    source: Option<String>,
    published: Option<String>,
    page_age: Option<String>,
    age: Option<String>,
    profile: Option<BraveProfile>,
    meta_url: Option<BraveMetaUrl>,
}

#[derive(Debug, Deserialize)]
struct BraveProfile {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveMetaUrl {
    hostname: Option<String>,
}

/// Parse a Brave web search JSON body into ranked results.
///
/// A response without a `web` section yields no results.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not valid JSON of the
/// expected shape.
pub fn parse_brave_response(body: &str) -> Result<Vec<SearchResultItem>, SearchError> {
    let response: BraveResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Brave response: {e}")))?;

    let results = response.web.map(|w| w.results).unwrap_or_default();
    Ok(results
        .into_iter()
        .zip(1u32..)
        .map(|(r, rank)| SearchResultItem {
            title: r.title.map(|t| strip_inline_tags(&t)),
            url: r.url,
            description: r.description.map(|d| strip_inline_tags(&d)),
            source: r
                .source
                .or_else(|| r.profile.and_then(|p| p.name))
                .or_else(|| r.meta_url.and_then(|m| m.hostname)),
            published: r.published.or(r.page_age).or(r.age),
            rank: Some(rank),
            ..Default::default()
        })
        .collect())
}

/// Snippet text with `<strong>` highlighting removed and entities decoded.
///
/// A stray `<` that does not open a tag is kept as text.
fn strip_inline_tags(text: &str) -> String {
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect()
}
