//! Article fetching.
//!
//! [`fetch_article`] is fail-safe: anything that goes wrong yields an empty
//! string and a debug log line, never an error. [`fetch_page_content`] is
//! the strict variant that reports why a page could not be used.

use crate::content::{extract_article_text, extract_content};
use crate::error::{Result, SearchError};
use crate::types::PageContent;

/// Download `url` and return its main article text, or `""`.
pub async fn fetch_article(client: &reqwest::Client, url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let html = match fetch_html(client, url).await {
        Ok(html) => html,
        Err(err) => {
            tracing::debug!(url, error = %err, "article fetch failed");
            return String::new();
        }
    };

    match extract_article_text(&html) {
        Some(text) => text,
        None => {
            tracing::debug!(url, bytes = html.len(), "no article text extracted");
            String::new()
        }
    }
}

/// Download `url` and extract title, text and word count.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the page cannot be fetched, or
/// [`SearchError::Parse`] if no content can be extracted.
pub async fn fetch_page_content(client: &reqwest::Client, url: &str) -> Result<PageContent> {
    let html = fetch_html(client, url).await?;
    extract_content(&html, url)
}

async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout(format!("fetch of {url} timed out"))
            } else {
                SearchError::Http(format!("fetch failed: {e}"))
            }
        })?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("fetch of {url}: {e}")))?;

    response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("fetch body read failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_returns_empty_without_request() {
        let client = reqwest::Client::new();
        assert_eq!(fetch_article(&client, "").await, "");
    }

    #[tokio::test]
    async fn invalid_url_returns_empty() {
        let client = reqwest::Client::new();
        assert_eq!(fetch_article(&client, "not a url").await, "");
    }

    #[tokio::test]
    async fn strict_variant_reports_invalid_url() {
        let client = reqwest::Client::new();
        let err = fetch_page_content(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
    }
}
