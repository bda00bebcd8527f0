//! HTML article extraction with layered fallbacks.
//!
//! 1. Main content region (`article`, `main`, `[role="main"]`) with
//!    boilerplate subtrees skipped; kept if it has more than
//!    [`MIN_ARTICLE_CHARS`] characters.
//! 2. Every `<p>` longer than [`MIN_PARAGRAPH_CHARS`], joined by newlines;
//!    kept under the same length rule.
//! 3. Nothing.
//!
//! Pages shorter than [`MIN_ARTICLE_CHARS`] are rejected before parsing.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, SearchError};
use crate::types::PageContent;

/// Default maximum characters kept in [`PageContent::text`].
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Extracted text (and raw HTML) must exceed this many characters.
pub const MIN_ARTICLE_CHARS: usize = 200;

/// Paragraphs at or below this many characters are ignored by the fallback.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

/// Elements whose subtrees never contribute text.
const BOILERPLATE: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "form",
];

/// Elements that end a line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "h1", "h2", "h3", "h4", "h5", "h6", "section", "blockquote", "tr",
];

/// Region selectors tried in order by the first extraction attempt.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]"];

/// Extract the main article text from a page, or `None` if every attempt
/// comes up short.
pub fn extract_article_text(html: &str) -> Option<String> {
    if char_len(html.trim()) < MIN_ARTICLE_CHARS {
        return None;
    }
    let document = Html::parse_document(html);

    if let Some(text) = main_region_text(&document) {
        return Some(text);
    }
    paragraph_text(&document)
}

/// Extract readable content with metadata.
///
/// Uses [`extract_article_text`], falling back to the whole `<body>` for
/// short pages.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    extract_content_with_limit(html, url, DEFAULT_MAX_CHARS)
}

/// Same as [`extract_content`] with a custom character limit.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content_with_limit(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let text = extract_article_text(html)
        .or_else(|| select_first(&document, "body").map(element_text))
        .unwrap_or_default();
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    let text = truncate_to_limit(&text, max_chars);
    let word_count = text.split_whitespace().count();

    Ok(PageContent {
        url: url.to_owned(),
        title,
        text,
        word_count,
    })
}

fn main_region_text(document: &Html) -> Option<String> {
    CONTENT_SELECTORS
        .iter()
        .filter_map(|s| select_first(document, s))
        .map(element_text)
        .find(|text| char_len(text) > MIN_ARTICLE_CHARS)
}

fn paragraph_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    let combined = document
        .select(&selector)
        .map(element_text)
        .filter(|text| char_len(text) > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join("\n");
    (char_len(&combined) > MIN_ARTICLE_CHARS).then_some(combined)
}

fn extract_title(document: &Html) -> String {
    select_first(document, "title")
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .unwrap_or_default()
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Visible text under `element`, boilerplate skipped, whitespace tidied.
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalise_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if BOILERPLATE.contains(&name) {
                continue;
            }
            collect_text(el, out);
            if BLOCK_ELEMENTS.contains(&name) {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
    }
}

/// Collapse runs of spaces, trim each line, and drop empty lines.
fn normalise_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_to_limit(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some((end, _)) => {
            let mut truncated = text[..end].to_owned();
            truncated.push_str("\n\n[Content truncated]");
            truncated
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
