//! Search query generation for one driver.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::Result;
use crate::llm::TextGenerator;
use crate::prompts::PromptSet;

/// Number of queries produced per driver.
pub const QUERIES_PER_DRIVER: usize = 12;

const MIN_QUERY_WORDS: usize = 10;
const MAX_QUERY_WORDS: usize = 15;
const QUERY_TAIL: &str = "across large scale data center infrastructure deployments";

#[derive(Deserialize)]
struct QueryList {
    #[serde(default)]
    queries: Vec<serde_json::Value>,
}

/// Ask the model for a driver-specific prompt, then for the queries themselves.
///
/// The reply is always cleaned by [`finalize_queries`] and each query is
/// shaped by [`normalize_query`], so a successful call yields exactly
/// [`QUERIES_PER_DRIVER`] queries.
///
/// # Errors
///
/// Returns the generator's error if either LLM call fails.
pub async fn generate_queries_for_driver(
    llm: &dyn TextGenerator,
    prompts: &PromptSet,
    context: &str,
    metric: &str,
    driver: &str,
) -> Result<Vec<String>> {
    let builder_prompt = prompts.render_prompt_builder(context, metric, driver);
    let generated_prompt = llm.generate(&builder_prompt).await?;

    let final_prompt = prompts.render_query_generation(&generated_prompt);
    let raw = llm.generate(&final_prompt).await?;

    let queries: Vec<String> = finalize_queries(&raw)
        .iter()
        .map(|q| normalize_query(q))
        .collect();
    tracing::debug!(driver, count = queries.len(), "queries generated");
    for query in &queries {
        tracing::trace!(driver, query = %query, "query");
    }
    Ok(queries)
}

/// Turn a raw model reply into exactly [`QUERIES_PER_DRIVER`] queries. Never fails.
///
/// Reads the `queries` array of a JSON object, trims each string, and drops
/// empties, non-strings, and exact repeats. Extra queries are cut; a short
/// list is padded by cycling through it from the start. With nothing usable,
/// numbered placeholder queries are returned.
pub fn finalize_queries(raw: &str) -> Vec<String> {
    let parsed = serde_json::from_str::<QueryList>(strip_code_fence(raw))
        .map(|list| list.queries)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut queries: Vec<String> = parsed
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty() && seen.insert(*q))
        .map(str::to_owned)
        .collect();

    if queries.is_empty() {
        return (1..=QUERIES_PER_DRIVER)
            .map(|n| format!("external ecosystem signal query {n}"))
            .collect();
    }

    queries.truncate(QUERIES_PER_DRIVER);
    let distinct = queries.len();
    for i in distinct..QUERIES_PER_DRIVER {
        let repeat = queries[i % distinct].clone();
        queries.push(repeat);
    }
    queries
}

/// Pad a query to at least 10 words from a fixed tail and cap it at 15.
pub fn normalize_query(query: &str) -> String {
    let mut words: Vec<&str> = query.split_whitespace().collect();
    if words.len() < MIN_QUERY_WORDS {
        let missing = MIN_QUERY_WORDS - words.len();
        words.extend(QUERY_TAIL.split_whitespace().take(missing));
    }
    words.truncate(MAX_QUERY_WORDS);
    words.join(" ")
}

/// Models sometimes wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
