//! Prompt text: user-editable instruction blocks plus fixed output contracts.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScoutError};

const DEFAULT_PROMPT_BUILDER_INSTRUCTIONS: &str = "\
You are an expert AI Search Strategist.

Your job is to design high-quality search queries that detect
EXTERNAL ecosystem signals only.

Focus on:
- Capital expenditure activity
- Infrastructure buildouts
- Procurement signals
- Capacity expansion
- Technology transitions
- Enterprise, hyperscaler, colocation, telecom, or semiconductor activity

Do NOT:
- Mention the company being researched internally
- Use placeholders
- Use generic phrases
- Use dates or time references";

const DEFAULT_ARTICLE_EVALUATION_INSTRUCTIONS: &str = "\
You are an expert equity research analyst.

Evaluate articles strictly as EXTERNAL SIGNALS.

Score relevance based on:
- Strength of signal
- Direct linkage to the driver
- Impact on the target metric

Do not speculate.
Do not invent facts.";

/// Asks the model to write a driver-specific query-generation prompt.
pub const PROMPT_BUILDER_TEMPLATE: &str = "\
{dynamic_instructions}

Business context:
{context}

Target metric:
{metric}

Driver:
{driver}

Write a prompt that instructs a search strategist to produce 12 distinct web
search queries surfacing recent external signals for this driver and its
effect on the target metric. Return only the prompt text.";

/// Wraps the generated prompt so the reply is strict JSON.
pub const QUERY_GENERATION_WRAPPER: &str = "\
{generated_prompt}

Return STRICT JSON only, with no commentary and no markdown fences, exactly
matching this schema:
{
  \"queries\": [\"<query 1>\", \"<query 2>\", \"<query 3>\", \"<query 4>\",
              \"<query 5>\", \"<query 6>\", \"<query 7>\", \"<query 8>\",
              \"<query 9>\", \"<query 10>\", \"<query 11>\", \"<query 12>\"]
}";

/// Scores a single article against the driver and metric.
pub const ARTICLE_EVALUATION_TEMPLATE: &str = "\
{dynamic_instructions}

Business context:
{context}

Target metric:
{metric}

Driver:
{driver}

Search query:
{query}

Article:
{article}

Return STRICT JSON only, with no commentary and no markdown fences:
{
  \"score\": <integer 1-5>,
  \"summary\": \"<short executive summary>\"
}";

/// The two instruction blocks a user may edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    /// Prepended to the prompt-builder template.
    pub prompt_builder_instructions: String,
    /// Prepended to the article-evaluation template.
    pub article_evaluation_instructions: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            prompt_builder_instructions: DEFAULT_PROMPT_BUILDER_INSTRUCTIONS.to_owned(),
            article_evaluation_instructions: DEFAULT_ARTICLE_EVALUATION_INSTRUCTIONS.to_owned(),
        }
    }
}

impl PromptSet {
    /// Load a prompt set from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ScoutError::Config(format!("invalid prompts file {}: {e}", path.display())))
    }

    /// Write the prompt set as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// First LLM call of query generation.
    pub fn render_prompt_builder(&self, context: &str, metric: &str, driver: &str) -> String {
        render(
            PROMPT_BUILDER_TEMPLATE,
            &[
                ("dynamic_instructions", &self.prompt_builder_instructions),
                ("context", context),
                ("metric", metric),
                ("driver", driver),
            ],
        )
    }

    /// Second LLM call of query generation.
    pub fn render_query_generation(&self, generated_prompt: &str) -> String {
        render(
            QUERY_GENERATION_WRAPPER,
            &[("generated_prompt", generated_prompt)],
        )
    }

    /// Article scoring prompt.
    pub fn render_article_evaluation(
        &self,
        context: &str,
        metric: &str,
        driver: &str,
        query: &str,
        article: &str,
    ) -> String {
        render(
            ARTICLE_EVALUATION_TEMPLATE,
            &[
                ("dynamic_instructions", &self.article_evaluation_instructions),
                ("context", context),
                ("metric", metric),
                ("driver", driver),
                ("query", query),
                ("article", article),
            ],
        )
    }
}

/// Substitute `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user text containing braces
/// (or another placeholder name) passes through untouched. Unknown `{...}`
/// sequences, such as the JSON schema in the templates, are kept verbatim.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
