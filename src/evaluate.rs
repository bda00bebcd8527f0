//! LLM relevance scoring of a fetched article.

use serde::{Deserialize, Serialize};

use crate::llm::TextGenerator;
use crate::prompts::PromptSet;

/// Article text beyond this many characters is not sent to the model.
pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 6000;

const MIN_SCORE: u8 = 1;
const MAX_SCORE: u8 = 5;
const FAILED_SUMMARY: &str = "Evaluation failed";

/// Everything the scoring prompt needs for one article.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    /// Business description the article is judged against.
    pub context: &'a str,
    /// Target metric.
    pub metric: &'a str,
    /// Driver the article was found for.
    pub driver: &'a str,
    /// Search query that surfaced the article.
    pub query: &'a str,
    /// Extracted article text, before truncation.
    pub article: &'a str,
}

/// Score (1 to 5) and short summary for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Relevance, always within 1..=5.
    pub score: u8,
    /// Short executive summary from the model.
    pub summary: String,
}

impl Evaluation {
    /// The result used whenever the model call or its reply is unusable.
    pub fn failed() -> Self {
        Self {
            score: MIN_SCORE,
            summary: FAILED_SUMMARY.to_owned(),
        }
    }

    /// Whether this is the fallback produced by [`Evaluation::failed`].
    pub fn is_failed(&self) -> bool {
        self.score == MIN_SCORE && self.summary == FAILED_SUMMARY
    }
}

#[derive(Deserialize)]
struct RawEvaluation {
    score: serde_json::Value,
    #[serde(default)]
    summary: String,
}

/// Score an article with the default text limit.
pub async fn evaluate_article(
    llm: &dyn TextGenerator,
    prompts: &PromptSet,
    request: EvaluationRequest<'_>,
) -> Evaluation {
    evaluate_article_with_limit(llm, prompts, request, DEFAULT_MAX_ARTICLE_CHARS).await
}

/// Score an article, sending at most `max_chars` characters of its text.
///
/// Never fails: a generator error or unparseable reply yields
/// [`Evaluation::failed`].
pub async fn evaluate_article_with_limit(
    llm: &dyn TextGenerator,
    prompts: &PromptSet,
    request: EvaluationRequest<'_>,
    max_chars: usize,
) -> Evaluation {
    let article = truncate_chars(request.article, max_chars);
    let prompt = prompts.render_article_evaluation(
        request.context,
        request.metric,
        request.driver,
        request.query,
        article,
    );

    let reply = match llm.generate(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(driver = request.driver, error = %e, "article evaluation failed");
            return Evaluation::failed();
        }
    };

    parse_evaluation(&reply).unwrap_or_else(|| {
        tracing::warn!(driver = request.driver, "unparseable evaluation reply");
        Evaluation::failed()
    })
}

/// Parse `{"score": .., "summary": ..}`, clamping the score to 1..=5.
///
/// Scores given as numbers or numeric strings are accepted; fractional
/// scores are rounded.
pub fn parse_evaluation(reply: &str) -> Option<Evaluation> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .map_or(trimmed, str::trim);

    let raw: RawEvaluation = serde_json::from_str(body).ok()?;
    let score = match &raw.score {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !score.is_finite() {
        return None;
    }
    let clamped = score.round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8;
    Some(Evaluation {
        score: clamped,
        summary: raw.summary.trim().to_owned(),
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
