//! End-to-end research run: queries, search, dedup, fetch, scoring.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use scout_search::orchestrator::dedup::PartitionStats;
use scout_search::{deduplicate_with_report, fetch_article, SearchBackend, SearchResultItem};

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::evaluate::{evaluate_article_with_limit, EvaluationRequest};
use crate::llm::TextGenerator;
use crate::prompts::PromptSet;
use crate::queries::generate_queries_for_driver;

/// What to research: the business, the metric, and the drivers behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchContext {
    /// Free-text description of the business.
    pub context: String,
    /// Metric the drivers move.
    pub metric: String,
    /// Driver names; each one is researched and deduplicated separately.
    pub drivers: Vec<String>,
}

impl ResearchContext {
    /// Load a context from a TOML file with `context`, `metric` and `drivers` keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::InvalidContext(e.to_string()))
    }

    /// Trimmed copy with blank drivers removed.
    pub fn cleaned(&self) -> Self {
        Self {
            context: self.context.trim().to_owned(),
            metric: self.metric.trim().to_owned(),
            drivers: self
                .drivers
                .iter()
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns [`ScoutError::InvalidContext`] if the context or metric is
    /// blank or no driver is named.
    pub fn validate(&self) -> Result<()> {
        if self.context.trim().is_empty() {
            return Err(ScoutError::InvalidContext("context is empty".into()));
        }
        if self.metric.trim().is_empty() {
            return Err(ScoutError::InvalidContext("metric is empty".into()));
        }
        if self.drivers.iter().all(|d| d.trim().is_empty()) {
            return Err(ScoutError::InvalidContext("no drivers given".into()));
        }
        Ok(())
    }
}

/// A fetched and scored search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedArticle {
    /// Result title as returned by the search backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Article URL.
    pub url: String,
    /// Publisher name or hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Publication date or age as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// 1-based position in the backend's results for its query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// Relevance score, 1 to 5.
    pub score: u8,
    /// Model summary, or "Evaluation failed".
    pub summary: String,
}

/// Result of processing one deduplicated search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// The article was fetched and scored.
    Evaluated(EvaluatedArticle),
    /// No article text could be obtained.
    Skipped {
        /// Why the article was not scored.
        reason: String,
    },
}

/// Summary and results of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    /// Generated queries per driver.
    pub queries: IndexMap<String, Vec<String>>,
    /// Scored articles, driver then query, in deduplicated result order.
    pub results: IndexMap<String, IndexMap<String, Vec<EvaluatedArticle>>>,
    /// Dedup counters per driver.
    pub dedup: IndexMap<String, PartitionStats>,
    /// Number of drivers researched.
    pub drivers: usize,
    /// Total queries across drivers.
    pub queries_generated: usize,
    /// Results that survived dedup and were sent for fetching.
    pub articles_processed: usize,
    /// Articles that produced text and were scored.
    pub articles_evaluated: usize,
}

struct ArticleTask {
    driver: String,
    query: String,
    item: SearchResultItem,
}

/// Research pipeline over a search backend and a text generator.
pub struct Pipeline<B> {
    backend: B,
    llm: Arc<dyn TextGenerator>,
    prompts: PromptSet,
    config: ScoutConfig,
    fetch_client: reqwest::Client,
}

impl<B: SearchBackend> Pipeline<B> {
    /// Build a pipeline. Validates `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the fetch client cannot
    /// be built.
    pub fn new(
        backend: B,
        llm: Arc<dyn TextGenerator>,
        prompts: PromptSet,
        config: ScoutConfig,
    ) -> Result<Self> {
        config.validate()?;
        let fetch_client = scout_search::http::build_fetch_client(&config.search)?;
        Ok(Self {
            backend,
            llm,
            prompts,
            config,
            fetch_client,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Run every stage for `research` and collect the scored articles.
    ///
    /// Failures inside a stage are contained: a driver whose query
    /// generation fails gets no queries, a failed search yields an empty
    /// bucket, an unreadable article is skipped, and a failed evaluation
    /// is recorded with the fallback score.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::InvalidContext`] for an incomplete context, or
    /// a search error if the search config is rejected.
    pub async fn run(&self, research: &ResearchContext) -> Result<PipelineReport> {
        research.validate()?;
        let research = research.cleaned();
        tracing::info!(drivers = research.drivers.len(), metric = %research.metric, "research run started");

        let queries = self.generate_queries(&research).await;
        let queries_generated = queries.values().map(Vec::len).sum();

        let raw = scout_search::search_drivers(&self.backend, &queries, &self.config.search).await?;
        let deduped = deduplicate_with_report(raw, &self.config.dedup);
        for (driver, stats) in &deduped.stats {
            tracing::info!(
                driver = %driver,
                kept = stats.accepted,
                dropped = stats.dropped(),
                "search results deduplicated"
            );
        }

        let tasks: Vec<ArticleTask> = deduped
            .results
            .into_iter()
            .flat_map(|(driver, buckets)| {
                buckets.into_iter().flat_map(move |(query, items)| {
                    let driver = driver.clone();
                    items.into_iter().map(move |item| ArticleTask {
                        driver: driver.clone(),
                        query: query.clone(),
                        item,
                    })
                })
            })
            .collect();
        let articles_processed = tasks.len();

        let outcomes = self.process_articles(&research, &tasks).await;
        let mut results: IndexMap<String, IndexMap<String, Vec<EvaluatedArticle>>> =
            IndexMap::new();
        let mut articles_evaluated = 0;
        for (task, outcome) in tasks.iter().zip(outcomes) {
            match outcome {
                ArticleOutcome::Evaluated(article) => {
                    articles_evaluated += 1;
                    results
                        .entry(task.driver.clone())
                        .or_default()
                        .entry(task.query.clone())
                        .or_default()
                        .push(article);
                }
                ArticleOutcome::Skipped { reason } => {
                    tracing::debug!(url = task.item.url_str().unwrap_or(""), reason = %reason, "article skipped");
                }
            }
        }

        tracing::info!(
            queries = queries_generated,
            processed = articles_processed,
            evaluated = articles_evaluated,
            "research run finished"
        );

        Ok(PipelineReport {
            drivers: research.drivers.len(),
            queries,
            results,
            dedup: deduped.stats,
            queries_generated,
            articles_processed,
            articles_evaluated,
        })
    }

    async fn generate_queries(&self, research: &ResearchContext) -> IndexMap<String, Vec<String>> {
        let mut by_driver = IndexMap::new();
        for driver in &research.drivers {
            let queries = match generate_queries_for_driver(
                self.llm.as_ref(),
                &self.prompts,
                &research.context,
                &research.metric,
                driver,
            )
            .await
            {
                Ok(queries) => queries,
                Err(e) => {
                    tracing::warn!(driver = %driver, error = %e, "query generation failed");
                    Vec::new()
                }
            };
            by_driver.insert(driver.clone(), queries);
        }
        by_driver
    }

    /// Fetch and score every task with bounded concurrency.
    ///
    /// The returned outcomes are in task order.
    async fn process_articles(
        &self,
        research: &ResearchContext,
        tasks: &[ArticleTask],
    ) -> Vec<ArticleOutcome> {
        let mut indexed: Vec<(usize, ArticleOutcome)> = stream::iter(tasks.iter().enumerate())
            .map(|(idx, task)| async move { (idx, self.process_article(research, task).await) })
            .buffer_unordered(self.config.pipeline.concurrency)
            .collect()
            .await;
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn process_article(&self, research: &ResearchContext, task: &ArticleTask) -> ArticleOutcome {
        let Some(url) = task.item.url_str() else {
            return ArticleOutcome::Skipped {
                reason: "missing URL".into(),
            };
        };

        let text = fetch_article(&self.fetch_client, url).await;
        if text.is_empty() {
            return ArticleOutcome::Skipped {
                reason: "no article text".into(),
            };
        }

        let request = EvaluationRequest {
            context: &research.context,
            metric: &research.metric,
            driver: &task.driver,
            query: &task.query,
            article: &text,
        };
        let evaluation = evaluate_article_with_limit(
            self.llm.as_ref(),
            &self.prompts,
            request,
            self.config.pipeline.max_article_chars,
        )
        .await;

        ArticleOutcome::Evaluated(EvaluatedArticle {
            title: task.item.title.clone(),
            url: url.to_owned(),
            source: task.item.source.clone(),
            published: task.item.published.clone(),
            rank: task.item.rank,
            score: evaluation.score,
            summary: evaluation.summary,
        })
    }
}
