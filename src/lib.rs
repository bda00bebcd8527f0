//! signal-scout: external signal research for a business metric.
//!
//! Given a business context, a target metric and a list of drivers, a run
//! produces scored news articles per driver:
//! Drivers → Query generation (LLM) → Web search → Dedup → Fetch → Scoring (LLM)
//!
//! # Architecture
//!
//! - **Queries**: two LLM calls per driver build exactly 12 normalised queries
//! - **Search**: every query runs against the configured backend via
//!   [`scout_search`]; results are grouped driver → query
//! - **Dedup**: exact URL and SimHash near-duplicate removal, independently
//!   per driver
//! - **Fetch and score**: surviving articles are fetched and scored 1 to 5
//!   with bounded concurrency
//!
//! Every stage past validation is fail-safe: a failing driver, query,
//! fetch or evaluation degrades its own output instead of aborting the run.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod evaluate;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod queries;

pub use config::{LlmConfig, PipelineSettings, ScoutConfig};
pub use error::{Result, ScoutError};
pub use evaluate::{evaluate_article, Evaluation, EvaluationRequest};
pub use llm::{OpenAiCompatClient, TextGenerator};
pub use pipeline::{ArticleOutcome, EvaluatedArticle, Pipeline, PipelineReport, ResearchContext};
pub use prompts::PromptSet;
pub use queries::{finalize_queries, generate_queries_for_driver, normalize_query};
