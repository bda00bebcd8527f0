//! Configuration types for a research run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use scout_search::{DedupConfig, SearchConfig};

use crate::error::{Result, ScoutError};

/// Environment variable overriding `search.freshness_days`.
pub const FRESHNESS_DAYS_ENV: &str = "SEARCH_FRESHNESS_DAYS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Search backend, fetch and cache settings.
    pub search: SearchConfig,
    /// Near-duplicate filtering.
    pub dedup: DedupConfig,
    /// Text-generation provider.
    pub llm: LlmConfig,
    /// Fetch/evaluate stage.
    pub pipeline: PipelineSettings,
}

/// OpenAI-compatible chat completions provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            api_key_env: "OPENAI_API_KEY".to_owned(),
            temperature: 0.2,
            timeout_seconds: 60,
        }
    }
}

/// Fetch/evaluate stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Maximum articles fetched and scored at once.
    pub concurrency: usize,
    /// Article text is cut to this many characters before scoring.
    pub max_article_chars: usize,
    /// Optional JSON file with edited prompt instructions.
    pub prompts_file: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            max_article_chars: 6000,
            prompts_file: None,
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/signal-scout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("signal-scout")
            .join("config.toml")
    }

    /// Apply `SEARCH_FRESHNESS_DAYS` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if the variable is set but not a
    /// positive integer.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ScoutConfig::apply_env_overrides`].
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(FRESHNESS_DAYS_ENV) {
            let days: u32 = raw.trim().parse().map_err(|_| {
                ScoutError::Config(format!("{FRESHNESS_DAYS_ENV} must be an integer, got {raw:?}"))
            })?;
            self.search.freshness_days = days;
        }
        Ok(())
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.dedup.validate()?;
        if self.pipeline.concurrency == 0 {
            return Err(ScoutError::Config(
                "pipeline.concurrency must be greater than 0".into(),
            ));
        }
        if self.pipeline.max_article_chars == 0 {
            return Err(ScoutError::Config(
                "pipeline.max_article_chars must be greater than 0".into(),
            ));
        }
        if self.llm.base_url.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(ScoutError::Config(
                "llm.base_url and llm.model must be set".into(),
            ));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ScoutError::Config(
                "llm.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
