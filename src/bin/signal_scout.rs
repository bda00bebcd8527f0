//! CLI binary for signal-scout.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scout_search::{deduplicate_with_report, BraveEngine, SearchResults};
use signal_scout::{OpenAiCompatClient, Pipeline, PromptSet, ResearchContext, ScoutConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// signal-scout: research external signals behind a business metric.
#[derive(Parser)]
#[command(name = "signal-scout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = "SIGNAL_SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Generate queries, search, deduplicate, fetch and score articles.
    Run {
        /// TOML file with `context`, `metric` and `drivers`.
        #[arg(long)]
        context_file: PathBuf,

        /// Write the JSON report here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Deduplicate an existing search results JSON file.
    Dedup {
        /// JSON object: driver -> query -> list of results.
        #[arg(short, long)]
        input: PathBuf,

        /// Override the configured SimHash threshold.
        #[arg(long)]
        threshold: Option<u32>,

        /// Write cleaned JSON here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the active prompt instructions to a JSON file for editing.
    Prompts {
        /// Destination file.
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("signal_scout=info,scout_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            context_file,
            output,
        } => run_pipeline(config, &context_file, output.as_deref()).await,
        Command::Dedup {
            input,
            threshold,
            output,
        } => run_dedup(config, &input, threshold, output.as_deref()),
        Command::Prompts { output } => {
            load_prompts(&config)?.save_to_file(&output)?;
            info!(path = %output.display(), "prompts written");
            Ok(())
        }
    }
}

/// Explicit path, else the default path if it exists, else defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<ScoutConfig> {
    let mut config = match path {
        Some(path) => ScoutConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            let default = ScoutConfig::default_config_path();
            if default.exists() {
                ScoutConfig::from_file(&default)
                    .with_context(|| format!("loading config from {}", default.display()))?
            } else {
                ScoutConfig::default()
            }
        }
    };
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn load_prompts(config: &ScoutConfig) -> anyhow::Result<PromptSet> {
    match config.pipeline.prompts_file {
        Some(ref path) => PromptSet::from_file(path)
            .with_context(|| format!("loading prompts from {}", path.display())),
        None => Ok(PromptSet::default()),
    }
}

async fn run_pipeline(
    config: ScoutConfig,
    context_file: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let research = ResearchContext::from_file(context_file)
        .with_context(|| format!("loading context from {}", context_file.display()))?;
    let prompts = load_prompts(&config)?;
    let backend = BraveEngine::new(&config.search)?;
    let llm = Arc::new(OpenAiCompatClient::from_config(&config.llm)?);

    let pipeline = Pipeline::new(backend, llm, prompts, config)?;
    let report = pipeline.run(&research).await?;
    write_json(&report, output)
}

fn run_dedup(
    mut config: ScoutConfig,
    input: &Path,
    threshold: Option<u32>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(threshold) = threshold {
        config.dedup.simhash_threshold = threshold;
        config.dedup.validate()?;
    }
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let results: SearchResults = serde_json::from_str(&raw)
        .with_context(|| format!("parsing search results from {}", input.display()))?;

    let report = deduplicate_with_report(results, &config.dedup);
    for (driver, stats) in &report.stats {
        info!(
            driver = %driver,
            seen = stats.seen,
            kept = stats.accepted,
            duplicate_url = stats.duplicate_url,
            near_duplicate = stats.near_duplicate,
            missing_url = stats.missing_url,
            "deduplicated"
        );
    }
    write_json(&report.results, output)
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
