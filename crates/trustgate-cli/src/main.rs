//! trustgate - admission gate for third-party ML artifacts
//!
//! ## Commands
//!
//! - `score`: Evaluate models and print one NDJSON audit record per model
//! - `gate`: Evaluate a single model and exit non-zero when it is rejected

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use trustgate_core::telemetry::init_tracing;
use trustgate_core::{build_contexts, Evaluator, ScoringConfig};

#[derive(Parser)]
#[command(name = "trustgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Trust and quality gate for ML model artifacts", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Scoring config (TOML); defaults apply when omitted
    #[arg(long, global = true, env = "TRUSTGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score models and print NDJSON audit records
    ///
    /// Dataset and code URLs attach to the next model URL that follows them.
    Score {
        /// Artifact URLs (models, datasets, code repositories)
        urls: Vec<String>,

        /// File with one URL per line, or comma-separated `code,dataset,model` lines
        #[arg(long)]
        url_file: Option<PathBuf>,
    },

    /// Run the quality gate on one model
    Gate {
        /// Model URL
        url: String,

        /// Related dataset or code URLs
        #[arg(long = "with")]
        related: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json_logs, level);

    let config = match &cli.config {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScoringConfig::default(),
    };
    let evaluator = Evaluator::from_env(config).context("Failed to build evaluator")?;

    match cli.command {
        Commands::Score { urls, url_file } => cmd_score(&evaluator, urls, url_file.as_deref()).await,
        Commands::Gate { url, related } => cmd_gate(&evaluator, &url, related).await,
    }
}

async fn cmd_score(
    evaluator: &Evaluator,
    mut urls: Vec<String>,
    url_file: Option<&Path>,
) -> Result<ExitCode> {
    if let Some(path) = url_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        urls.extend(parse_url_lines(&text));
    }
    if urls.is_empty() {
        bail!("no URLs given; pass them as arguments or with --url-file");
    }

    let contexts = build_contexts(&urls).context("Failed to parse artifact URLs")?;
    if contexts.is_empty() {
        bail!("no model URLs among the {} given", urls.len());
    }
    info!(models = contexts.len(), "scoring");

    for ctx in contexts {
        let evaluation = evaluator.evaluate_context(ctx).await;
        println!("{}", serde_json::to_string(&evaluation.audit.to_record())?);
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_gate(evaluator: &Evaluator, url: &str, related: Vec<String>) -> Result<ExitCode> {
    let mut urls = related;
    urls.push(url.to_string());
    let contexts = build_contexts(&urls).context("Failed to parse artifact URLs")?;
    let Some(ctx) = contexts.into_iter().last() else {
        bail!("{} is not a model URL", url);
    };

    let evaluation = evaluator.evaluate_context(ctx).await;
    println!("{}", evaluation.report().to_json()?);

    if evaluation.passes {
        eprintln!("accepted: {}", evaluation.audit.name());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("rejected: {}", evaluation.audit.name());
        eprintln!("{}", evaluation.decision().explain());
        Ok(ExitCode::from(2))
    }
}

/// URLs from a batch file. Blank lines and `#` comments are skipped; each
/// line may hold several comma-separated URLs with empty fields allowed.
fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
