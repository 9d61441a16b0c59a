//! `bounty`: run the knockout and bounty engines over tournament logs.
//!
//! Every path is either a document or a directory searched recursively for
//! `*.txt` files. Documents are processed concurrently; each ends as
//! succeeded, skipped or failed, and the results are merged per tournament.
//!
//! Configuration comes from `--config`, else `bounty.toml` in the working
//! directory when present, else defaults. Flags override the file.

mod batch;
mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bounty_core::config::{AnalyzerConfig, DEFAULT_CONFIG_FILE};
use bounty_core::document::Analyzer;

#[derive(Parser)]
#[command(name = "bounty")]
#[command(about = "Extract hero knockouts and bounty buckets from tournament logs", long_about = None)]
struct Cli {
    /// Documents or directories to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Hero display name (overrides the config file)
    #[arg(long)]
    hero: Option<String>,

    /// Match the hero name ignoring case
    #[arg(long)]
    ignore_case: bool,

    /// Skip summaries that finished worse than this place
    #[arg(long)]
    max_place: Option<u32>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documents processed at once (default: available cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalyzerConfig> {
    let default_file = Path::new(DEFAULT_CONFIG_FILE);
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if default_file.exists() => AnalyzerConfig::load(default_file)
            .with_context(|| format!("loading config {DEFAULT_CONFIG_FILE}"))?,
        None => AnalyzerConfig::default(),
    };

    if let Some(hero) = &cli.hero {
        config.hero = hero.clone();
    }
    if cli.ignore_case {
        config.hero_case_sensitive = false;
    }
    if let Some(place) = cli.max_place {
        config.max_finish_place = Some(place);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialise tracing (respects RUST_LOG env var).
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let analyzer = Arc::new(Analyzer::new(&config).context("building hero pattern")?);

    let files = batch::collect_inputs(&cli.paths).await?;
    if files.is_empty() {
        tracing::warn!("no documents found");
    }
    let jobs = cli.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism().map_or(4, |n| n.get())
    });
    tracing::info!(documents = files.len(), jobs, hero = %config.hero, "starting batch");

    let processed = batch::run(analyzer, files, jobs).await;
    let (batch, rollup) = batch::tally(processed, config.precedence);
    tracing::info!(
        succeeded = batch.succeeded,
        skipped = batch.skipped,
        failed = batch.failed,
        tournaments = rollup.len(),
        "batch finished"
    );

    if cli.json {
        println!("{}", report::render_json(&batch, &rollup)?);
    } else {
        print!("{}", report::render_text(&batch, &rollup));
    }
    Ok(())
}
