use anyhow::{Context, Result};
use bovada_props::config::{ConfigFile, Endpoint, ExportConfig};
use bovada_props::build_props_csv;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Export Bovada prop bets to a CSV for the props game
#[derive(Debug, Parser)]
#[command(name = "bovada-props", version)]
struct Args {
    /// TOML file with endpoints and export settings
    #[arg(long, env = "PROPS_CONFIG")]
    config: Option<PathBuf>,

    /// Endpoint to fetch; repeat to fetch several. Replaces the configured list
    #[arg(long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// Where to write the CSV
    #[arg(short, long, env = "PROPS_OUTPUT")]
    output: Option<PathBuf>,

    /// Keep markets that have no outcomes
    #[arg(long)]
    keep_placeholders: bool,

    /// Leave the $$points= annotation out of each side
    #[arg(long)]
    no_points: bool,

    /// Per-request timeout
    #[arg(long, env = "PROPS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Deadline for fetching all endpoints
    #[arg(long, env = "PROPS_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    /// Save raw responses here
    #[arg(long, env = "CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Read responses from the cache directory when present
    #[arg(
        long,
        env = "USE_CACHE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    use_cache: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> bovada_props::Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigFile::load(path)?.apply(ExportConfig::default()),
            None => ExportConfig::default(),
        };

        if !self.endpoints.is_empty() {
            config.endpoints = self.endpoints.into_iter().map(Endpoint::from_url).collect();
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.keep_placeholders {
            config.skip_placeholders = false;
        }
        if self.no_points {
            config.include_points = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.deadline_secs {
            config.overall_deadline = Duration::from_secs(secs);
        }
        if self.cache_dir.is_some() {
            config.cache_dir = self.cache_dir;
        }
        config.use_cache = self.use_cache;

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Bovada Props CSV Export\n");

    let config = args.into_config().context("Failed to load configuration")?;
    println!("Fetching {} endpoints...\n", config.endpoints.len());

    let summary = build_props_csv(&config)
        .await
        .context("Failed to build props CSV")?;

    println!(
        "Saved {} bets ({} side columns) from {} endpoints to {}",
        summary.bets,
        summary.max_outcomes,
        summary.endpoints,
        summary.output.display()
    );
    if summary.skipped_placeholders > 0 {
        println!("Skipped {} placeholder markets", summary.skipped_placeholders);
    }

    Ok(())
}
