//! Balloonwatch - weather-balloon constellation dashboard
//!
//! Polls the hourly balloon telemetry feed, serves positions and
//! trajectories to a map dashboard, and relays constellation summaries
//! to an LLM for natural-language analysis.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, upstream failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod feed;
mod llm;
mod models;
mod report;
mod server;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{AnalyzeKind, Args, Command, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use feed::TelemetryFetcher;
use llm::{AnalysisGateway, OpenAiClient};
use models::AnalysisKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let command = args.command();

    // No logging needed to write the default config
    if matches!(command, Command::InitConfig) {
        return handle_init_config();
    }

    // `general.verbose` feeds the log level, so config comes first
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("Balloonwatch v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    if let Err(e) = run(config, command).await {
        error!("{:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle `init-config`: generate a default .balloonwatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the feed, LLM model, server port, and cache age.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` takes precedence over the verbosity settings.
fn init_logging(level: tracing::Level) {
    let default_filter = format!("balloonwatch={},tower_http=info", level).to_lowercase();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

async fn run(config: Config, command: Command) -> Result<()> {
    let fetcher = Arc::new(TelemetryFetcher::new(
        &config.feed,
        config.general.concurrency,
    )?);

    match command {
        Command::Serve { .. } => run_server(&config, fetcher).await,
        Command::Snapshot { hours_ago } => print_snapshot(&fetcher, hours_ago).await,
        Command::Summary { hours, format } => print_summary(&fetcher, hours, format).await,
        Command::Analyze {
            kind,
            question,
            api_key,
        } => print_analysis(&config, fetcher, kind, question, api_key).await,
        Command::InitConfig => handle_init_config(),
    }
}

fn build_gateway(config: &Config, fetcher: Arc<TelemetryFetcher>) -> Result<AnalysisGateway> {
    let backend = Arc::new(OpenAiClient::new(&config.llm)?);
    Ok(AnalysisGateway::new(
        fetcher,
        backend,
        Duration::from_secs(config.cache.max_age_seconds),
    ))
}

async fn run_server(config: &Config, fetcher: Arc<TelemetryFetcher>) -> Result<()> {
    let gateway = build_gateway(config, fetcher.clone())?;

    println!("🎈 Balloon constellation dashboard");
    println!("   Feed: {}", config.feed.base_url);
    println!("   Model: {}", config.llm.model);
    println!("   URL: http://{}:{}", config.server.host, config.server.port);
    println!("   Press Ctrl+C to stop the server.");

    let state = server::AppState {
        fetcher,
        gateway: Arc::new(gateway),
        static_dir: PathBuf::from(&config.server.static_dir),
    };

    server::serve(&config.server.host, config.server.port, state).await
}

async fn print_snapshot(fetcher: &TelemetryFetcher, hours_ago: u8) -> Result<()> {
    let snapshot = fetcher.fetch_snapshot(hours_ago).await?;
    info!(
        "Snapshot {:02} has {} balloons",
        hours_ago,
        snapshot.balloons.len()
    );

    let output = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
    println!("{}", output);
    Ok(())
}

async fn print_summary(fetcher: &TelemetryFetcher, hours: u8, format: OutputFormat) -> Result<()> {
    let start_time = Instant::now();
    let hours = hours.min(fetcher.hours_available());

    let snapshots = fetcher.fetch_history(hours).await;
    if snapshots.len() < usize::from(hours) {
        warn!(
            "Only {} of {} hourly snapshots could be fetched",
            snapshots.len(),
            hours
        );
    }

    let snapshots_fetched = snapshots.len();
    let records: Vec<_> = snapshots.into_iter().flat_map(|s| s.balloons).collect();

    let report = report::ConstellationReport {
        metadata: report::ReportMetadata {
            feed_url: fetcher.base_url().to_string(),
            generated_at: Utc::now(),
            hours_requested: hours,
            snapshots_fetched,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        stats: analysis::SnapshotStats::from_records(&records),
        movement: analysis::MovementStats::from_records(&records),
        anomalies: analysis::AnomalyReport::detect(&records),
    };

    let output = match format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };
    println!("{}", output);
    Ok(())
}

async fn print_analysis(
    config: &Config,
    fetcher: Arc<TelemetryFetcher>,
    kind: AnalyzeKind,
    question: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    let gateway = build_gateway(config, fetcher)?;

    let kind = match kind {
        AnalyzeKind::Question => AnalysisKind::Question,
        AnalyzeKind::Insights => AnalysisKind::GeneralInsights,
        AnalyzeKind::Anomalies => AnalysisKind::Anomalies,
        AnalyzeKind::Launch => AnalysisKind::LaunchRecommendations,
    };

    println!("🤖 Running {} analysis with {}...", kind, config.llm.model);
    let outcome = gateway
        .analyze(kind, api_key.as_deref(), question.as_deref())
        .await?;

    println!("\n{}", outcome.text);
    Ok(())
}

/// Where the configuration came from, reported once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", DEFAULT_CONFIG_FILE),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}
