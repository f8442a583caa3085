//! Wildfire Water-Utility Grants Finder - server and one-shot export
//!
//! # Usage
//!
//! ```text
//! wildfire-water-finder                      # serve the search page on 0.0.0.0:8501
//! wildfire-water-finder --addr 127.0.0.1:9000 serve
//! wildfire-water-finder export --out-dir out --states CA,OR --start 2020-01-01
//! wildfire-water-finder config               # print the effective configuration
//! ```
//!
//! # Environment Variables
//!
//! - `FINDER_CONFIG`: Path to a TOML config file (default: `./finder_config.toml`)
//! - `FINDER_SERVER_ADDR`: Server bind address
//! - `FINDER_CORS_ORIGINS`: Comma-separated extra CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wildfire_water_finder::aggregate;
use wildfire_water_finder::api::{create_app, FinderState};
use wildfire_water_finder::config::defaults::{
    PROJECTS_CSV_FILENAME, SUMMARY_CSV_FILENAME, TOP_UTILITIES,
};
use wildfire_water_finder::export;
use wildfire_water_finder::{
    run_search, FinderConfig, GrantSource, OpenFemaClient, SearchOutcome, SearchRequest,
    SnapshotSource,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wildfire-water-finder")]
#[command(about = "Find water utilities among FEMA Public Assistance fire grants")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8501")
    #[arg(short, long, value_name = "HOST:PORT", env = "FINDER_SERVER_ADDR")]
    addr: Option<String>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the search page (default)
    Serve,

    /// Run one search and write both CSV files
    Export(ExportArgs),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Directory receiving the CSV files (created if missing)
    #[arg(long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Comma-separated state codes (default: all states)
    #[arg(long)]
    states: Option<String>,

    /// First obligation date, YYYY-MM-DD
    #[arg(long)]
    start: Option<String>,

    /// Last obligation date, YYYY-MM-DD
    #[arg(long)]
    end: Option<String>,

    /// Comma-separated damage categories (default: from config, "F")
    #[arg(long)]
    categories: Option<String>,

    /// Match incidentType exactly 'Fire' instead of containing Fire/Wildfire
    #[arg(long)]
    exact_incident: bool,

    /// Comma-separated include keywords (default: built-in water terms)
    #[arg(long)]
    include: Option<String>,

    /// Comma-separated applicant-name exclude keywords
    #[arg(long)]
    exclude: Option<String>,

    /// Read records from a previous project CSV instead of OpenFEMA
    #[arg(long, value_name = "CSV")]
    input: Option<PathBuf>,
}

impl ExportArgs {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            states: self.states.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            categories: self.categories.clone(),
            incident_contains: self.exact_incident.then_some(false),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run_server(config: FinderConfig) -> Result<()> {
    let addr = config.server.addr.clone();
    let client = OpenFemaClient::new(&config.api).context("Failed to build OpenFEMA client")?;
    info!(base_url = client.base_url(), "Upstream dataset");

    let state = FinderState::new(Arc::new(client), config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Serving on http://{}", addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

async fn run_export(config: FinderConfig, args: ExportArgs) -> Result<()> {
    let params = args
        .request()
        .resolve(&config.search)
        .context("Invalid search parameters")?;

    let source: Box<dyn GrantSource> = match &args.input {
        Some(path) => Box::new(
            SnapshotSource::from_csv(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => Box::new(OpenFemaClient::new(&config.api).context("Failed to build OpenFEMA client")?),
    };

    let outcome = run_search(source.as_ref(), &params)
        .await
        .context("Search failed")?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    let (projects_path, summary_path) = write_outcome(&outcome, &args.out_dir)?;

    print_report(&outcome);
    println!("Wrote {}", projects_path.display());
    println!("Wrote {}", summary_path.display());
    Ok(())
}

/// Write both CSV files into `dir`, returning their paths.
fn write_outcome(outcome: &SearchOutcome, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let projects_path = dir.join(PROJECTS_CSV_FILENAME);
    let file = File::create(&projects_path)
        .with_context(|| format!("Failed to create {}", projects_path.display()))?;
    export::write_projects(BufWriter::new(file), &outcome.projects)
        .with_context(|| format!("Failed to write {}", projects_path.display()))?;

    let summary_path = dir.join(SUMMARY_CSV_FILENAME);
    let file = File::create(&summary_path)
        .with_context(|| format!("Failed to create {}", summary_path.display()))?;
    export::write_summaries(BufWriter::new(file), &outcome.summaries)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    Ok((projects_path, summary_path))
}

fn print_report(outcome: &SearchOutcome) {
    println!("Filter:        {}", outcome.filter);
    if !outcome.last_url.is_empty() {
        println!("Last URL:      {}", outcome.last_url);
    }
    println!("Upstream rows: {}", outcome.total_count);
    println!("Fetched:       {}", outcome.fetched);
    println!("Water projects: {}", outcome.projects.len());
    println!("Utilities:     {}", outcome.summaries.len());
    println!("Total federal share obligated: ${}", outcome.grand_total());

    let top = aggregate::top(&outcome.summaries, TOP_UTILITIES);
    if !top.is_empty() {
        println!();
        println!("Top {} utilities by federal share:", top.len());
        for (i, s) in top.iter().enumerate() {
            println!(
                "{:>3}. {:<50} {:>2} {:>16} ({} projects)",
                i + 1,
                s.applicant_name,
                s.state,
                s.total_federal_share_obligated.to_string(),
                s.project_count
            );
        }
    }
    println!();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = FinderConfig::load();
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    config.validate().context("Invalid configuration")?;

    match args.command.unwrap_or(SubCommand::Serve) {
        SubCommand::Serve => run_server(config).await,
        SubCommand::Export(export_args) => run_export(config, export_args).await,
        SubCommand::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
