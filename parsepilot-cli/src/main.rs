// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ParsePilot CLI - drive a page-analysis and scraping backend from the
//! command line.
//!
//! # Examples
//!
//! ```bash
//! # Full interactive wizard for a catalog page
//! parsepilot wizard https://shop.example/catalog
//!
//! # Analyze only, print the candidates
//! parsepilot analyze https://shop.example/catalog
//!
//! # List saved configs, optionally scoped to one site
//! parsepilot configs
//! parsepilot configs --domain shop.example
//!
//! # Run a scrape from a saved config
//! parsepilot scrape 7 --max-pages 3
//!
//! # Download the results of a finished run
//! parsepilot export t-42 --format excel --output items.xlsx
//!
//! # JSON output for scripting
//! parsepilot configs --json
//! ```

mod commands;
mod output;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use parsepilot_client::{ApiClient, PollSettings};

use commands::{analyze, config, configs, export, scrape, wizard};
use settings::Settings;

// ============================================================================
// CLI Definition
// ============================================================================

/// ParsePilot CLI - wizard-style web scraping against a task backend.
#[derive(Parser)]
#[command(name = "parsepilot")]
#[command(about = "Wizard-style client for a page-analysis and scraping backend")]
#[command(long_about = r#"
ParsePilot walks a page through the backend's analyze/scrape pipeline:

  analyze  ->  pick a candidate  ->  tune the fields  ->  save the config
           ->  run the scrape   ->  collect the results

Examples:
  parsepilot wizard https://shop.example/catalog   # Full interactive flow
  parsepilot analyze https://shop.example/catalog  # Analysis only
  parsepilot configs --domain shop.example         # Saved configs for a site
  parsepilot scrape 7 --max-pages 3                # Run from a saved config
  parsepilot export t-42 --format json -o out.json # Download results
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides the settings file).
    #[arg(long, global = true)]
    pub backend_url: Option<Url>,

    /// Poll interval in milliseconds (overrides the settings file).
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Give up after this many status queries per poll (default: unbounded).
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// JSON output for scripting.
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Full interactive flow: analyze, select, tune, save, scrape.
    #[command(visible_alias = "w")]
    Wizard(wizard::WizardArgs),

    /// Start an analysis and print the candidates.
    #[command(visible_alias = "a")]
    Analyze(analyze::AnalyzeArgs),

    /// List saved configs.
    Configs(configs::ConfigsArgs),

    /// Show one saved config.
    Config(config::ConfigArgs),

    /// Run a scrape from a saved config.
    #[command(visible_alias = "s")]
    Scrape(scrape::ScrapeArgs),

    /// Download an export of a finished run.
    #[command(visible_alias = "e")]
    Export(export::ExportArgs),
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The backend task itself reported failure.
    TaskFailed = 2,
}

/// Runtime context resolved from flags and the settings file.
pub struct AppContext {
    /// Client for the configured backend.
    pub api: ApiClient,
    /// Poll timing for task status queries.
    pub poll: PollSettings,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool) {
    // RUST_LOG wins over the verbosity flag.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(
                "parsepilot_core=debug,parsepilot_client=debug,parsepilot_workflow=debug,info",
            )
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let ctx = build_context(&cli).await;

    let result = match &cli.command {
        Commands::Wizard(args) => wizard::run(args, &cli, &ctx).await,
        Commands::Analyze(args) => analyze::run(args, &cli, &ctx).await,
        Commands::Configs(args) => configs::run(args, &cli, &ctx).await,
        Commands::Config(args) => config::run(args, &cli, &ctx).await,
        Commands::Scrape(args) => scrape::run(args, &cli, &ctx).await,
        Commands::Export(args) => export::run(args, &cli, &ctx).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}

/// Resolves the backend URL and poll timing: flags override the settings file.
async fn build_context(cli: &Cli) -> AppContext {
    let settings = Settings::load_or_init().await;

    let backend_url = cli
        .backend_url
        .clone()
        .unwrap_or_else(|| settings.backend_url.clone());
    let interval_ms = cli.interval_ms.unwrap_or(settings.poll_interval_ms);

    let mut poll = PollSettings::new(std::time::Duration::from_millis(interval_ms));
    if let Some(max_attempts) = cli.max_attempts {
        poll = poll.with_max_attempts(max_attempts);
    }

    AppContext {
        api: ApiClient::new(backend_url),
        poll,
    }
}
