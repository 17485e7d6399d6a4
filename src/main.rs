//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `page_trust` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use page_trust::config::Theme;
use page_trust::initialization::init_logger_with;
use page_trust::{
    print_pipeline_statistics, print_run_summary, validate_and_normalize_url, AnalysisResult,
    BackendKind, Config, LogFormat, LogLevel, Message, PageOutcome, PageSnapshot, Response,
    Runtime,
};

#[derive(Parser, Debug)]
#[command(name = "page_trust", version, about = "Score how trustworthy a web page looks")]
struct Cli {
    /// SQLite file holding the cache, offline queue and settings
    #[arg(long, global = true, default_value = "page_trust.db")]
    db: PathBuf,

    /// Keep everything in memory for this run
    #[arg(long, global = true, conflicts_with = "db")]
    ephemeral: bool,

    #[arg(long, global = true, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[arg(long, global = true, value_enum, default_value = "plain")]
    log_format: LogFormat,

    /// Backend analyses are submitted to
    #[arg(long, global = true, value_enum, default_value = "local")]
    backend: BackendKind,

    /// Seed for the simulated backend's demo backfill
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Seconds to wait for a page context to deliver signals
    #[arg(long, global = true, default_value_t = 10)]
    collection_timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze live pages, or a saved HTML file
    Analyze(AnalyzeArgs),
    /// Show the cached analysis for a domain
    Cached { domain: String },
    /// Show the Coordinator status
    Status,
    /// Drop every cached analysis
    ClearCache,
    /// List bundles waiting for the backend
    Queue,
    /// Resubmit queued bundles
    Flush,
    /// Show or change settings
    Settings(SettingsArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Page URLs to load and analyze
    #[arg(long = "url", required_unless_present = "html")]
    urls: Vec<String>,

    /// Analyze a saved HTML document instead of fetching
    #[arg(long, requires = "page_url", conflicts_with = "urls")]
    html: Option<PathBuf>,

    /// URL the saved document was loaded from
    #[arg(long)]
    page_url: Option<String>,

    /// `document.cookie` string for the saved document
    #[arg(long, default_value = "")]
    cookies: String,

    /// Print full results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(long)]
    auto_analyze: Option<bool>,
    #[arg(long)]
    notifications: Option<bool>,
    #[arg(long)]
    cache_hours: Option<u32>,
    #[arg(long, value_enum)]
    theme: Option<Theme>,
    #[arg(long)]
    dashboard_url: Option<String>,
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.auto_analyze.is_none()
            && self.notifications.is_none()
            && self.cache_hours.is_none()
            && self.theme.is_none()
            && self.dashboard_url.is_none()
    }
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            db_path: (!self.ephemeral).then(|| self.db.clone()),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            collection_timeout: Duration::from_secs(self.collection_timeout),
            backend: self.backend,
            seed: self.seed,
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let runtime = Runtime::start(&config)
        .await
        .context("Failed to start page_trust")?;

    let outcome = run_command(&runtime, cli.command).await;

    let stats = runtime.coordinator().stats();
    runtime.shutdown().await;
    print_pipeline_statistics(&stats);

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("page_trust error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Runs one subcommand; `Ok(false)` means it finished with failures.
async fn run_command(runtime: &Runtime, command: Command) -> Result<bool> {
    let coordinator = runtime.coordinator();
    let response = match command {
        Command::Analyze(args) => return analyze(runtime, args).await,
        Command::Cached { domain } => coordinator.handle(Message::GetCachedResult { domain }).await,
        Command::Status => coordinator.handle(Message::GetStatus).await,
        Command::ClearCache => coordinator.handle(Message::ClearCache).await,
        Command::Queue => coordinator.handle(Message::GetOfflineQueue).await,
        Command::Flush => coordinator.handle(Message::RetryOfflineQueue).await,
        Command::Settings(args) => {
            if args.is_empty() {
                coordinator.handle(Message::GetSettings).await
            } else {
                let mut settings = coordinator.settings();
                if let Some(v) = args.auto_analyze {
                    settings.auto_analyze = v;
                }
                if let Some(v) = args.notifications {
                    settings.notifications = v;
                }
                if let Some(v) = args.cache_hours {
                    settings.cache_expiration_hours = v;
                }
                if let Some(v) = args.theme {
                    settings.theme = v;
                }
                if let Some(v) = args.dashboard_url {
                    settings.dashboard_url = v;
                }
                coordinator.handle(Message::UpdateSettings { settings }).await;
                coordinator.handle(Message::GetSettings).await
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(!response.is_error())
}

async fn analyze(runtime: &Runtime, args: AnalyzeArgs) -> Result<bool> {
    let outcomes = match &args.html {
        Some(path) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let page_url = args.page_url.clone().unwrap_or_default();
            let Some(page_url) = validate_and_normalize_url(&page_url) else {
                bail!("Invalid page URL '{}'", page_url);
            };
            let snapshot = PageSnapshot::new(page_url.clone(), html, args.cookies.clone());
            let outcome = match runtime.analyze_snapshot(snapshot).await {
                Ok((result, from_cache)) => PageOutcome::Analyzed {
                    url: page_url,
                    result,
                    from_cache,
                },
                Err(e) => PageOutcome::Failed {
                    url: page_url,
                    retriable: e.is_retriable(),
                    error: e.to_string(),
                },
            };
            vec![outcome]
        }
        None => {
            let urls: Vec<String> = args
                .urls
                .iter()
                .filter_map(|u| validate_and_normalize_url(u))
                .collect();
            if urls.is_empty() {
                bail!("No valid URLs to analyze");
            }
            let report = runtime.analyze_urls(urls).await;
            print_run_summary(
                report.analyzed(),
                report.from_cache(),
                report.failed(),
                report.elapsed_seconds,
            );
            report.outcomes
        }
    };

    // Explanations are generated in the background; wait so they can be shown
    runtime.coordinator().wait_for_background().await;

    let mut all_ok = true;
    for outcome in outcomes {
        match outcome {
            PageOutcome::Analyzed {
                result, from_cache, ..
            } => {
                let result = latest(runtime, result).await;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_result(&result, from_cache);
                }
            }
            PageOutcome::Failed {
                url,
                error,
                retriable,
            } => {
                all_ok = false;
                let hint = if retriable { " (queued, run `flush` later)" } else { "" };
                println!("{}: {}{}", url, error, hint);
            }
        }
    }
    Ok(all_ok)
}

/// The cached copy carries the explanation once it has been generated.
async fn latest(runtime: &Runtime, result: AnalysisResult) -> AnalysisResult {
    let request = Message::GetCachedResult {
        domain: result.domain.clone(),
    };
    match runtime.coordinator().handle(request).await {
        Response::Result {
            result: Some(cached),
        } if cached.id == result.id => cached,
        _ => result,
    }
}

fn print_result(result: &AnalysisResult, from_cache: bool) {
    println!(
        "{}: trust {} ({}){}",
        result.domain,
        result.trust_score,
        result.verdict,
        if from_cache { " [cached]" } else { "" }
    );
    let s = &result.scores;
    println!(
        "  tls {}  headers {}  cookies {}  trackers {}  fingerprinting {}",
        s.ssl, s.headers, s.cookies, s.trackers, s.fingerprinting
    );
    if let Some(text) = &result.explanation.text {
        println!("  {}", text);
    }
}
