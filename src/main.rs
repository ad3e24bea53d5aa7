//! seo-sweep main entry point
//!
//! This is the command-line interface for the seo-sweep analysis pipeline.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use seo_sweep::config::{load_config_with_hash, Config};
use seo_sweep::crawler::{analyze_site, build_http_client, discover_links};
use seo_sweep::output::{aggregate_run, write_plan_outputs};
use seo_sweep::storage::{Run, RunStore};
use seo_sweep::{PageRuleAnalyzer, SeoSweepError, UrlError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// seo-sweep: SEO analysis and remediation planning
///
/// Analyzes a site (falling back from https to http on network failures),
/// discovers outbound links from a root page, and aggregates a run directory
/// into a ranked task list and executive summary.
#[derive(Parser, Debug)]
#[command(name = "seo-sweep")]
#[command(version)]
#[command(about = "SEO analysis and remediation planning", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reports root directory (overrides the configuration)
    #[arg(long, global = true, value_name = "DIR")]
    reports_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one site and write its outcome into a new run
    Analyze {
        /// Host or URL to analyze
        target: Option<String>,
    },

    /// Discover outbound links from a root URL into the latest run
    Crawl {
        /// Host or URL to crawl
        target: Option<String>,
    },

    /// Aggregate a run into a plan, task list and executive summary
    Aggregate {
        /// Run directory (defaults to the most recent run)
        run_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(SeoSweepError::Url(UrlError::EmptyInput)) = e.downcast_ref::<SeoSweepError>() {
                eprintln!("Usage: seo-sweep <analyze|crawl> <TARGET>");
            } else {
                tracing::error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_sweep=info,warn"),
            1 => EnvFilter::new("seo_sweep=debug,info"),
            2 => EnvFilter::new("seo_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(dir) = &cli.reports_dir {
        config.output.reports_dir = dir.display().to_string();
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let store = RunStore::new(&config.output.reports_dir);

    match cli.command {
        Command::Analyze { target } => handle_analyze(&config, &store, target.as_deref()).await,
        Command::Crawl { target } => handle_crawl(&config, &store, target.as_deref()).await,
        Command::Aggregate { run_dir } => handle_aggregate(&store, run_dir),
    }
}

/// Handles `analyze`: one site, one new run directory
async fn handle_analyze(config: &Config, store: &RunStore, target: Option<&str>) -> anyhow::Result<()> {
    let target = target.unwrap_or_default();
    let analyzer =
        PageRuleAnalyzer::from_config(config).context("Failed to build HTTP client")?;

    let outcome = analyze_site(&analyzer, store, target).await?;
    let site = outcome.analysis.site();

    if outcome.is_success() {
        println!(
            "Saved report for {} -> {}",
            site,
            outcome.run.path().display()
        );
    } else {
        println!(
            "Analysis failed for {}; error saved to {}",
            site,
            outcome.run.path().display()
        );
    }
    if !outcome.write_failures.is_empty() {
        tracing::warn!(
            "{} artifacts for {} could not be written",
            outcome.write_failures.len(),
            site
        );
    }
    Ok(())
}

/// Handles `crawl`: link discovery into the latest run
async fn handle_crawl(config: &Config, store: &RunStore, target: Option<&str>) -> anyhow::Result<()> {
    let target = target.unwrap_or_default();
    let client = build_http_client(&config.user_agent, &config.fetch)
        .context("Failed to build HTTP client")?;

    let report = discover_links(&client, store, target, config.crawler.max_links).await?;
    println!(
        "Discovered {} links from {}",
        report.total_links(),
        report.roots().join(", ")
    );
    Ok(())
}

/// Handles `aggregate`: plan outputs for an explicit or the latest run
fn handle_aggregate(store: &RunStore, run_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let run = match run_dir {
        Some(path) => Run::resolve(&path)?,
        None => match store.latest_run()? {
            Some(run) => run,
            None => {
                eprintln!(
                    "No reports found. Run analyze first to generate reports under {}",
                    store.root().display()
                );
                return Ok(());
            }
        },
    };
    println!("Using reports directory: {}", run.path().display());

    let plan = aggregate_run(&run, Utc::now())
        .with_context(|| format!("Failed to aggregate {}", run.path().display()))?;
    write_plan_outputs(&run, &plan)
        .with_context(|| format!("Failed to write plan outputs to {}", run.path().display()))?;

    println!(
        "Wrote project-plan.json, project-tasks.txt, and executive-summary.txt to {} ({} tasks)",
        run.path().display(),
        plan.tasks.len()
    );
    Ok(())
}
