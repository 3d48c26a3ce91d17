//! url-evaluator main entry point
//!
//! This is the command-line interface for crawling a site, classifying the
//! topics of its links, and reporting per-topic averages.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url_evaluator::classifier::HttpZeroShotScorer;
use url_evaluator::config::{load_config_with_hash, validate, Config};
use url_evaluator::output::{
    aggregate_topic_scores, load_statistics, print_statistics, print_topic_averages,
};
use url_evaluator::storage::open_storage;
use url_evaluator::{validate_seed_url, Coordinator, LinkClassifier, Storage};

/// url-evaluator: crawl a site and score the topics of its links
///
/// Crawls depth-first from a seed URL, records every page and outbound link
/// in SQLite, classifies each link against a set of topic labels, and prints
/// the average confidence per topic.
#[derive(Parser, Debug)]
#[command(name = "url-evaluator")]
#[command(version)]
#[command(about = "Crawl a site and score the topics of its links", long_about = None)]
struct Cli {
    /// URL the crawl starts from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum crawl depth (overrides the config file)
    #[arg(short = 'd', long, value_name = "N")]
    max_depth: Option<u32>,

    /// Additional topic label (repeatable)
    #[arg(short = 't', long = "topic", value_name = "LABEL")]
    topics: Vec<String>,

    /// Only crawl; skip classification and the report
    #[arg(long, conflicts_with_all = ["classify_only", "report"])]
    crawl_only: bool,

    /// Only classify links already in the database, then report
    #[arg(long, conflicts_with_all = ["crawl_only", "report"])]
    classify_only: bool,

    /// Only print the topic averages from existing data
    #[arg(long, conflicts_with_all = ["crawl_only", "classify_only"])]
    report: bool,

    /// Clear the seed's existing classifications before classifying
    #[arg(long, conflicts_with_all = ["crawl_only", "report"])]
    reclassify: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["crawl_only", "classify_only", "report", "reclassify"])]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let seed = validate_seed_url(&cli.seed).context("Invalid seed URL")?;
    let config = build_config(&cli)?;
    let db_path = Path::new(&config.output.database_path);

    if cli.stats {
        return handle_stats(db_path, seed.as_str());
    }

    if !cli.classify_only && !cli.report {
        handle_crawl(&config, seed.as_str()).await?;
    }

    if cli.crawl_only {
        return Ok(());
    }

    if !cli.report {
        if cli.reclassify {
            handle_reclassify(db_path, seed.as_str())?;
        }
        handle_classify(&config, seed.as_str()).await?;
    }

    handle_report(db_path, seed.as_str())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("url_evaluator=info,warn"),
            1 => EnvFilter::new("url_evaluator=debug,info"),
            2 => EnvFilter::new("url_evaluator=trace,debug"),
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

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    config
        .classifier
        .additional_topics
        .extend(cli.topics.iter().cloned());

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(db_path: &Path, seed: &str) -> anyhow::Result<()> {
    println!("Database: {}\n", db_path.display());

    let storage = open_storage(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let stats = load_statistics(&storage, seed)?;
    storage.close()?;

    print_statistics(&stats);
    Ok(())
}

/// Handles the crawl phase
async fn handle_crawl(config: &Config, seed: &str) -> anyhow::Result<()> {
    let db_path = Path::new(&config.output.database_path);
    let storage = open_storage(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let coordinator = Coordinator::new(
        seed,
        config.crawler.max_depth,
        config.crawler.clone(),
        storage,
    )?;
    let report = coordinator.run().await.context("Crawl failed")?;

    tracing::info!(
        "Crawled {} pages ({} failed), {} links recorded",
        report.pages_stored,
        report.fetch_failures,
        report.links_found
    );
    Ok(())
}

/// Handles --reclassify: puts the seed's links back on the queue
fn handle_reclassify(db_path: &Path, seed: &str) -> anyhow::Result<()> {
    let mut storage = open_storage(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let cleared = storage.clear_classifications(seed)?;
    storage.close()?;

    tracing::info!("Cleared {} existing classifications", cleared);
    Ok(())
}

/// Handles the classification phase
async fn handle_classify(config: &Config, seed: &str) -> anyhow::Result<()> {
    let db_path = Path::new(&config.output.database_path);
    let storage = open_storage(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let scorer = HttpZeroShotScorer::from_config(&config.classifier)
        .context("Failed to build topic scorer")?;

    let classifier = LinkClassifier::new(seed, config.classifier.clone(), storage, scorer)?;
    let report = classifier
        .classify_all_pending()
        .await
        .context("Classification failed")?;

    if report.skipped > 0 {
        tracing::warn!(
            "{} links could not be classified and remain pending",
            report.skipped
        );
    }
    Ok(())
}

/// Handles the report phase: prints per-topic averages
fn handle_report(db_path: &Path, seed: &str) -> anyhow::Result<()> {
    let storage = open_storage(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let averages = aggregate_topic_scores(&storage, seed)?;
    storage.close()?;

    print_topic_averages(seed, &averages);
    Ok(())
}
