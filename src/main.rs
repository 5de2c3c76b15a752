//! Batch collection and analysis of Steam user reviews for a single game
//!
//! Reviews are fetched from the public Steam review API
//! (<https://partner.steamgames.com/doc/store/getreviews>), stored as a flat
//! table, and digested into JSON reports for an external dashboard. Ratings
//! from other storefronts are merged in as static summaries.

mod analysis;
mod config;
mod consolidate;
mod fetch;
mod gephi;
mod lexicon;
mod platforms;
mod progress;
mod review;
mod steam;
mod table;

use crate::{
    analysis::AnalysisReport,
    config::{AnalyzeConfig, CollectConfig, ConsolidateConfig, GephiConfig},
    lexicon::Lexicon,
    progress::ProgressReport,
    steam::SteamClient,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::{num::NonZeroUsize, path::PathBuf};

/// Collect, analyze and consolidate user reviews of a video game
///
/// Every stage runs with sensible defaults when no flag is given, so that the
/// usual workflow is `collect`, then `analyze`, then `consolidate`.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Pipeline stage to run
    #[command(subcommand)]
    stage: Stage,
}

/// Pipeline stages
#[derive(Subcommand, Debug)]
enum Stage {
    /// Fetch every review of the game from Steam and save them as a table
    Collect {
        /// Steam application identifier of the game
        #[arg(long, default_value_t = config::DEFAULT_APP_ID)]
        app_id: u64,

        /// Steam review language to be collected, in collection order
        ///
        /// Can be repeated. When a review shows up in several languages, the
        /// copy from the first language wins.
        #[arg(short, long = "language", default_values_t = config::default_languages())]
        languages: Vec<String>,

        /// Where the review table should be written (".gz" to compress)
        #[arg(short, long, default_value = config::DEFAULT_TABLE)]
        output: PathBuf,
    },

    /// Compute statistics, keywords, n-grams and co-occurrences as JSON
    Analyze {
        /// Review table produced by the collect stage
        #[arg(short, long, default_value = config::DEFAULT_TABLE)]
        input: PathBuf,

        /// Table to be used if the main input table does not exist
        #[arg(long, default_value = config::DEFAULT_FALLBACK_TABLE)]
        fallback: PathBuf,

        /// Where the JSON report should be written
        #[arg(short, long, default_value = config::DEFAULT_REPORT)]
        output: PathBuf,

        /// JSON file overriding the built-in keyword lists and stopwords
        #[arg(long)]
        lexicon: Option<PathBuf>,

        /// Number of most frequent bigrams and trigrams to be reported
        #[arg(long, default_value = "20")]
        top_ngrams: NonZeroUsize,
    },

    /// Merge the Steam report with the ratings of other storefronts
    Consolidate {
        /// JSON report produced by the analyze stage
        #[arg(short, long, default_value = config::DEFAULT_REPORT)]
        processed: PathBuf,

        /// JSON file overriding the built-in storefront summaries
        #[arg(long)]
        platforms: Option<PathBuf>,

        /// Where the consolidated JSON report should be written
        #[arg(short, long, default_value = config::DEFAULT_CONSOLIDATED)]
        output: PathBuf,
    },

    /// Export the concept co-occurrence network as Gephi spreadsheets
    Gephi {
        /// Review table produced by the collect stage
        #[arg(short, long, default_value = config::DEFAULT_TABLE)]
        input: PathBuf,

        /// Table to be used if the main input table does not exist
        #[arg(long, default_value = config::DEFAULT_FALLBACK_TABLE)]
        fallback: PathBuf,

        /// JSON file overriding the built-in keyword lists and stopwords
        #[arg(long)]
        lexicon: Option<PathBuf>,

        /// Where the node table should be written
        #[arg(long, default_value = config::DEFAULT_GEPHI_NODES)]
        nodes: PathBuf,

        /// Where the edge table should be written
        #[arg(long, default_value = config::DEFAULT_GEPHI_EDGES)]
        edges: PathBuf,
    },
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        // Decode CLI arguments
        let args = Args::parse();

        // Check CLI arguments for basic sanity
        if let Stage::Collect { languages, .. } = &args.stage {
            anyhow::ensure!(
                !languages.is_empty(),
                "at least one review language must be collected"
            );
            anyhow::ensure!(
                languages.iter().all(|language| !language.trim().is_empty()),
                "review languages cannot be blank"
            );
        }
        Ok(args)
    }
}
//
#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments and run the requested pipeline stage
    match Args::parse_and_check()?.stage {
        Stage::Collect {
            app_id,
            languages,
            output,
        } => collect(CollectConfig::new(app_id, languages, output)).await,
        Stage::Analyze {
            input,
            fallback,
            output,
            lexicon,
            top_ngrams,
        } => {
            let lexicon = Lexicon::load_or_default(lexicon.as_deref()).await?;
            analyze(AnalyzeConfig::new(input, fallback, output, lexicon, top_ngrams)).await
        }
        Stage::Consolidate {
            processed,
            platforms,
            output,
        } => consolidate::run(&ConsolidateConfig::new(processed, platforms, output)).await,
        Stage::Gephi {
            input,
            fallback,
            lexicon,
            nodes,
            edges,
        } => {
            let lexicon = Lexicon::load_or_default(lexicon.as_deref()).await?;
            gephi::run(&GephiConfig::new(input, fallback, lexicon, nodes, edges)).await
        }
    }
}

/// Fetch the reviews from Steam, then save them as a table
async fn collect(config: std::sync::Arc<CollectConfig>) -> Result<()> {
    let client = SteamClient::new(config.app_id)?;
    let report = ProgressReport::new();
    let reviews = fetch::collect_reviews(&client, &config.retry, &config.languages, &report).await;
    if reviews.is_empty() {
        log::warn!("No review was collected, leaving {} untouched", config.output.display());
        return Ok(());
    }
    table::save(&config.output, &reviews)
        .await
        .with_context(|| format!("saving the review table to {}", config.output.display()))?;
    log::info!(
        "Saved {} reviews to {}",
        reviews.len(),
        config.output.display()
    );
    Ok(())
}

/// Load the review table, digest it, and save the resulting report
async fn analyze(config: std::sync::Arc<AnalyzeConfig>) -> Result<()> {
    let table = table::load_with_fallback(&config.input, &config.fallback).await?;
    log::info!("Loaded {} reviews", table.reviews.len());
    let report = AnalysisReport::compute(&table, &config.lexicon, config.top_ngrams);
    report.save(&config.output).await?;
    log::info!(
        "Saved analysis of {} reviews ({} positive) to {}",
        report.estatisticas.total_reviews,
        report.estatisticas.positive_reviews,
        config.output.display()
    );
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
