//! Per-stage pipeline configuration
//!
//! Each pipeline stage gets its own immutable configuration, built from the
//! digested CLI arguments, so that file locations and tuning knobs are passed
//! down explicitly instead of being baked into the stages.

use crate::{fetch::RetryPolicy, lexicon::Lexicon};
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

/// Steam application identifier of "The Vale: Shadow of the Crown"
pub const DEFAULT_APP_ID: u64 = 989790;

/// Review table written by `collect` and read by the analysis stages
pub const DEFAULT_TABLE: &str = "steam_reviews.tsv";

/// Spreadsheet export used when the main review table is missing
pub const DEFAULT_FALLBACK_TABLE: &str = "steam_reviews.csv";

/// JSON report written by `analyze`
pub const DEFAULT_REPORT: &str = "dados_processados.json";

/// JSON report written by `consolidate`
pub const DEFAULT_CONSOLIDATED: &str = "dados_consolidados.json";

/// Gephi node table
pub const DEFAULT_GEPHI_NODES: &str = "gephi_nodes.csv";

/// Gephi edge table
pub const DEFAULT_GEPHI_EDGES: &str = "gephi_edges.csv";

/// Steam review languages that are collected by default, in collection order
pub fn default_languages() -> Vec<String> {
    ["brazilian", "english", "spanish"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Configuration of the `collect` stage
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectConfig {
    /// Steam application identifier
    pub app_id: u64,

    /// Steam review languages, in collection order
    pub languages: Box<[Box<str>]>,

    /// Output review table
    pub output: PathBuf,

    /// How failed page requests are retried
    pub retry: RetryPolicy,
}
//
impl CollectConfig {
    /// Set up the collection configuration
    pub fn new(app_id: u64, languages: Vec<String>, output: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            app_id,
            languages: languages
                .into_iter()
                .map(|language| language.trim().to_lowercase().into())
                .collect(),
            output,
            retry: RetryPolicy::default(),
        })
    }
}

/// Configuration of the `analyze` stage
#[derive(Clone, Debug)]
pub struct AnalyzeConfig {
    /// Review table
    pub input: PathBuf,

    /// Review table to be used if `input` does not exist
    pub fallback: PathBuf,

    /// Output JSON report
    pub output: PathBuf,

    /// Keyword lists and stopwords
    pub lexicon: Lexicon,

    /// Number of top bigrams/trigrams to be reported
    pub top_ngrams: NonZeroUsize,
}
//
impl AnalyzeConfig {
    /// Set up the analysis configuration
    pub fn new(
        input: PathBuf,
        fallback: PathBuf,
        output: PathBuf,
        lexicon: Lexicon,
        top_ngrams: NonZeroUsize,
    ) -> Arc<Self> {
        Arc::new(Self {
            input,
            fallback,
            output,
            lexicon,
            top_ngrams,
        })
    }
}

/// Configuration of the `consolidate` stage
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsolidateConfig {
    /// JSON report from the `analyze` stage
    pub processed: PathBuf,

    /// Optional JSON file overriding the built-in storefront summaries
    pub platforms: Option<PathBuf>,

    /// Output JSON report
    pub output: PathBuf,
}
//
impl ConsolidateConfig {
    /// Set up the consolidation configuration
    pub fn new(processed: PathBuf, platforms: Option<PathBuf>, output: PathBuf) -> Self {
        Self {
            processed,
            platforms,
            output,
        }
    }
}

/// Configuration of the `gephi` stage
#[derive(Clone, Debug)]
pub struct GephiConfig {
    /// Review table
    pub input: PathBuf,

    /// Review table to be used if `input` does not exist
    pub fallback: PathBuf,

    /// Keyword lists whose network concepts become graph nodes
    pub lexicon: Lexicon,

    /// Output node table
    pub nodes: PathBuf,

    /// Output edge table
    pub edges: PathBuf,
}
//
impl GephiConfig {
    /// Set up the Gephi export configuration
    pub fn new(
        input: PathBuf,
        fallback: PathBuf,
        lexicon: Lexicon,
        nodes: PathBuf,
        edges: PathBuf,
    ) -> Self {
        Self {
            input,
            fallback,
            lexicon,
            nodes,
            edges,
        }
    }
}
