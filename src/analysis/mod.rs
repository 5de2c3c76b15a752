//! Digest of a review table into the JSON report read by the dashboard
//!
//! Every part of the report is a pure function of the review table, so running
//! the analysis twice on the same table yields the same report. JSON keys are
//! part of the dashboard's interface and must not change.

pub mod concepts;
pub mod cooccurrence;
pub mod ngrams;
pub mod stats;

use self::{
    concepts::ConceptCount, cooccurrence::Edge, ngrams::NgramCount, stats::Statistics,
};
use crate::{lexicon::Lexicon, table::Table, Result};
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{num::NonZeroUsize, path::Path};

/// Result of the analysis of a review table
///
/// Sections missing from a saved report, such as those written by older tools,
/// are loaded as empty.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AnalysisReport {
    /// General statistics
    pub estatisticas: Statistics,

    /// Number of reviews per author playtime bracket
    #[serde(rename = "playtimeDistribution")]
    pub playtime_distribution: IndexMap<Box<str>, usize>,

    /// Most frequently mentioned concepts
    pub concepts: Vec<ConceptCount>,

    /// Share of positive reviews among those mentioning each aspect, in %
    pub opinions: IndexMap<Box<str>, u8>,

    /// Most frequent word sequences
    pub ngramas: NgramReport,

    /// Concepts that are most often mentioned together
    pub coocorrencia: Vec<Edge>,
}
//
impl AnalysisReport {
    /// Analyze a review table
    pub fn compute(table: &Table, lexicon: &Lexicon, top_ngrams: NonZeroUsize) -> Self {
        let top_ngrams = top_ngrams.get();
        Self {
            estatisticas: stats::statistics(table),
            playtime_distribution: stats::playtime_distribution(table),
            concepts: concepts::concept_frequencies(table, &lexicon.concepts),
            opinions: concepts::aspect_opinions(table, &lexicon.aspects),
            ngramas: NgramReport {
                bigramas: ngrams::top_ngrams(table, &lexicon.stopwords, 2, top_ngrams),
                trigramas: ngrams::top_ngrams(table, &lexicon.stopwords, 3, top_ngrams),
            },
            coocorrencia: cooccurrence::top_edges(table, &lexicon.network),
        }
    }

    /// Save the report as pretty-printed JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("converting the report to JSON")?;
        tokio::fs::write(path, &json)
            .await
            .with_context(|| format!("saving the report to {}", path.display()))
    }

    /// Load a previously saved report
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let json = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Most frequent bigrams and trigrams
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct NgramReport {
    pub bigramas: Vec<NgramCount>,
    pub trigramas: Vec<NgramCount>,
}

/// Turn an identifier like "audio_espacial" into a label like "Audio Espacial"
///
/// Every letter that follows a non-letter is uppercased, other letters are
/// lowercased.
pub fn display_name(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut after_letter = false;
    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if !c.is_alphabetic() {
            label.push(c);
        } else if after_letter {
            label.extend(c.to_lowercase());
        } else {
            label.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    label
}

/// Lowercased text of every review, or nothing if there is no text column
fn lowercased_texts(table: &Table) -> Option<Vec<String>> {
    table.columns.text.then(|| {
        table
            .reviews
            .iter()
            .map(|review| review.text.to_lowercase())
            .collect()
    })
}
