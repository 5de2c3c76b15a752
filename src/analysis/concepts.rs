//! Keyword-based concept detection
//!
//! Concepts are detected by case-insensitive substring matching of their
//! terms. Note that concept frequencies and aspect opinions do not count at the
//! same granularity: frequencies count every term occurence across the whole
//! corpus, whereas opinions count reviews that mention an aspect at least once.
//! Existing reports rely on both behaviors.

use super::{display_name, lowercased_texts};
use crate::{lexicon::ConceptMap, table::Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maximal number of concepts in a frequency report
pub const MAX_CONCEPTS: usize = 10;

/// Score of an aspect that no review mentions
pub const NEUTRAL_SCORE: u8 = 50;

/// Frequency of a concept
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ConceptCount {
    /// Human-readable concept name
    pub name: Box<str>,

    /// Number of term occurences
    pub count: usize,
}

/// Truth that a lowercased text mentions one of the terms of a concept
pub fn mentions(text: &str, terms: &[Box<str>]) -> bool {
    terms.iter().any(|term| text.contains(&**term))
}

/// Number of non-overlapping occurences of the terms of a concept in a
/// lowercased text
pub fn occurences(text: &str, terms: &[Box<str>]) -> usize {
    terms.iter().map(|term| text.matches(&**term).count()).sum()
}

/// Most frequent concepts across all reviews
///
/// Review texts are joined by spaces and every occurence of every term is
/// counted, so a review that repeats a term counts several times. Concepts
/// that never occur are left out, and ties keep the concept map's order.
pub fn concept_frequencies(table: &Table, concepts: &ConceptMap) -> Vec<ConceptCount> {
    let Some(texts) = lowercased_texts(table) else {
        return Vec::new();
    };
    let corpus = texts.join(" ");
    let mut frequencies = concepts
        .iter()
        .map(|(name, terms)| (name, occurences(&corpus, terms)))
        .filter(|&(_, count)| count > 0)
        .collect::<Vec<_>>();
    frequencies.sort_by(|(_, count1), (_, count2)| count2.cmp(count1));
    frequencies
        .into_iter()
        .take(MAX_CONCEPTS)
        .map(|(name, count)| ConceptCount {
            name: display_name(name).into(),
            count,
        })
        .collect()
}

/// Percentage of positive reviews among the reviews mentioning each aspect
///
/// Aspects that no review mentions get a neutral score. Empty if the table
/// lacks review texts or recommendation flags.
pub fn aspect_opinions(table: &Table, aspects: &ConceptMap) -> IndexMap<Box<str>, u8> {
    if !table.columns.recommended {
        return IndexMap::new();
    }
    let Some(texts) = lowercased_texts(table) else {
        return IndexMap::new();
    };
    aspects
        .iter()
        .map(|(aspect, terms)| {
            let (num_mentions, num_positive) = texts
                .iter()
                .zip(&table.reviews)
                .filter(|(text, _)| mentions(text, terms))
                .fold((0usize, 0usize), |(seen, positive), (_, review)| {
                    (seen + 1, positive + usize::from(review.recommended))
                });
            let score = if num_mentions == 0 {
                NEUTRAL_SCORE
            } else {
                (num_positive as f64 / num_mentions as f64 * 100.0).round() as u8
            };
            log::debug!("Aspect {aspect:?} is mentioned by {num_mentions} reviews, {num_positive} positive");
            (aspect.clone(), score)
        })
        .collect()
}
