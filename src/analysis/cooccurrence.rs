//! Network of concepts that are mentioned together

use super::{concepts::mentions, display_name, lowercased_texts};
use crate::{lexicon::ConceptMap, table::Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Number of edges in the dashboard's co-occurrence report
pub const MAX_EDGES: usize = 15;

/// Pair of concepts mentioned together
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Edge {
    /// Human-readable name of the first concept
    pub source: Box<str>,

    /// Human-readable name of the second concept
    pub target: Box<str>,

    /// Number of reviews mentioning both concepts
    pub weight: usize,
}

/// Co-occurrence network of a set of concepts
///
/// Concepts are identified by their name in the concept map.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Network<'lexicon> {
    /// Number of reviews mentioning each concept, in order of first mention
    pub nodes: IndexMap<&'lexicon str, usize>,

    /// Number of reviews mentioning each pair of concepts, in order of first
    /// joint mention
    ///
    /// Pairs are ordered (first concept < second concept).
    pub edges: IndexMap<(&'lexicon str, &'lexicon str), usize>,
}
//
impl<'lexicon> Network<'lexicon> {
    /// Build the co-occurrence network of the reviews of a table
    ///
    /// Empty if the table has no review text.
    pub fn build(table: &Table, concepts: &'lexicon ConceptMap) -> Self {
        let mut network = Self::default();
        let Some(texts) = lowercased_texts(table) else {
            return network;
        };
        for text in &texts {
            let mut present = concepts
                .iter()
                .filter(|(_, terms)| mentions(text, terms))
                .map(|(name, _)| &**name)
                .collect::<Vec<_>>();
            present.sort_unstable();
            present.dedup();
            for (idx, &first) in present.iter().enumerate() {
                *network.nodes.entry(first).or_default() += 1;
                for &second in &present[idx + 1..] {
                    *network.edges.entry((first, second)).or_default() += 1;
                }
            }
        }
        network
    }

    /// Heaviest edges, ties being ordered by first joint mention
    pub fn top_edges(&self, max_edges: usize) -> Vec<Edge> {
        let mut edges = self.edges.iter().collect::<Vec<_>>();
        edges.sort_by(|(_, weight1), (_, weight2)| weight2.cmp(weight1));
        edges
            .into_iter()
            .take(max_edges)
            .map(|(&(source, target), &weight)| Edge {
                source: display_name(source).into(),
                target: display_name(target).into(),
                weight,
            })
            .collect()
    }
}

/// Heaviest edges of the co-occurrence network, as shown on the dashboard
pub fn top_edges(table: &Table, concepts: &ConceptMap) -> Vec<Edge> {
    Network::build(table, concepts).top_edges(MAX_EDGES)
}
