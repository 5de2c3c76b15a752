//! Most frequent word sequences across reviews

use super::lowercased_texts;
use crate::table::Table;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::OnceLock};

/// Occurences of an ngram
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct NgramCount {
    /// Words of the ngram, separated by spaces
    pub text: Box<str>,

    /// Number of occurences across all reviews
    pub value: usize,
}

/// Split a lowercased text into words
///
/// A word is a run of 3+ ASCII letters between word boundaries. Words that
/// contain other letters, such as accented ones, are skipped entirely.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b[a-z]{3,}\b").expect("word regex should be valid"))
        .find_iter(text)
        .map(|word| word.as_str())
}

/// Most frequent ngrams of `n` consecutive non-stopword words
///
/// Ngrams never span two reviews. Equally frequent ngrams are ordered by first
/// appearance. Empty if the table has no review text.
pub fn top_ngrams(
    table: &Table,
    stopwords: &HashSet<Box<str>>,
    n: usize,
    max_outputs: usize,
) -> Vec<NgramCount> {
    assert!(n > 0, "ngrams should contain at least one word");
    let Some(texts) = lowercased_texts(table) else {
        return Vec::new();
    };
    let mut counts = IndexMap::<Box<str>, usize>::new();
    for text in &texts {
        let words = words(text)
            .filter(|word| !stopwords.contains(*word))
            .collect::<Vec<_>>();
        for ngram in words.windows(n) {
            *counts.entry(ngram.join(" ").into()).or_default() += 1;
        }
    }
    // Stable sort, so that ties stay in order of first appearance
    counts.sort_by(|_, count1, _, count2| count2.cmp(count1));
    counts
        .into_iter()
        .take(max_outputs)
        .map(|(text, value)| NgramCount { text, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::tests::table, lexicon::Lexicon};
    use pretty_assertions::assert_eq;

    fn ngrams(texts: &[&str], n: usize, max_outputs: usize) -> Vec<(String, usize)> {
        let table = table(&texts.iter().map(|&text| (text, true, 0)).collect::<Vec<_>>());
        top_ngrams(&table, &Lexicon::default().stopwords, n, max_outputs)
            .into_iter()
            .map(|NgramCount { text, value }| (text.into(), value))
            .collect()
    }

    fn pairs(expected: &[(&str, usize)]) -> Vec<(String, usize)> {
        expected.iter().map(|&(text, value)| (text.to_owned(), value)).collect()
    }

    #[test]
    fn tokenization() {
        assert_eq!(
            words("it's a great 3d-audio adventure, ótima história legal").collect::<Vec<_>>(),
            ["great", "audio", "adventure", "legal"]
        );
    }

    #[test]
    fn stopwords_and_counts() {
        assert_eq!(
            ngrams(
                &["The spatial audio is great", "Spatial audio, really great audio"],
                2,
                10
            ),
            pairs(&[("spatial audio", 2), ("audio great", 2), ("great audio", 1)])
        );
    }

    #[test]
    fn no_ngram_across_reviews() {
        assert_eq!(
            ngrams(&["dark forest", "deep woods"], 2, 10),
            pairs(&[("dark forest", 1), ("deep woods", 1)])
        );
        assert!(ngrams(&["dark forest", "deep woods"], 3, 10).is_empty());
    }

    #[test]
    fn ties_keep_first_appearance() {
        assert_eq!(
            ngrams(&["zebra crossing", "apple tree", "apple tree", "zebra crossing", "last one"], 2, 2),
            pairs(&[("zebra crossing", 2), ("apple tree", 2)])
        );
    }

    #[test]
    fn trigrams() {
        assert_eq!(
            ngrams(&["blind players love blind players love"], 3, 10),
            pairs(&[("blind players love", 2), ("players love blind", 1), ("love blind players", 1)])
        );
    }
}
