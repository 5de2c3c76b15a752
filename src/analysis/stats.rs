//! General review statistics

use crate::table::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// General statistics about a review table
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statistics {
    /// Number of reviews
    pub total_reviews: usize,

    /// Number of reviews recommending the game
    pub positive_reviews: usize,

    /// Number of other reviews
    pub negative_reviews: usize,

    /// Mean author playtime in hours, rounded to 2 decimals
    pub avg_playtime: f64,

    /// Number of reviews per language, most common language first
    pub languages: IndexMap<Box<str>, usize>,
}

/// Compute general statistics
///
/// Statistics that depend on a column which the table does not have are
/// reported as zero (or empty).
pub fn statistics(table: &Table) -> Statistics {
    let reviews = &table.reviews;
    let total_reviews = reviews.len();
    let positive_reviews = if table.columns.recommended {
        reviews.iter().filter(|review| review.recommended).count()
    } else {
        0
    };
    let avg_playtime = if table.columns.playtime && total_reviews > 0 {
        let total_minutes = reviews.iter().map(|review| review.playtime_minutes as f64).sum::<f64>();
        (total_minutes / total_reviews as f64 / 60.0 * 100.0).round() / 100.0
    } else {
        0.0
    };
    let mut languages = IndexMap::<Box<str>, usize>::new();
    if table.columns.language {
        for review in reviews {
            *languages.entry(review.language.clone()).or_default() += 1;
        }
        // Stable sort, so equally common languages stay in order of appearance
        languages.sort_by(|_, count1, _, count2| count2.cmp(count1));
    }
    Statistics {
        total_reviews,
        positive_reviews,
        negative_reviews: total_reviews - positive_reviews,
        avg_playtime,
        languages,
    }
}

/// Number of reviews per author playtime bracket
///
/// Brackets are `0-2h`, `2-5h`, `5-10h` and `10+h`, each upper bound being
/// included in its bracket. Empty if the table has no playtime column.
pub fn playtime_distribution(table: &Table) -> IndexMap<Box<str>, usize> {
    if !table.columns.playtime {
        return IndexMap::new();
    }
    const BRACKETS: [(&str, u64); 3] = [("0-2h", 2), ("2-5h", 5), ("5-10h", 10)];
    let mut distribution = BRACKETS
        .iter()
        .map(|&(name, _)| (name.into(), 0))
        .chain(std::iter::once(("10+h".into(), 0)))
        .collect::<IndexMap<Box<str>, usize>>();
    for review in &table.reviews {
        let bracket = BRACKETS
            .iter()
            .position(|&(_, max_hours)| review.playtime_minutes <= max_hours * 60)
            .unwrap_or(BRACKETS.len());
        distribution[bracket] += 1;
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::tests::table, review::Review};
    use pretty_assertions::assert_eq;

    #[test]
    fn statistics_and_languages() {
        let mut table = table(&[("a", true, 60), ("b", false, 0), ("c", true, 0), ("d", true, 0)]);
        for (review, language) in table.reviews.iter_mut().zip(["spanish", "english", "brazilian", "english"]) {
            review.language = language.into();
        }
        let stats = statistics(&table);
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.positive_reviews, 3);
        assert_eq!(stats.negative_reviews, 1);
        assert_eq!(stats.avg_playtime, 0.25);
        let languages = stats.languages.iter().map(|(l, n)| (&**l, *n)).collect::<Vec<_>>();
        assert_eq!(languages, [("english", 2), ("spanish", 1), ("brazilian", 1)]);
    }

    #[test]
    fn missing_columns() {
        let mut table = table(&[("a", true, 600)]);
        table.columns.recommended = false;
        table.columns.playtime = false;
        table.columns.language = false;
        let stats = statistics(&table);
        assert_eq!(stats.positive_reviews, 0);
        assert_eq!(stats.negative_reviews, 1);
        assert_eq!(stats.avg_playtime, 0.0);
        assert!(stats.languages.is_empty());
        assert!(playtime_distribution(&table).is_empty());

        let empty = Table::from_reviews(Vec::<Review>::new());
        assert_eq!(statistics(&empty).avg_playtime, 0.0);
    }

    #[test]
    fn playtime_brackets() {
        let table = table(&[
            ("a", true, 0),
            ("b", true, 120),
            ("c", true, 121),
            ("d", true, 300),
            ("e", true, 600),
            ("f", true, 601),
            ("g", true, 10_000),
        ]);
        let distribution = playtime_distribution(&table);
        let distribution = distribution.iter().map(|(b, n)| (&**b, *n)).collect::<Vec<_>>();
        assert_eq!(distribution, [("0-2h", 2), ("2-5h", 2), ("5-10h", 1), ("10+h", 2)]);
    }
}
