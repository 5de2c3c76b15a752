//! Merge of the Steam report with the reception of the game on other storefronts

use crate::{
    analysis::{concepts::ConceptCount, AnalysisReport},
    config::ConsolidateConfig,
    platforms::{Fixtures, GameInfo, Highlights, PlatformSummary, STEAM_KEY},
    Result,
};
use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::ErrorKind;

/// Consolidated report, as read by the dashboard
#[derive(Debug, Serialize)]
pub struct ConsolidatedReport<'input> {
    game: &'input GameInfo,
    summary: Summary<'input>,
    platforms: IndexMap<&'input str, PlatformEntry<'input>>,
    key_topics: &'input [ConceptCount],
    aspect_ratings: &'input IndexMap<Box<str>, u8>,
    highlights: &'input Highlights,
}
//
impl<'input> ConsolidatedReport<'input> {
    /// Merge the Steam report with storefront data
    pub fn new(steam: &'input AnalysisReport, fixtures: &'input Fixtures) -> Self {
        let stats = &steam.estatisticas;
        let steam_rating = (stats.total_reviews > 0).then(|| {
            stats.positive_reviews as f64 / stats.total_reviews as f64 * 100.0
        });
        let ratings = steam_rating
            .map(|rating| (rating, stats.total_reviews as u64))
            .into_iter()
            .chain(fixtures.platforms.values().filter_map(PlatformSummary::weighted_rating));
        let total_reviews = stats.total_reviews as u64
            + fixtures
                .platforms
                .values()
                .map(PlatformSummary::num_reviews)
                .sum::<u64>();

        let mut platforms = IndexMap::with_capacity(fixtures.platforms.len() + 1);
        platforms.insert(
            STEAM_KEY,
            PlatformEntry::Steam {
                plataforma: "Steam",
                report: steam,
            },
        );
        platforms.extend(
            fixtures
                .platforms
                .iter()
                .map(|(key, platform)| (&**key, PlatformEntry::Other(platform))),
        );

        Self {
            game: &fixtures.game,
            summary: Summary {
                total_reviews,
                average_rating: weighted_rating(ratings),
                platforms_count: platforms.len(),
                overall_sentiment: &fixtures.overall_sentiment,
            },
            platforms,
            key_topics: &steam.concepts,
            aspect_ratings: &steam.opinions,
            highlights: &fixtures.highlights,
        }
    }
}

/// Headline figures of the consolidated report
#[derive(Debug, Serialize)]
struct Summary<'input> {
    /// Number of reviews and ratings across all platforms
    total_reviews: u64,

    /// Mean rating across all platforms on a 0-100 scale, rounded to 1 decimal
    average_rating: f64,

    /// Number of platforms, Steam included
    platforms_count: usize,

    overall_sentiment: &'input str,
}

/// Per-platform section of the consolidated report
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PlatformEntry<'input> {
    /// Steam section is the full analysis report, tagged with a platform name
    Steam {
        plataforma: &'static str,
        #[serde(flatten)]
        report: &'input AnalysisReport,
    },

    /// Other platforms are described by static summaries
    Other(&'input PlatformSummary),
}

/// Mean of 0-100 ratings, weighted by how many people gave them
///
/// Sources with zero weight are ignored. The result is rounded to 1 decimal,
/// or zero if there is no rating at all.
pub fn weighted_rating(ratings: impl IntoIterator<Item = (f64, u64)>) -> f64 {
    let (weighted_sum, total_weight) = ratings
        .into_iter()
        .filter(|&(_, weight)| weight > 0)
        .fold((0.0, 0u64), |(sum, total), (rating, weight)| {
            (sum + rating * weight as f64, total + weight)
        });
    if total_weight == 0 {
        return 0.0;
    }
    (weighted_sum / total_weight as f64 * 10.0).round() / 10.0
}

/// Load the Steam report and storefront data, merge them, save the result
pub async fn run(config: &ConsolidateConfig) -> Result<()> {
    let steam = match AnalysisReport::load(&config.processed).await {
        Ok(report) => report,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!(
                "Steam report {} not found, consolidating without Steam reviews",
                config.processed.display()
            );
            AnalysisReport::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("loading {}", config.processed.display()))
        }
    };
    log::info!("Steam: {} reviews", steam.estatisticas.total_reviews);
    let fixtures = Fixtures::load_or_default(config.platforms.as_deref()).await?;
    for platform in fixtures.platforms.values() {
        log::info!("{}: {} ratings", platform.plataforma, platform.num_reviews());
    }

    let report = ConsolidatedReport::new(&steam, &fixtures);
    let json = serde_json::to_vec_pretty(&report).context("converting the report to JSON")?;
    tokio::fs::write(&config.output, &json)
        .await
        .with_context(|| format!("saving the report to {}", config.output.display()))?;
    log::info!(
        "Saved {} reviews from {} platforms (average rating {:.1}%) to {}",
        report.summary.total_reviews,
        report.summary.platforms_count,
        report.summary.average_rating,
        config.output.display()
    );
    Ok(())
}
