//! Static summaries of the game's reception on storefronts other than Steam
//!
//! These storefronts offer no usable review API, so their ratings are recorded
//! by hand. The built-in data describes "The Vale: Shadow of the Crown" and can
//! be replaced by a JSON file with the same layout as [`Fixtures`], where
//! omitted sections keep their built-in value.
//!
//! Storefronts rate games on different scales, and each summary only carries
//! the fields that its storefront actually publishes, under the names that the
//! dashboard expects.

use crate::Result;
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Report identifier of the Steam section, which is computed from reviews
pub const STEAM_KEY: &str = "steam";

/// Description of the game
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameInfo {
    pub title: Box<str>,
    pub developer: Box<str>,
    pub publisher: Box<str>,
    pub release_date: Box<str>,
    pub genres: Box<[Box<str>]>,
}

/// Reception of the game on a storefront
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PlatformSummary {
    /// Human-readable storefront name
    pub plataforma: Box<str>,

    /// Press score per console, if the storefront aggregates press reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metascore: Option<IndexMap<Box<str>, u8>>,

    /// Average user score, out of 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_score: Option<f64>,

    /// Average number of stars, out of 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Number of press reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_critic_reviews: Option<u64>,

    /// Number of user reviews behind `user_score`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_user_reviews: Option<u64>,

    /// Number of user ratings behind `rating` or `recommended_percent`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<u64>,

    /// Percentage of players recommending the game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_percent: Option<f64>,

    /// Number of user ratings per star count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<IndexMap<Box<str>, u64>>,

    /// Selection of press reviews
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critic_reviews: Vec<CriticReview>,

    /// Selection of user reviews
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_reviews_sample: Vec<UserReview>,

    /// Recurring themes of the storefront's user reviews
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destacados: Vec<Box<str>>,
}
//
impl PlatformSummary {
    /// User rating on a 0-100 scale, along with the number of people behind it
    ///
    /// Recommendation percentages are preferred over star ratings, which are
    /// preferred over user scores. `None` if the storefront publishes no user
    /// rating with a known number of raters.
    pub fn weighted_rating(&self) -> Option<(f64, u64)> {
        if let (Some(percent), Some(raters)) = (self.recommended_percent, self.total_ratings) {
            Some((percent, raters))
        } else if let (Some(stars), Some(raters)) = (self.rating, self.total_ratings) {
            Some((stars * 20.0, raters))
        } else if let (Some(score), Some(raters)) = (self.user_score, self.total_user_reviews) {
            Some((score * 10.0, raters))
        } else {
            None
        }
    }

    /// Number of user reviews or ratings on this storefront
    pub fn num_reviews(&self) -> u64 {
        self.total_ratings
            .or(self.total_user_reviews)
            .unwrap_or(0)
    }
}

/// Press review excerpt
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CriticReview {
    pub source: Box<str>,
    pub score: u8,
    pub excerpt: Box<str>,
    pub sentiment: Box<str>,
}

/// User review excerpt
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserReview {
    pub score: u8,
    pub text: Box<str>,
    pub sentiment: Box<str>,
}

/// Strengths and weaknesses of the game, as a reader would summarize them
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Highlights {
    pub positive: Box<[Box<str>]>,
    pub areas_for_improvement: Box<[Box<str>]>,
}

/// Everything that the consolidated report does not compute from Steam data
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixtures {
    /// Description of the game
    pub game: GameInfo,

    /// Reception of the game on each storefront, keyed by report identifier
    pub platforms: IndexMap<Box<str>, PlatformSummary>,

    /// Overall assessment of the game's reception
    pub overall_sentiment: Box<str>,

    /// Strengths and weaknesses of the game
    pub highlights: Highlights,
}
//
impl Fixtures {
    /// Load storefront data from a JSON file, or use the built-in data
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading storefront data {}", path.display()))?;
        let fixtures = serde_json::from_slice::<Self>(&json)
            .with_context(|| format!("decoding storefront data {}", path.display()))?;
        anyhow::ensure!(
            !fixtures.platforms.contains_key(STEAM_KEY),
            "storefront data {} cannot override the {STEAM_KEY:?} section, which is computed from reviews",
            path.display()
        );
        log::info!("Using storefront data from {}", path.display());
        Ok(fixtures)
    }
}
//
impl Default for Fixtures {
    fn default() -> Self {
        let platforms = [
            (
                "metacritic",
                PlatformSummary {
                    plataforma: "Metacritic".into(),
                    metascore: Some(
                        [("pc", 82), ("xbox", 80), ("switch", 78)]
                            .into_iter()
                            .map(|(console, score)| (console.into(), score))
                            .collect(),
                    ),
                    user_score: Some(8.4),
                    total_critic_reviews: Some(15),
                    total_user_reviews: Some(47),
                    critic_reviews: [
                        ("Game Informer", 85, "A unique audio-only adventure that succeeds in creating an immersive world purely through sound design.", "positive"),
                        ("IGN", 80, "The Vale proves that accessibility and innovation can go hand in hand to create something truly special.", "positive"),
                        ("PC Gamer", 78, "An ambitious audio-first RPG that delivers on its promise of inclusive gaming.", "positive"),
                        ("GameSpot", 82, "A groundbreaking title that sets new standards for audio-based gameplay and accessibility.", "positive"),
                        ("Destructoid", 85, "The Vale is a triumph of audio design and storytelling.", "positive"),
                        ("Push Square", 75, "While the concept is innovative, the gameplay can feel repetitive at times.", "mixed"),
                    ]
                    .into_iter()
                    .map(|(source, score, excerpt, sentiment)| CriticReview {
                        source: source.into(),
                        score,
                        excerpt: excerpt.into(),
                        sentiment: sentiment.into(),
                    })
                    .collect(),
                    user_reviews_sample: [
                        (10, "As a visually impaired gamer, this is the first game I could play completely independently. Incredible experience!", "positive"),
                        (9, "Amazing audio design and compelling story. The combat system using only sound is revolutionary.", "positive"),
                        (8, "Great concept and execution. The 3D audio is phenomenal and the story kept me engaged throughout.", "positive"),
                        (7, "Interesting game but a bit short. Would love to see more content like this.", "positive"),
                        (5, "The idea is great but the gameplay becomes repetitive after a few hours.", "mixed"),
                    ]
                    .into_iter()
                    .map(|(score, text, sentiment)| UserReview {
                        score,
                        text: text.into(),
                        sentiment: sentiment.into(),
                    })
                    .collect(),
                    ..PlatformSummary::default()
                },
            ),
            (
                "xbox",
                PlatformSummary {
                    destacados: [
                        "Audio experience like no other",
                        "Perfect for visually impaired gamers",
                        "Innovative combat system",
                        "Compelling medieval story",
                    ]
                    .into_iter()
                    .map(Box::from)
                    .collect(),
                    ..store("Xbox", 4.5, 127, [89, 24, 8, 4, 2])
                },
            ),
            ("playstation", store("PlayStation", 4.6, 84, [62, 15, 4, 2, 1])),
            ("nintendo", store("Nintendo Switch", 4.3, 43, [28, 9, 4, 1, 1])),
            (
                "epic",
                PlatformSummary {
                    plataforma: "Epic Games Store".into(),
                    rating: Some(4.7),
                    total_ratings: Some(31),
                    recommended_percent: Some(94.0),
                    ..PlatformSummary::default()
                },
            ),
        ];
        Self {
            game: GameInfo {
                title: "The Vale: Shadow of the Crown".into(),
                developer: "Falling Squirrel".into(),
                publisher: "Falling Squirrel".into(),
                release_date: "2021-08-19".into(),
                genres: strings(&["Audio Adventure", "RPG", "Accessible Gaming"]),
            },
            platforms: platforms
                .into_iter()
                .map(|(key, summary)| (key.into(), summary))
                .collect(),
            overall_sentiment: "Overwhelmingly Positive".into(),
            highlights: Highlights {
                positive: strings(&[
                    "Experiência de áudio revolucionária",
                    "Acessibilidade exemplar para jogadores com deficiência visual",
                    "Narrativa envolvente e imersiva",
                    "Design de som espacial de alta qualidade",
                    "Combate inovador baseado puramente em áudio",
                ]),
                areas_for_improvement: strings(&[
                    "Duração do jogo poderia ser maior",
                    "Replay value limitado",
                    "Alguns momentos de gameplay repetitivo",
                ]),
            },
        }
    }
}

/// Summary of a console store, which rates games with 1 to 5 stars
///
/// The star breakdown lists rating counts from 5 stars down to 1 star.
fn store(name: &str, stars: f64, total_ratings: u64, breakdown: [u64; 5]) -> PlatformSummary {
    PlatformSummary {
        plataforma: name.into(),
        rating: Some(stars),
        total_ratings: Some(total_ratings),
        breakdown: Some(
            (1..=5)
                .rev()
                .zip(breakdown)
                .map(|(stars, count)| (format!("{stars}_stars").into(), count))
                .collect(),
        ),
        ..PlatformSummary::default()
    }
}

fn strings(strings: &[&str]) -> Box<[Box<str>]> {
    strings.iter().map(|&s| s.into()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rating_scales() {
        let platforms = Fixtures::default().platforms;
        let ratings = platforms
            .values()
            .map(|platform| platform.weighted_rating())
            .collect::<Vec<_>>();
        assert_eq!(
            ratings,
            [
                Some((84.0, 47)),
                Some((90.0, 127)),
                Some((4.6 * 20.0, 84)),
                Some((4.3 * 20.0, 43)),
                Some((94.0, 31)),
            ]
        );
        assert_eq!(platforms["metacritic"].num_reviews(), 47);
        assert_eq!(PlatformSummary::default().weighted_rating(), None);
        assert_eq!(PlatformSummary::default().num_reviews(), 0);
    }

    #[test]
    fn built_in_storefronts() {
        let fixtures = Fixtures::default();
        assert_eq!(
            fixtures.platforms.keys().map(|k| &**k).collect::<Vec<_>>(),
            ["metacritic", "xbox", "playstation", "nintendo", "epic"]
        );
        let xbox = &fixtures.platforms["xbox"];
        let breakdown = xbox.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.get("5_stars"), Some(&89));
        assert_eq!(breakdown.get("1_stars"), Some(&2));
        assert_eq!(Some(breakdown.values().sum::<u64>()), xbox.total_ratings);
    }

    #[test]
    fn serialized_storefront_keys() {
        let json = serde_json::to_value(&Fixtures::default().platforms).unwrap();
        let keys = |platform: &str| {
            json[platform]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect::<std::collections::BTreeSet<_>>()
        };
        let expected = |keys: &[&'static str]| keys.iter().copied().collect::<std::collections::BTreeSet<_>>();
        assert_eq!(
            keys("metacritic"),
            expected(&[
                "plataforma",
                "metascore",
                "user_score",
                "total_critic_reviews",
                "total_user_reviews",
                "critic_reviews",
                "user_reviews_sample",
            ])
        );
        assert_eq!(
            keys("xbox"),
            expected(&["plataforma", "rating", "total_ratings", "breakdown", "destacados"])
        );
        for store in ["playstation", "nintendo"] {
            assert_eq!(
                keys(store),
                expected(&["plataforma", "rating", "total_ratings", "breakdown"])
            );
        }
        assert_eq!(
            keys("epic"),
            expected(&["plataforma", "rating", "total_ratings", "recommended_percent"])
        );

        assert_eq!(json["xbox"]["rating"], 4.5);
        assert_eq!(json["epic"]["rating"], 4.7);
        assert_eq!(json["metacritic"]["user_score"], 8.4);
        assert_eq!(json["metacritic"]["critic_reviews"].as_array().unwrap().len(), 6);
        assert_eq!(json["metacritic"]["critic_reviews"][0]["source"], "Game Informer");
        assert_eq!(json["metacritic"]["user_reviews_sample"][4]["sentiment"], "mixed");
    }

    #[tokio::test]
    async fn partial_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platforms.json");
        tokio::fs::write(
            &path,
            r#"{"platforms": {"gog": {"plataforma": "GOG", "rating": 4.0, "total_ratings": 10}}}"#,
        )
        .await
        .unwrap();
        let fixtures = Fixtures::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(fixtures.platforms.len(), 1);
        assert_eq!(fixtures.platforms["gog"].weighted_rating(), Some((80.0, 10)));
        assert_eq!(fixtures.game, Fixtures::default().game);
    }

    #[tokio::test]
    async fn steam_cannot_be_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platforms.json");
        tokio::fs::write(
            &path,
            r#"{"platforms": {"steam": {"plataforma": "Steam", "rating": 1.0, "total_ratings": 1}}}"#,
        )
        .await
        .unwrap();
        let error = format!("{:#}", Fixtures::load_or_default(Some(&path)).await.unwrap_err());
        assert!(error.contains("\"steam\""), "{error}");
    }

    #[tokio::test]
    async fn unreadable_override() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Fixtures::load_or_default(Some(&dir.path().join("missing.json")))
            .await
            .is_err());
    }
}
