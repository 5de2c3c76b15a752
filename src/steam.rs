//! Steam store review API
//!
//! See <https://partner.steamgames.com/doc/store/getreviews> for the general
//! documentation of this API.

use crate::{
    fetch::{Attempt, Cursor, Page, PageSource},
    review::Review,
    Result,
};
use anyhow::Context;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Number of reviews requested per page (the API maximum)
const REVIEWS_PER_PAGE: u32 = 100;

/// Time after which a page request is considered to have failed
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the reviews of one Steam application
#[derive(Clone, Debug)]
pub struct SteamClient {
    /// Underlying HTTP client
    client: reqwest::Client,

    /// Review endpoint of the application
    url: Box<str>,
}
//
impl SteamClient {
    /// Set up a client for the reviews of some Steam application
    pub fn new(app_id: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("setting up the HTTP client")?;
        Ok(Self {
            client,
            url: format!("https://store.steampowered.com/appreviews/{app_id}").into(),
        })
    }

    /// Request a page of reviews and decode it
    async fn try_request(&self, language: &str, cursor: &Cursor) -> Result<Attempt> {
        let per_page = REVIEWS_PER_PAGE.to_string();
        let response = self
            .client
            .get(&*self.url)
            .query(&[
                ("json", "1"),
                ("filter", "all"),
                ("language", language),
                // Largest possible range, so that no review is left out
                ("day_range", "9223372036854775807"),
                ("review_type", "all"),
                ("purchase_type", "all"),
                ("num_per_page", per_page.as_str()),
                ("cursor", cursor.as_str()),
            ])
            .send()
            .await
            .context("sending the review request")?;
        if let Err(attempt) = classify(response.status()) {
            return Ok(attempt);
        }
        let body = response
            .json::<ReviewsResponse>()
            .await
            .context("decoding the review page")?;
        Ok(Attempt::Page(body.into()))
    }
}
//
impl PageSource for SteamClient {
    async fn request(&self, language: &str, cursor: &Cursor) -> Attempt {
        log::debug!("Requesting {language} reviews at cursor {cursor}");
        self.try_request(language, cursor)
            .await
            .unwrap_or_else(Attempt::Failed)
    }
}

/// Tell whether a response with some status carries a page of reviews, and if
/// not, what kind of failure occured
fn classify(status: StatusCode) -> std::result::Result<(), Attempt> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::TOO_MANY_REQUESTS => Err(Attempt::RateLimited),
        other => Err(Attempt::Failed(anyhow::format_err!(
            "review API answered with status {other}"
        ))),
    }
}

/// Page of reviews, as sent by the API
#[derive(Clone, Debug, Deserialize, PartialEq)]
struct ReviewsResponse {
    /// Summary of the query, only sent along with the first page
    #[serde(default)]
    query_summary: Option<QuerySummary>,

    /// Reviews from this page
    #[serde(default)]
    reviews: Option<Vec<SteamReview>>,

    /// Cursor pointing to the next page
    #[serde(default)]
    cursor: Option<Box<str>>,
}
//
impl From<ReviewsResponse> for Page {
    fn from(response: ReviewsResponse) -> Self {
        Self {
            reviews: response
                .reviews
                .map(|reviews| reviews.into_iter().map(Review::from).collect()),
            next: response.cursor.and_then(Cursor::new),
            total_hint: response.query_summary.and_then(|summary| summary.total_reviews),
        }
    }
}

/// Query summary, as sent by the API
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
struct QuerySummary {
    /// Total number of reviews matching the query
    #[serde(default)]
    total_reviews: Option<u64>,
}

/// Review, as sent by the API
#[derive(Clone, Debug, Deserialize, PartialEq)]
struct SteamReview {
    author: Author,
    language: Box<str>,
    review: Box<str>,
    voted_up: bool,
    votes_up: u64,
    /// Unix timestamp
    timestamp_created: i64,
}
//
impl From<SteamReview> for Review {
    fn from(review: SteamReview) -> Self {
        Self {
            playtime_minutes: review.author.playtime_forever,
            language: review.language,
            text: review.review,
            recommended: review.voted_up,
            helpful_votes: review.votes_up,
            created_at: DateTime::from_timestamp(review.timestamp_created, 0),
        }
    }
}

/// Review author, as sent by the API
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
struct Author {
    /// Lifetime playtime, in minutes
    #[serde(default)]
    playtime_forever: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_page() {
        let json = r#"{
            "success": 1,
            "query_summary": {"num_reviews": 1, "review_score": 8, "total_reviews": 348},
            "reviews": [{
                "recommendationid": "1",
                "author": {"steamid": "7", "playtime_forever": 612, "num_reviews": 3},
                "language": "brazilian",
                "review": "Que experiência sonora!",
                "timestamp_created": 1600000000,
                "voted_up": true,
                "votes_up": 4
            }],
            "cursor": "AoJ4+ZGe1/UCeNk="
        }"#;
        let page = Page::from(serde_json::from_str::<ReviewsResponse>(json).unwrap());
        assert_eq!(page.total_hint, Some(348));
        assert_eq!(page.next, Cursor::new("AoJ4+ZGe1/UCeNk="));
        assert_eq!(
            page.reviews,
            Some(vec![Review {
                playtime_minutes: 612,
                language: "brazilian".into(),
                text: "Que experiência sonora!".into(),
                recommended: true,
                helpful_votes: 4,
                created_at: DateTime::from_timestamp(1_600_000_000, 0),
            }])
        );
    }

    #[test]
    fn status_classification() {
        assert!(classify(StatusCode::OK).is_ok());
        assert!(matches!(
            classify(StatusCode::TOO_MANY_REQUESTS),
            Err(Attempt::RateLimited)
        ));
        for status in [
            StatusCode::NO_CONTENT,
            StatusCode::FORBIDDEN,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            match classify(status) {
                Err(Attempt::Failed(e)) => assert!(e.to_string().contains(status.as_str())),
                other => panic!("{status} was classified as {other:?}"),
            }
        }
    }

    #[test]
    fn decode_exhausted_listing() {
        let page = Page::from(
            serde_json::from_str::<ReviewsResponse>(r#"{"success": 1, "reviews": [], "cursor": ""}"#)
                .unwrap(),
        );
        assert_eq!(page.reviews, Some(Vec::new()));
        assert_eq!(page.next, None);

        let page = Page::from(serde_json::from_str::<ReviewsResponse>(r#"{"success": 2}"#).unwrap());
        assert_eq!(page.reviews, None);
    }
}
