//! Paginated collection of reviews, with retries
//!
//! Review APIs hand out reviews one page at a time, along with an opaque
//! cursor pointing to the next page. Pages are requested strictly one after
//! another, and each page request is retried a bounded number of times before
//! the collection of the current language is abandoned.

use crate::{
    progress::{ProgressConfig, ProgressReport, Work},
    review::Review,
    table, Result,
};
use futures::{stream, Stream, StreamExt};
use std::{fmt, future::Future, pin::pin, time::Duration};

/// Opaque pagination cursor
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Cursor(Box<str>);
//
impl Cursor {
    /// Cursor pointing to the beginning of the review list
    pub fn start() -> Self {
        Self("*".into())
    }

    /// Wrap a cursor received from the API, if it is not blank
    pub fn new(cursor: impl Into<Box<str>>) -> Option<Self> {
        let cursor = cursor.into();
        (!cursor.is_empty()).then_some(Self(cursor))
    }

    /// Cursor as sent to the API
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
//
impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Steam cursors are long base64 blobs, a prefix identifies them enough
        let prefix = self.0.char_indices().nth(20).map_or(&*self.0, |(end, _)| &self.0[..end]);
        write!(f, "{prefix}")
    }
}

/// Page of reviews
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Page {
    /// Reviews from this page
    ///
    /// `None` means that the API did not send any review list at all.
    pub reviews: Option<Vec<Review>>,

    /// Cursor pointing to the next page, if any
    pub next: Option<Cursor>,

    /// Total number of reviews for this language, if the API announced it
    pub total_hint: Option<u64>,
}

/// Outcome of a single page request
#[derive(Debug)]
pub enum Attempt {
    /// Page was received
    Page(Page),

    /// Server asked us to slow down
    RateLimited,

    /// Any other failure, which may go away if the request is retried
    Failed(anyhow::Error),
}

/// Remote source of review pages
pub trait PageSource {
    /// Request the page of reviews at some cursor, once
    fn request(&self, language: &str, cursor: &Cursor) -> impl Future<Output = Attempt>;
}

/// How failed page requests are retried
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RetryPolicy {
    /// Number of requests made for a page before giving up
    pub max_attempts: u32,

    /// Delay before the first retry after being rate limited, doubled on each
    /// subsequent attempt
    pub rate_limit_backoff: Duration,

    /// Delay before retrying after any other failure
    pub retry_delay: Duration,
}
//
impl RetryPolicy {
    /// Delay to be observed after being rate limited on some attempt (from 0)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.rate_limit_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}
//
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            rate_limit_backoff: Duration::from_secs(5),
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Fetch the page at some cursor, retrying as the policy allows
pub async fn fetch_page(
    source: &impl PageSource,
    policy: &RetryPolicy,
    language: &str,
    cursor: &Cursor,
) -> Result<Page> {
    for attempt in 0..policy.max_attempts {
        match source.request(language, cursor).await {
            Attempt::Page(page) => return Ok(page),
            Attempt::RateLimited => {
                let wait = policy.backoff(attempt);
                log::warn!("Rate limited while fetching {language} reviews, retrying in {wait:?}");
                tokio::time::sleep(wait).await;
            }
            Attempt::Failed(e) => {
                log::warn!(
                    "Failed to fetch {language} reviews at cursor {cursor} (attempt {}/{}): {e:#}",
                    attempt + 1,
                    policy.max_attempts
                );
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
        }
    }
    anyhow::bail!(
        "giving up on {language} reviews at cursor {cursor} after {} attempts",
        policy.max_attempts
    )
}

/// Lazily fetch all pages of reviews in some language
///
/// The stream ends after the first page that has no review, has no next
/// cursor, or points back to its own cursor (some APIs repeat the last page
/// instead of signaling the end of the list). It also ends after yielding an
/// error, if a page could not be fetched.
pub fn pages<'a>(
    source: &'a impl PageSource,
    policy: &'a RetryPolicy,
    language: &'a str,
) -> impl Stream<Item = Result<Page>> + 'a {
    stream::unfold(Some(Cursor::start()), move |cursor| async move {
        let cursor = cursor?;
        let page = match fetch_page(source, policy, language, &cursor).await {
            Ok(page) => page,
            Err(e) => return Some((Err(e), None)),
        };
        match &page.reviews {
            None => {
                log::warn!("No review list in {language} page at cursor {cursor}, stopping");
                return None;
            }
            Some(reviews) if reviews.is_empty() => {
                log::debug!("No more {language} reviews after cursor {cursor}");
                return None;
            }
            Some(_) => {}
        }
        let next = page.next.clone().filter(|next| *next != cursor);
        if next.is_none() {
            log::debug!("Reached the last page of {language} reviews");
        }
        Some((Ok(page), next))
    })
}

/// Collect the reviews of every language, then remove duplicates
///
/// Languages are collected in order. A language whose pages cannot be fetched
/// anymore keeps the reviews collected so far, and collection moves on to the
/// next language.
pub async fn collect_reviews(
    source: &impl PageSource,
    policy: &RetryPolicy,
    languages: &[Box<str>],
    report: &ProgressReport,
) -> Vec<Review> {
    let language_progress = report.add(
        "Collecting languages",
        ProgressConfig::new(Work::Steps(languages.len())).dont_show_rate(),
    );
    let mut all_reviews = Vec::new();
    for language in languages {
        log::info!("Collecting {language} reviews");
        let review_progress = report.add(
            format!("Fetching {language} reviews"),
            ProgressConfig::new(Work::Unknown),
        );
        let mut num_reviews = 0;
        let mut page_stream = pin!(pages(source, policy, language));
        while let Some(page) = page_stream.next().await {
            match page {
                Ok(page) => {
                    if let Some(total) = page.total_hint.filter(|_| num_reviews == 0) {
                        review_progress.set_work(total);
                    }
                    let reviews = page.reviews.unwrap_or_default();
                    num_reviews += reviews.len();
                    review_progress.make_progress(reviews.len() as u64);
                    all_reviews.extend(reviews);
                }
                Err(e) => {
                    log::error!("Moving on to the next language: {e:#}");
                    break;
                }
            }
        }
        review_progress.finish();
        language_progress.make_progress(1);
        log::info!("Collected {num_reviews} {language} reviews");
    }
    language_progress.finish();

    let num_collected = all_reviews.len();
    let reviews = table::dedup(all_reviews);
    log::info!(
        "Collected {} unique reviews ({} duplicates dropped)",
        reviews.len(),
        num_collected - reviews.len()
    );
    reviews
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::DateTime;
    use std::{
        collections::{HashMap, VecDeque},
        sync::Mutex,
    };

    /// Page source that replays scripted answers and records requests
    #[derive(Debug, Default)]
    pub struct ScriptedSource {
        /// Remaining answers, per language
        answers: Mutex<HashMap<Box<str>, VecDeque<Attempt>>>,

        /// Requests received so far, as (language, cursor)
        pub requests: Mutex<Vec<(Box<str>, Box<str>)>>,
    }
    //
    impl ScriptedSource {
        pub fn script(self, language: &str, answers: impl IntoIterator<Item = Attempt>) -> Self {
            self.answers
                .lock()
                .unwrap()
                .entry(language.into())
                .or_default()
                .extend(answers);
            self
        }

        pub fn num_requests(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }
    //
    impl PageSource for ScriptedSource {
        async fn request(&self, language: &str, cursor: &Cursor) -> Attempt {
            self.requests
                .lock()
                .unwrap()
                .push((language.into(), cursor.as_str().into()));
            self.answers
                .lock()
                .unwrap()
                .get_mut(language)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Attempt::Failed(anyhow::format_err!("script exhausted")))
        }
    }

    pub fn no_wait() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            rate_limit_backoff: Duration::ZERO,
            retry_delay: Duration::ZERO,
        }
    }

    pub fn review(text: &str, secs: i64) -> Review {
        Review {
            text: text.into(),
            created_at: DateTime::from_timestamp(secs, 0),
            ..Review::default()
        }
    }

    pub fn page(texts: &[&str], next: &str) -> Attempt {
        Attempt::Page(Page {
            reviews: Some(texts.iter().map(|text| review(text, 0)).collect()),
            next: Cursor::new(next),
            total_hint: None,
        })
    }

    fn texts(reviews: &[Review]) -> Vec<&str> {
        reviews.iter().map(|review| &*review.text).collect()
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(5));
        assert_eq!(policy.backoff(1), Duration::from_secs(10));
        assert_eq!(policy.backoff(3), Duration::from_secs(40));
    }

    #[test]
    fn cursor_display_is_truncated() {
        let cursor = Cursor::new("AoJwjqzh6PcCfLCuoQM=AoJwjqzh6PcCfLCuoQM=").unwrap();
        assert_eq!(cursor.to_string(), "AoJwjqzh6PcCfLCuoQM=");
        assert_eq!(Cursor::new(""), None);
    }

    #[tokio::test]
    async fn follows_cursors_until_empty_page() {
        let source = ScriptedSource::default().script(
            "english",
            [page(&["a", "b"], "c1"), page(&["c"], "c2"), page(&[], "c3")],
        );
        let reviews = collect_reviews(&source, &no_wait(), &["english".into()], &ProgressReport::new()).await;
        assert_eq!(texts(&reviews), ["a", "b", "c"]);
        let requests = source.requests.lock().unwrap();
        let cursors = requests.iter().map(|(_, cursor)| &**cursor).collect::<Vec<_>>();
        assert_eq!(cursors, ["*", "c1", "c2"]);
    }

    #[tokio::test]
    async fn repeated_cursor_terminates() {
        // Without the cursor check, this API would be polled forever
        let source = ScriptedSource::default().script(
            "english",
            [page(&["a"], "same"), page(&["b"], "same"), page(&["b"], "same")],
        );
        let reviews = collect_reviews(&source, &no_wait(), &["english".into()], &ProgressReport::new()).await;
        assert_eq!(texts(&reviews), ["a", "b"]);
        assert_eq!(source.num_requests(), 2);
    }

    #[tokio::test]
    async fn missing_cursor_terminates() {
        let source = ScriptedSource::default().script("english", [page(&["a"], "")]);
        let reviews = collect_reviews(&source, &no_wait(), &["english".into()], &ProgressReport::new()).await;
        assert_eq!(texts(&reviews), ["a"]);
        assert_eq!(source.num_requests(), 1);
    }

    #[tokio::test]
    async fn retries_rate_limits_and_failures() {
        let source = ScriptedSource::default().script(
            "english",
            [
                Attempt::RateLimited,
                Attempt::Failed(anyhow::format_err!("connection reset")),
                page(&["a"], ""),
            ],
        );
        let page = fetch_page(&source, &no_wait(), "english", &Cursor::start()).await.unwrap();
        assert_eq!(page.reviews.map(|r| r.len()), Some(1));
        assert_eq!(source.num_requests(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_only_halt_one_language() {
        let source = ScriptedSource::default()
            .script(
                "brazilian",
                [
                    page(&["um"], "next"),
                    Attempt::RateLimited,
                    Attempt::RateLimited,
                    Attempt::RateLimited,
                    page(&["never reached"], ""),
                ],
            )
            .script("english", [page(&["one"], "")]);
        let languages = ["brazilian".into(), "english".into()];
        let reviews = collect_reviews(&source, &no_wait(), &languages, &ProgressReport::new()).await;
        assert_eq!(texts(&reviews), ["um", "one"]);
        assert_eq!(source.num_requests(), 1 + 3 + 1);
    }

    #[tokio::test]
    async fn duplicates_across_languages_are_dropped() {
        let source = ScriptedSource::default()
            .script("brazilian", [page(&["shared", "pt"], "")])
            .script("english", [page(&["shared", "en"], "")]);
        let languages = ["brazilian".into(), "english".into()];
        let reviews = collect_reviews(&source, &no_wait(), &languages, &ProgressReport::new()).await;
        assert_eq!(texts(&reviews), ["shared", "pt", "en"]);
    }
}
