//! Deterministic fetcher for tests and offline runs
//!
//! Serves pages out of a fixed in-memory corpus, with the cursor encoded as
//! a plain offset. Behaviors the collector tests need are scriptable:
//! tokens that always fail auth, a queue of one-shot failures served before
//! the corpus, an optional remote page-size cap smaller than what the
//! caller asks for, and a call counter for cache idempotence checks.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::Secret;

use crate::error::FetchError;
use crate::fetcher::SearchFetcher;
use crate::model::{ApiUser, Page, Tweet, TweetMetrics};

const SAMPLE_TEXTS: &[&str] = &[
    "can't sleep again, everything feels heavy #depression",
    "started counseling last month and it actually helps",
    "so anxious about tomorrow I can't think straight",
    "shoutout to my sister for listening all night, real support",
    "another empty day, going through the motions",
];

pub struct MockFetcher {
    tweets: Vec<Tweet>,
    users: HashMap<String, ApiUser>,
    page_size: Option<usize>,
    rejected_tokens: HashSet<String>,
    scripted: Mutex<VecDeque<FetchError>>,
    fail_on_call: Mutex<HashMap<usize, FetchError>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    /// Fetcher over an explicit corpus.
    pub fn new(tweets: Vec<Tweet>, users: Vec<ApiUser>) -> Self {
        Self {
            tweets,
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            page_size: None,
            rejected_tokens: HashSet::new(),
            scripted: Mutex::new(VecDeque::new()),
            fail_on_call: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Synthetic corpus of `count` tweets with stable ids, timestamps, and
    /// a small author set. Used when the service runs with the mock
    /// strategy selected in config.
    pub fn sample(count: usize) -> Self {
        let users: Vec<ApiUser> = (0..3)
            .map(|i| ApiUser {
                id: format!("u{i}"),
                username: format!("sample_user_{i}"),
                name: format!("Sample User {i}"),
            })
            .collect();
        let base = 1_700_000_000i64;
        let tweets = (0..count)
            .map(|i| Tweet {
                id: format!("{}", 1_750_000_000_000_000_000u64 + i as u64),
                text: SAMPLE_TEXTS[i % SAMPLE_TEXTS.len()].to_string(),
                created_at: DateTime::<Utc>::from_timestamp(base + i as i64 * 60, 0),
                author_id: Some(format!("u{}", i % 3)),
                conversation_id: None,
                public_metrics: TweetMetrics {
                    like_count: (i as u64 * 7) % 50,
                    retweet_count: (i as u64 * 3) % 20,
                    reply_count: 0,
                    quote_count: 0,
                },
            })
            .collect();
        Self::new(tweets, users)
    }

    /// Cap each served page at `n` items, regardless of `max_results`.
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = Some(n);
        self
    }

    /// Answer every call using this token with an auth rejection.
    pub fn reject_token(mut self, token: &str) -> Self {
        self.rejected_tokens.insert(token.to_string());
        self
    }

    /// Queue a one-shot failure served before the next corpus page.
    pub fn fail_next(self, err: FetchError) -> Self {
        self.scripted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(err);
        self
    }

    /// Fail the `n`-th call (1-based) with `err`, wherever it lands in a
    /// pagination run. One-shot.
    pub fn fail_on_call(self, n: usize, err: FetchError) -> Self {
        self.fail_on_call
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(n, err);
        self
    }

    /// Number of fetch_page calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SearchFetcher for MockFetcher {
    async fn fetch_page(
        &self,
        token: &Secret,
        _query: &str,
        max_results: u32,
        next_token: Option<&str>,
    ) -> Result<Page, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;

        if self.rejected_tokens.contains(token.expose()) {
            return Err(FetchError::Auth { status: 401 });
        }

        if let Some(err) = self
            .fail_on_call
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&call)
        {
            return Err(err);
        }

        if let Some(err) = self
            .scripted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
        {
            return Err(err);
        }

        let offset: usize = next_token
            .and_then(|c| c.parse().ok())
            .unwrap_or(0)
            .min(self.tweets.len());
        let remaining = self.tweets.len() - offset;
        let take = remaining
            .min(max_results as usize)
            .min(self.page_size.unwrap_or(usize::MAX));

        let tweets = self.tweets[offset..offset + take].to_vec();
        let end = offset + take;
        let next_token = (end < self.tweets.len()).then(|| end.to_string());

        Ok(Page {
            tweets,
            users: self.users.clone(),
            next_token,
        })
    }
}
