//! Wire model for the v2 recent-search endpoint
//!
//! The response splits tweet rows from author metadata: `data` carries the
//! tweets, `includes.users` carries the side-table referenced by
//! `author_id` (requested via `expansions=author_id`), and `meta.next_token`
//! is the opaque pagination cursor. All of `data`, `includes`, and `meta`
//! are absent when a query matches nothing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Engagement counters attached to each tweet (`tweet.fields=public_metrics`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

/// One tweet row as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub author_id: Option<String>,
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub public_metrics: TweetMetrics,
}

/// Author metadata from the `includes.users` side-table.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<ApiUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMeta {
    pub next_token: Option<String>,
    pub result_count: Option<u64>,
}

/// Raw deserialized response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: Includes,
    #[serde(default)]
    pub meta: SearchMeta,
}

/// One page of results, with the author side-table already keyed by id.
///
/// This is what `SearchFetcher` implementations return: the pagination
/// engine only ever sees pages, never raw response bodies.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub tweets: Vec<Tweet>,
    pub users: HashMap<String, ApiUser>,
    pub next_token: Option<String>,
}

impl From<SearchResponse> for Page {
    fn from(response: SearchResponse) -> Self {
        let users = response
            .includes
            .users
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        Self {
            tweets: response.data,
            users,
            next_token: response.meta.next_token,
        }
    }
}
