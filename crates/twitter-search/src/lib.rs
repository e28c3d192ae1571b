//! Twitter v2 recent-search client surface
//!
//! Wire model for the recent-search endpoint, the pluggable `SearchFetcher`
//! strategy trait, and classification of remote failures into the
//! auth / rate-limited / transient taxonomy the collector's fallback loop
//! acts on.
//!
//! Two interchangeable fetchers implement the trait: `HttpFetcher` talks to
//! the real API over reqwest, `MockFetcher` serves a deterministic corpus
//! for tests and offline runs. Which one a process uses is a configuration
//! decision, not a code change.

pub mod error;
pub mod fetcher;
pub mod mock;
pub mod model;

pub use error::{FetchError, classify_status, reset_after};
pub use fetcher::{HttpFetcher, RECENT_SEARCH_URL, SearchFetcher};
pub use mock::MockFetcher;
pub use model::{ApiUser, Page, SearchResponse, Tweet, TweetMetrics};
