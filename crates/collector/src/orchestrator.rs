//! Collection orchestrator
//!
//! Entry point for one collection request: cache check, then the
//! credential fallback loop, then assembly and the cache write-back.
//! `collect` never returns an error: every transport-level failure is
//! absorbed into an empty result plus an `Outcome` the caller can inspect,
//! so route handlers never turn a flaky remote into a 500.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use twitter_search::SearchFetcher;

use crate::assemble::assemble;
use crate::cache::ResultCache;
use crate::config::CollectorConfig;
use crate::executor::RequestExecutor;
use crate::paginate::{PageError, collect_pages};
use crate::record::CanonicalRecord;
use token_pool::TokenPool;

/// One collection request.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    pub query: String,
    pub count: usize,
    pub use_cache: bool,
}

impl CollectRequest {
    /// Request with caching on. `count` is clamped to at least 1.
    pub fn new(query: impl Into<String>, count: usize) -> Self {
        Self {
            query: query.into(),
            count: count.max(1),
            use_cache: true,
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

/// How a collection terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Served from the current cache bucket, no network activity.
    CacheHit,
    /// Fetched live. `credential` is the ordinal that succeeded,
    /// `attempts` counts every credential tried including it.
    Fetched { credential: usize, attempts: usize },
    /// Every credential failed; records is empty. The warning signal for
    /// callers that want to fall back to stored data.
    Exhausted { attempts: usize },
    /// Cancelled at a batch or credential boundary; partials discarded.
    Cancelled,
}

/// A completed collection: always well-formed, possibly empty.
#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<CanonicalRecord>,
    pub outcome: Outcome,
}

/// Top-level collection client. Construct once, share by reference.
pub struct Collector {
    pool: TokenPool,
    cache: ResultCache,
    executor: RequestExecutor,
    page_cap: u32,
}

impl Collector {
    pub fn new(pool: TokenPool, fetcher: Arc<dyn SearchFetcher>, config: CollectorConfig) -> Self {
        let cache = ResultCache::new(config.cache_interval, config.cache_capacity);
        let executor = RequestExecutor::new(fetcher, config.executor_policy());
        Self {
            pool,
            cache,
            executor,
            page_cap: config.page_cap,
        }
    }

    /// Collect without external cancellation.
    pub async fn collect(&self, request: &CollectRequest) -> Collection {
        self.collect_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Collect, honoring `cancel` at pagination-batch and credential
    /// boundaries.
    pub async fn collect_cancellable(
        &self,
        request: &CollectRequest,
        cancel: &CancellationToken,
    ) -> Collection {
        if request.use_cache {
            if let Some(records) = self.cache.get(&request.query, request.count) {
                metrics::counter!("collector_cache_hits_total").increment(1);
                info!(query = %request.query, count = request.count, "cache hit");
                return Collection {
                    records,
                    outcome: Outcome::CacheHit,
                };
            }
        }

        let mut attempts = 0usize;
        for token in self.pool.candidates() {
            if cancel.is_cancelled() {
                info!(query = %request.query, "collection cancelled before next credential");
                return Collection {
                    records: Vec::new(),
                    outcome: Outcome::Cancelled,
                };
            }
            attempts += 1;

            match collect_pages(
                &self.executor,
                token,
                &request.query,
                request.count,
                self.page_cap,
                cancel,
            )
            .await
            {
                Ok((tweets, users)) => {
                    let records = assemble(tweets, &users);
                    if request.use_cache {
                        self.cache
                            .put(&request.query, request.count, records.clone());
                    }
                    info!(
                        query = %request.query,
                        records = records.len(),
                        credential = token.ordinal(),
                        attempts,
                        "collection complete"
                    );
                    return Collection {
                        records,
                        outcome: Outcome::Fetched {
                            credential: token.ordinal(),
                            attempts,
                        },
                    };
                }
                Err(PageError::Cancelled) => {
                    info!(query = %request.query, "collection cancelled mid-pagination");
                    return Collection {
                        records: Vec::new(),
                        outcome: Outcome::Cancelled,
                    };
                }
                Err(PageError::Fetch(err)) => {
                    metrics::counter!("collector_credential_failovers_total").increment(1);
                    warn!(
                        query = %request.query,
                        credential = token.ordinal(),
                        error = %err,
                        "credential attempt failed, advancing"
                    );
                }
            }
        }

        metrics::counter!("collector_exhaustions_total").increment(1);
        warn!(
            query = %request.query,
            attempts,
            "all credentials exhausted, returning empty result"
        );
        Collection {
            records: Vec::new(),
            outcome: Outcome::Exhausted { attempts },
        }
    }

    /// Configured credential count, for health reporting.
    pub fn credentials(&self) -> usize {
        self.pool.len()
    }

    /// Live cache entry count, for health reporting.
    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }
}
