//! Pagination engine
//!
//! Drives repeated executor calls with the opaque cursor until the desired
//! count is reached, the remote stops handing out cursors, or a batch comes
//! back empty. Accumulation is all-or-nothing per credential: any executor
//! error (or cancellation) discards everything gathered so far and
//! propagates, so the orchestrator never mixes partial state from two
//! credentials.

use std::collections::HashMap;

use thiserror::Error;
use token_pool::BearerToken;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use twitter_search::{ApiUser, FetchError, Tweet};

use crate::executor::RequestExecutor;

/// Remote per-call maximum for `max_results`.
pub const REMOTE_PAGE_CAP: u32 = 100;

/// Remote per-call minimum; smaller requests are rejected upstream, so the
/// engine clamps up and truncates the surplus locally.
pub const REMOTE_PAGE_MIN: u32 = 10;

/// Why a pagination run aborted.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("collection cancelled")]
    Cancelled,
}

/// Collect up to `desired_count` raw rows with one credential.
///
/// Cancellation is honored at batch boundaries only: an in-flight network
/// call is never interrupted mid-request, the check happens before each
/// batch is issued.
pub async fn collect_pages(
    executor: &RequestExecutor,
    token: &BearerToken,
    query: &str,
    desired_count: usize,
    page_cap: u32,
    cancel: &CancellationToken,
) -> Result<(Vec<Tweet>, HashMap<String, ApiUser>), PageError> {
    let page_cap = page_cap.clamp(1, REMOTE_PAGE_CAP);
    let mut tweets: Vec<Tweet> = Vec::new();
    let mut users: HashMap<String, ApiUser> = HashMap::new();
    let mut cursor: Option<String> = None;
    let mut batches = 0usize;

    while tweets.len() < desired_count {
        if cancel.is_cancelled() {
            return Err(PageError::Cancelled);
        }

        let remaining = desired_count - tweets.len();
        let batch_size = remaining
            .min(page_cap as usize)
            .max(REMOTE_PAGE_MIN as usize) as u32;

        let page = executor
            .execute(token, query, batch_size, cursor.as_deref())
            .await?;
        batches += 1;
        metrics::counter!("collector_pages_fetched_total").increment(1);

        let got = page.tweets.len();
        users.extend(page.users);
        tweets.extend(page.tweets);

        if got == 0 {
            debug!(batches, "empty batch, stopping");
            break;
        }
        match page.next_token {
            Some(next) => cursor = Some(next),
            None => {
                debug!(batches, collected = tweets.len(), "remote signaled end of data");
                break;
            }
        }
    }

    tweets.truncate(desired_count);
    debug!(
        credential = token.ordinal(),
        batches,
        collected = tweets.len(),
        "pagination complete"
    );
    Ok((tweets, users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorPolicy;
    use common::Secret;
    use std::sync::Arc;
    use token_pool::TokenPool;
    use twitter_search::MockFetcher;

    fn pool() -> TokenPool {
        TokenPool::new(vec![Secret::new("tok")]).unwrap()
    }

    fn executor(fetcher: Arc<MockFetcher>) -> RequestExecutor {
        RequestExecutor::new(fetcher, ExecutorPolicy::default())
    }

    #[tokio::test]
    async fn collects_across_batches_until_desired_count() {
        // Remote serves pages of 3: desired 5 takes ceil(5/3) = 2 batches.
        let fetcher = Arc::new(MockFetcher::sample(6).with_page_size(3));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, _) =
            collect_pages(&exec, token, "depression", 5, 100, &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(tweets.len(), 5);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn preserves_arrival_order() {
        let fetcher = Arc::new(MockFetcher::sample(6).with_page_size(2));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, _) =
            collect_pages(&exec, token, "q", 6, 100, &CancellationToken::new())
                .await
                .unwrap();

        let ids: Vec<_> = tweets.iter().map(|t| t.id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted, "sample corpus ids are ascending, arrival order kept");
    }

    #[tokio::test]
    async fn stops_early_when_remote_runs_dry() {
        let fetcher = Arc::new(MockFetcher::sample(4));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, _) =
            collect_pages(&exec, token, "q", 50, 100, &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(tweets.len(), 4, "min(desired, total available)");
        assert_eq!(fetcher.calls(), 1, "no cursor means no second call");
    }

    #[tokio::test]
    async fn empty_remote_yields_empty_result() {
        let fetcher = Arc::new(MockFetcher::new(vec![], vec![]));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, users) =
            collect_pages(&exec, token, "q", 10, 100, &CancellationToken::new())
                .await
                .unwrap();
        assert!(tweets.is_empty());
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn batch_size_never_exceeds_remote_cap() {
        let fetcher = Arc::new(MockFetcher::sample(150));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, _) =
            collect_pages(&exec, token, "q", 150, 100, &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(tweets.len(), 150);
        // 150 desired at a 100 cap: two batches (100 + 50).
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn small_desired_count_is_clamped_to_remote_minimum_and_truncated() {
        let fetcher = Arc::new(MockFetcher::sample(20));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, _) =
            collect_pages(&exec, token, "q", 3, 100, &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(tweets.len(), 3, "surplus rows from the clamped batch are dropped");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn mid_run_error_discards_partial_results() {
        let fetcher = Arc::new(
            MockFetcher::sample(9)
                .with_page_size(3)
                .fail_on_call(2, FetchError::Auth { status: 401 }),
        );
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let err = collect_pages(&exec, token, "q", 9, 100, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Fetch(FetchError::Auth { .. })));
    }

    #[tokio::test]
    async fn cancellation_checked_before_each_batch() {
        let fetcher = Arc::new(MockFetcher::sample(10));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = collect_pages(&exec, token, "q", 10, 100, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Cancelled));
        assert_eq!(fetcher.calls(), 0, "no batch issued after cancellation");
    }

    #[tokio::test]
    async fn zero_desired_count_issues_no_calls() {
        let fetcher = Arc::new(MockFetcher::sample(10));
        let pool = pool();
        let token = pool.candidates().next().unwrap();
        let exec = executor(fetcher.clone());

        let (tweets, _) =
            collect_pages(&exec, token, "q", 0, 100, &CancellationToken::new())
                .await
                .unwrap();
        assert!(tweets.is_empty());
        assert_eq!(fetcher.calls(), 0);
    }
}
