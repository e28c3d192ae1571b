//! Request execution policy
//!
//! Wraps the fetch strategy with the per-batch recovery rules: transient
//! failures get a bounded number of immediate retries on the same
//! credential, a rate limit is either waited out (honoring the remote
//! reset, capped) or treated as the credential's failure, and an auth
//! rejection is terminal at once. Whatever comes out of `execute` is final
//! for this batch — the pagination engine and orchestrator decide what
//! happens next.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use token_pool::BearerToken;
use tracing::{debug, warn};
use twitter_search::{FetchError, Page, SearchFetcher};

/// What to do when the remote rate-limits a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitPolicy {
    /// Sleep until the remote-indicated reset, then retry once.
    Wait,
    /// Abandon the credential immediately and let the pool advance.
    Skip,
}

/// Recovery knobs for one batch attempt.
#[derive(Debug, Clone)]
pub struct ExecutorPolicy {
    /// Immediate same-credential retries for transient failures.
    pub transient_retries: u32,
    pub rate_limit_policy: RateLimitPolicy,
    /// Longest reset window Wait will honor; anything longer degrades to
    /// Skip so a throttled credential cannot stall the request.
    pub rate_limit_max_wait: Duration,
}

impl Default for ExecutorPolicy {
    fn default() -> Self {
        Self {
            transient_retries: 1,
            rate_limit_policy: RateLimitPolicy::Wait,
            rate_limit_max_wait: Duration::from_secs(900),
        }
    }
}

/// Fallback wait when the remote does not say when the limit resets.
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// One bounded network call plus local recovery.
pub struct RequestExecutor {
    fetcher: Arc<dyn SearchFetcher>,
    policy: ExecutorPolicy,
}

impl RequestExecutor {
    pub fn new(fetcher: Arc<dyn SearchFetcher>, policy: ExecutorPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Fetch one page with this credential, applying the recovery policy.
    ///
    /// The returned error is the batch's final classification: the caller
    /// must not retry the same credential for this query after an `Auth`
    /// error, and may advance or propagate on the others.
    pub async fn execute(
        &self,
        token: &BearerToken,
        query: &str,
        batch_size: u32,
        cursor: Option<&str>,
    ) -> Result<Page, FetchError> {
        let mut transient_left = self.policy.transient_retries;
        let mut waited_for_reset = false;

        loop {
            match self
                .fetcher
                .fetch_page(token.secret(), query, batch_size, cursor)
                .await
            {
                Ok(page) => return Ok(page),

                Err(err @ FetchError::Auth { .. }) => {
                    debug!(credential = token.ordinal(), "credential rejected");
                    return Err(err);
                }

                Err(FetchError::RateLimited { reset_after }) => {
                    let should_wait = self.policy.rate_limit_policy == RateLimitPolicy::Wait
                        && !waited_for_reset;
                    let wait = reset_after.unwrap_or(DEFAULT_RATE_LIMIT_WAIT);
                    if should_wait && wait <= self.policy.rate_limit_max_wait {
                        warn!(
                            credential = token.ordinal(),
                            wait_secs = wait.as_secs(),
                            "rate limited, waiting for reset"
                        );
                        tokio::time::sleep(wait).await;
                        waited_for_reset = true;
                        continue;
                    }
                    warn!(
                        credential = token.ordinal(),
                        wait_secs = wait.as_secs(),
                        "rate limited, abandoning credential"
                    );
                    return Err(FetchError::RateLimited { reset_after });
                }

                Err(FetchError::Transient(reason)) => {
                    if transient_left > 0 {
                        transient_left -= 1;
                        debug!(
                            credential = token.ordinal(),
                            reason = %reason,
                            retries_left = transient_left,
                            "transient failure, retrying"
                        );
                        continue;
                    }
                    return Err(FetchError::Transient(reason));
                }
            }
        }
    }
}
