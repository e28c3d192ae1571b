//! Collector tuning knobs
//!
//! Gathered from the service's config file once at startup and passed in by
//! value. Defaults match the remote API's documented limits and the
//! original deployment's 15-minute cache window.

use std::time::Duration;

use crate::executor::{ExecutorPolicy, RateLimitPolicy};
use crate::paginate::REMOTE_PAGE_CAP;

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Per-call batch cap; never raised above the remote maximum.
    pub page_cap: u32,
    pub transient_retries: u32,
    pub rate_limit_policy: RateLimitPolicy,
    pub rate_limit_max_wait: Duration,
    /// Cache bucket interval; lookups inside one interval are identical.
    pub cache_interval: Duration,
    /// Cache entry bound.
    pub cache_capacity: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_cap: REMOTE_PAGE_CAP,
            transient_retries: 1,
            rate_limit_policy: RateLimitPolicy::Wait,
            rate_limit_max_wait: Duration::from_secs(900),
            cache_interval: Duration::from_secs(900),
            cache_capacity: 256,
        }
    }
}

impl CollectorConfig {
    pub(crate) fn executor_policy(&self) -> ExecutorPolicy {
        ExecutorPolicy {
            transient_retries: self.transient_retries,
            rate_limit_policy: self.rate_limit_policy,
            rate_limit_max_wait: self.rate_limit_max_wait,
        }
    }
}
