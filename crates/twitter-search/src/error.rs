//! Fetch failure taxonomy
//!
//! Every failed batch attempt collapses into one of three classes, and the
//! class alone decides what the caller does next:
//!
//! - `Auth` — the credential is rejected; advance to the next one, never
//!   retry the same credential for this query.
//! - `RateLimited` — wait out the reset window or advance, per policy.
//! - `Transient` — eligible for a small number of immediate retries on the
//!   same credential.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// A classified failure from one batch attempt.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("credential rejected by remote (status {status})")]
    Auth { status: u16 },

    #[error("rate limited by remote")]
    RateLimited { reset_after: Option<Duration> },

    #[error("transient fetch failure: {0}")]
    Transient(String),
}

/// Classify a non-success HTTP status.
///
/// 401/403 reject the credential, 429 is the rate limiter, and everything
/// else (timeouts surfaced as 408, 5xx, unexpected codes) is transient.
pub fn classify_status(status: u16, reset_after: Option<Duration>) -> FetchError {
    match status {
        401 | 403 => FetchError::Auth { status },
        429 => FetchError::RateLimited { reset_after },
        _ => FetchError::Transient(format!("unexpected status {status}")),
    }
}

/// Remaining wait implied by an `x-rate-limit-reset` header value
/// (unix epoch seconds). `None` when the header is missing, unparseable,
/// or already in the past.
pub fn reset_after(header: Option<&str>) -> Option<Duration> {
    let reset_epoch: u64 = header?.trim().parse().ok()?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    reset_epoch
        .checked_sub(now)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
