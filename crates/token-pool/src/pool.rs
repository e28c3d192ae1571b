//! Credential pool and environment loading
//!
//! Tokens come from the environment only, never from config files:
//! `TWITTER_BEARER_TOKEN` (the legacy single-token variable) first, then
//! `TWITTER_BEARER_TOKEN_1`, `TWITTER_BEARER_TOKEN_2`, ... in numeric order
//! until the first missing index. Discovery order is candidate order.

use common::Secret;
use tracing::info;

use crate::error::{Error, Result};

/// Name of the legacy single-token variable.
pub const LEGACY_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";

/// Prefix of the numbered multi-token variables.
pub const NUMBERED_TOKEN_PREFIX: &str = "TWITTER_BEARER_TOKEN_";

/// One credential with its position in the rotation.
#[derive(Debug, Clone)]
pub struct BearerToken {
    ordinal: usize,
    secret: Secret,
}

impl BearerToken {
    /// Position in the rotation, starting at 0.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The wrapped token value.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }
}

/// Immutable, ordered set of credentials. At least one is guaranteed.
pub struct TokenPool {
    tokens: Vec<BearerToken>,
}

impl TokenPool {
    /// Build a pool from explicit tokens, preserving order.
    ///
    /// Empty input is a configuration error: the caller must know before
    /// any network attempt that collection cannot work.
    pub fn new(tokens: Vec<Secret>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(Error::NoCredentials);
        }
        let tokens = tokens
            .into_iter()
            .enumerate()
            .map(|(ordinal, secret)| BearerToken { ordinal, secret })
            .collect::<Vec<_>>();
        info!(tokens = tokens.len(), "token pool initialized");
        Ok(Self { tokens })
    }

    /// Build a pool from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(tokens_from_env())
    }

    /// Credentials in rotation order. Iteration never mutates the pool, so
    /// every call starts from the front again.
    pub fn candidates(&self) -> impl Iterator<Item = &BearerToken> {
        self.tokens.iter()
    }

    /// Number of configured credentials.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false once constructed; kept for the len/is_empty pairing.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Read tokens in discovery order: legacy variable first, then the numbered
/// list until the first gap. Blank values are skipped.
fn tokens_from_env() -> Vec<Secret> {
    let mut tokens = Vec::new();
    if let Ok(value) = std::env::var(LEGACY_TOKEN_VAR) {
        let value = value.trim();
        if !value.is_empty() {
            tokens.push(Secret::new(value));
        }
    }
    for n in 1.. {
        match std::env::var(format!("{NUMBERED_TOKEN_PREFIX}{n}")) {
            Ok(value) => {
                let value = value.trim();
                if !value.is_empty() {
                    tokens.push(Secret::new(value));
                }
            }
            Err(_) => break,
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate process environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    unsafe fn clear_token_vars() {
        unsafe {
            remove_env(LEGACY_TOKEN_VAR);
            for n in 1..10 {
                remove_env(&format!("{NUMBERED_TOKEN_PREFIX}{n}"));
            }
        }
    }

    #[test]
    fn empty_pool_is_a_configuration_error() {
        let result = TokenPool::new(vec![]);
        assert!(matches!(result, Err(Error::NoCredentials)));
    }

    #[test]
    fn explicit_tokens_keep_order_and_ordinals() {
        let pool = TokenPool::new(vec![Secret::new("first"), Secret::new("second")]).unwrap();
        let candidates: Vec<_> = pool.candidates().collect();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].ordinal(), 0);
        assert_eq!(candidates[0].secret().expose(), "first");
        assert_eq!(candidates[1].ordinal(), 1);
        assert_eq!(candidates[1].secret().expose(), "second");
    }

    #[test]
    fn iteration_restarts_from_the_front() {
        // A failed candidate must not be demoted for the next query, so a
        // second walk sees the same order.
        let pool = TokenPool::new(vec![Secret::new("a"), Secret::new("b")]).unwrap();
        let first_walk: Vec<_> = pool.candidates().map(|t| t.ordinal()).collect();
        let second_walk: Vec<_> = pool.candidates().map(|t| t.ordinal()).collect();
        assert_eq!(first_walk, second_walk);
        assert_eq!(first_walk, vec![0, 1]);
    }

    #[test]
    fn from_env_reads_legacy_variable() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            clear_token_vars();
            set_env(LEGACY_TOKEN_VAR, "legacy-token");
        }

        let pool = TokenPool::from_env().unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(
            pool.candidates().next().unwrap().secret().expose(),
            "legacy-token"
        );

        unsafe { clear_token_vars() };
    }

    #[test]
    fn from_env_reads_numbered_list_in_order() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            clear_token_vars();
            set_env("TWITTER_BEARER_TOKEN_1", "tok-1");
            set_env("TWITTER_BEARER_TOKEN_2", "tok-2");
            set_env("TWITTER_BEARER_TOKEN_3", "tok-3");
        }

        let pool = TokenPool::from_env().unwrap();
        let values: Vec<_> = pool
            .candidates()
            .map(|t| t.secret().expose().to_string())
            .collect();
        assert_eq!(values, vec!["tok-1", "tok-2", "tok-3"]);

        unsafe { clear_token_vars() };
    }

    #[test]
    fn legacy_token_precedes_numbered_tokens() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            clear_token_vars();
            set_env(LEGACY_TOKEN_VAR, "legacy");
            set_env("TWITTER_BEARER_TOKEN_1", "numbered");
        }

        let pool = TokenPool::from_env().unwrap();
        let values: Vec<_> = pool
            .candidates()
            .map(|t| t.secret().expose().to_string())
            .collect();
        assert_eq!(values, vec!["legacy", "numbered"]);

        unsafe { clear_token_vars() };
    }

    #[test]
    fn numbered_scan_stops_at_first_gap() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            clear_token_vars();
            set_env("TWITTER_BEARER_TOKEN_1", "tok-1");
            // No _2; _3 must not be discovered.
            set_env("TWITTER_BEARER_TOKEN_3", "orphan");
        }

        let pool = TokenPool::from_env().unwrap();
        assert_eq!(pool.len(), 1);

        unsafe { clear_token_vars() };
    }

    #[test]
    fn blank_values_are_skipped() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            clear_token_vars();
            set_env(LEGACY_TOKEN_VAR, "   ");
            set_env("TWITTER_BEARER_TOKEN_1", "real");
        }

        let pool = TokenPool::from_env().unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.candidates().next().unwrap().secret().expose(), "real");

        unsafe { clear_token_vars() };
    }

    #[test]
    fn from_env_with_nothing_set_is_a_configuration_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_token_vars() };

        let result = TokenPool::from_env();
        assert!(matches!(result, Err(Error::NoCredentials)));
    }
}
