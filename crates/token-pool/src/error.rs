//! Error types for pool construction

/// Errors raised while building the token pool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "no bearer tokens configured — set TWITTER_BEARER_TOKEN or TWITTER_BEARER_TOKEN_1..N"
    )]
    NoCredentials,
}

/// Result alias for pool construction.
pub type Result<T> = std::result::Result<T, Error>;
