//! Ordered pool of bearer credentials for the search API
//!
//! The pool is loaded once at startup and read-only afterwards. Rotation is
//! expressed purely through iteration order: the collection orchestrator
//! walks `candidates()` front to back and falls through on failure. A
//! credential that failed for one query is offered again, in the same
//! position, for the next — transient trouble never demotes a token.

pub mod error;
pub mod pool;

pub use error::{Error, Result};
pub use pool::{BearerToken, TokenPool};
