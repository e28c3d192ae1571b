//! Secret wrapper for bearer tokens
//!
//! Tokens travel through config loading, the credential pool, and request
//! headers. Wrapping them keeps the raw value out of Debug/Display output
//! and scrubs the backing memory on drop.

use std::fmt;
use zeroize::Zeroize;

/// A bearer token or other sensitive string. Redacted in Debug/Display/logs.
pub struct Secret(String);

impl Secret {
    /// Wrap a sensitive string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the raw token. Only call at the point the value leaves the
    /// process (e.g. an Authorization header).
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
