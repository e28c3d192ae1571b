//! Shared types for the moodscope workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
