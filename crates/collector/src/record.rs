//! Canonical output record
//!
//! The normalized unit the rest of the system consumes, independent of the
//! remote API's native schema. Downstream collaborators (text cleaning,
//! sentiment, topic tagging, storage) only ever see this shape.

use serde::{Deserialize, Serialize};

/// One collected post. `id` is unique within a single result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: String,
    /// ISO-8601, UTC.
    pub created_at: String,
    pub text: String,
    pub username: String,
    pub display_name: String,
    pub like_count: u64,
    pub retweet_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}
