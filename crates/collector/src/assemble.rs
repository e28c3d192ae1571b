//! Result assembly
//!
//! Joins raw tweet rows with the included-users side-table and emits
//! canonical records. Duplicate ids across batches keep the first
//! occurrence in arrival order. An author missing from the side-table maps
//! to the `"unknown"` sentinel rather than failing the batch, and a single
//! malformed row (no id, no timestamp) is skipped while the rest proceed.

use std::collections::{HashMap, HashSet};

use chrono::SecondsFormat;
use tracing::debug;
use twitter_search::{ApiUser, Tweet};

use crate::record::CanonicalRecord;

/// Sentinel handle and display name for authors absent from the side-table.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Assemble canonical records from raw rows, deduplicated by id.
pub fn assemble(tweets: Vec<Tweet>, users: &HashMap<String, ApiUser>) -> Vec<CanonicalRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(tweets.len());
    let mut records = Vec::with_capacity(tweets.len());

    for tweet in tweets {
        if tweet.id.is_empty() {
            debug!("skipping row without id");
            continue;
        }
        if !seen.insert(tweet.id.clone()) {
            continue;
        }
        let Some(created_at) = tweet.created_at else {
            debug!(id = %tweet.id, "skipping row without created_at");
            continue;
        };

        let (username, display_name) = match tweet.author_id.as_deref().and_then(|id| users.get(id))
        {
            Some(user) => (user.username.clone(), user.name.clone()),
            None => (UNKNOWN_AUTHOR.to_string(), UNKNOWN_AUTHOR.to_string()),
        };

        records.push(CanonicalRecord {
            id: tweet.id,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            text: tweet.text,
            username,
            display_name,
            like_count: tweet.public_metrics.like_count,
            retweet_count: tweet.public_metrics.retweet_count,
            conversation_id: tweet.conversation_id,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use twitter_search::TweetMetrics;

    fn tweet(id: &str, author: Option<&str>) -> Tweet {
        Tweet {
            id: id.to_string(),
            text: format!("text for {id}"),
            created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0),
            author_id: author.map(str::to_string),
            conversation_id: None,
            public_metrics: TweetMetrics {
                like_count: 3,
                retweet_count: 1,
                reply_count: 0,
                quote_count: 0,
            },
        }
    }

    fn user(id: &str, username: &str) -> (String, ApiUser) {
        (
            id.to_string(),
            ApiUser {
                id: id.to_string(),
                username: username.to_string(),
                name: format!("{username} (display)"),
            },
        )
    }

    #[test]
    fn joins_author_metadata() {
        let users: HashMap<_, _> = [user("9", "lighthouse")].into();
        let records = assemble(vec![tweet("1", Some("9"))], &users);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "lighthouse");
        assert_eq!(records[0].display_name, "lighthouse (display)");
        assert_eq!(records[0].created_at, "2023-11-14T22:13:20Z");
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence_in_order() {
        let users: HashMap<_, _> = [user("9", "a")].into();
        let mut first = tweet("1", Some("9"));
        first.text = "first copy".into();
        let mut dup = tweet("1", Some("9"));
        dup.text = "second copy".into();

        let records = assemble(vec![first, tweet("2", Some("9")), dup], &users);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(records[0].text, "first copy");
    }

    #[test]
    fn missing_author_maps_to_sentinel() {
        let users = HashMap::new();
        let records = assemble(
            vec![tweet("1", Some("no-such-user")), tweet("2", None)],
            &users,
        );
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.username, UNKNOWN_AUTHOR);
            assert_eq!(record.display_name, UNKNOWN_AUTHOR);
        }
    }

    #[test]
    fn malformed_row_is_skipped_not_fatal() {
        let users: HashMap<_, _> = [user("9", "a")].into();
        let mut no_timestamp = tweet("2", Some("9"));
        no_timestamp.created_at = None;
        let no_id = tweet("", Some("9"));

        let records = assemble(
            vec![tweet("1", Some("9")), no_timestamp, no_id, tweet("3", Some("9"))],
            &users,
        );
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(assemble(vec![], &HashMap::new()).is_empty());
    }
}
