//! Scrape pipeline
//!
//! The background job behind `POST /api/scrape`: collect canonical records,
//! derive cleaned text, sentiment, and topics for each, and store the
//! result. The search-grammar decoration (`lang:en -is:retweet`) happens
//! here, not in the collection core — the core passes query text through
//! opaquely.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use collector::{CanonicalRecord, CollectRequest, Collector, Outcome};
use tracing::{info, warn};

use crate::store::{PostStore, StoredPost};
use crate::{metrics as service_metrics, sentiment, text, topics};

/// Decorate the user's search text with the fixed language/retweet filter.
pub fn search_query(query: &str) -> String {
    format!("{query} lang:en -is:retweet")
}

/// Derive the stored form of one collected record.
pub fn enrich(record: &CanonicalRecord) -> StoredPost {
    let cleaned = text::clean(&record.text);
    let normalized = text::normalize(&cleaned);
    let verdict = sentiment::analyze(&normalized);
    let topics = topics::detect(&cleaned);

    StoredPost {
        tweet_id: record.id.clone(),
        username: record.username.clone(),
        display_name: record.display_name.clone(),
        date: record.created_at.clone(),
        text: record.text.clone(),
        cleaned_text: cleaned,
        sentiment: verdict.label,
        sentiment_score: verdict.score,
        topics,
        like_count: record.like_count,
        retweet_count: record.retweet_count,
        stored_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

/// Run one scrape job end to end.
pub async fn run_scrape(
    collector: Arc<Collector>,
    store: Arc<PostStore>,
    job_id: String,
    query: String,
    limit: usize,
    use_cache: bool,
) {
    info!(job_id = %job_id, query = %query, limit, "scrape job started");
    let started = std::time::Instant::now();

    let mut request = CollectRequest::new(search_query(&query), limit);
    if !use_cache {
        request = request.without_cache();
    }

    let collection = collector.collect(&request).await;
    let outcome_label = match &collection.outcome {
        Outcome::CacheHit => "cache_hit",
        Outcome::Fetched { .. } => "fetched",
        Outcome::Exhausted { .. } => "exhausted",
        Outcome::Cancelled => "cancelled",
    };
    service_metrics::record_scrape_job(outcome_label);

    if let Outcome::Exhausted { attempts } = collection.outcome {
        warn!(
            job_id = %job_id,
            attempts,
            "no credential could serve the query, nothing stored"
        );
        return;
    }

    let stored = collection.records.len();
    for record in &collection.records {
        store.insert(enrich(record));
    }

    service_metrics::record_scrape_duration(started.elapsed().as_secs_f64());
    info!(job_id = %job_id, stored, outcome = outcome_label, "scrape job finished");
}
