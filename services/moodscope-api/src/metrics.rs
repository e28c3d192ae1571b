//! Prometheus metrics exposition
//!
//! Counters and histograms surfaced on `GET /metrics`:
//!
//! - `scrape_jobs_total` (counter): label `outcome`
//! - `scrape_duration_seconds` (histogram)
//! - the collector core's own counters (`collector_cache_hits_total`,
//!   `collector_credential_failovers_total`, `collector_exhaustions_total`,
//!   `collector_pages_fetched_total`) flow through the same recorder.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
///
/// `scrape_duration_seconds` gets explicit buckets so it renders as a
/// histogram rather than a summary. The range covers a cache hit (ms) up
/// to a rate-limit wait (minutes).
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full("scrape_duration_seconds".to_string()),
            &[0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0],
        )
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a finished scrape job with its outcome label.
pub fn record_scrape_job(outcome: &str) {
    metrics::counter!("scrape_jobs_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record how long a scrape job took, collection plus enrichment.
pub fn record_scrape_duration(duration_secs: f64) {
    metrics::histogram!("scrape_duration_seconds").record(duration_secs);
}
