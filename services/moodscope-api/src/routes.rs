//! HTTP route layer
//!
//! Thin trigger-and-read surface over the collection core:
//! `POST /api/scrape` kicks off a background job and returns immediately,
//! `GET /api/posts` reads the store, plus the usual `/health` and
//! `/metrics` endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use collector::Collector;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tracing::info;

use crate::pipeline;
use crate::store::PostStore;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    pub store: Arc<PostStore>,
    pub prometheus: PrometheusHandle,
    pub started_at: Instant,
    pub default_query: String,
    pub default_limit: usize,
}

/// Build the axum router with all routes and shared state.
///
/// The concurrency limit layer bounds simultaneous in-flight requests.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape_handler))
        .route("/api/posts", get(posts_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

/// Optional body for `POST /api/scrape`.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub query: Option<String>,
    pub limit: Option<usize>,
    pub use_cache: Option<bool>,
}

/// Kick off a collection job in the background and return 202.
///
/// The body is optional; a missing or empty body runs with the configured
/// defaults.
async fn scrape_handler(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    let params: ScrapeParams = if body.is_empty() {
        ScrapeParams::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(params) => params,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    axum::Json(serde_json::json!({
                        "error": format!("invalid request body: {e}"),
                    })),
                );
            }
        }
    };
    let query = params.query.unwrap_or_else(|| state.default_query.clone());
    let limit = params.limit.unwrap_or(state.default_limit);
    let use_cache = params.use_cache.unwrap_or(true);

    let job_id = format!("job_{}", uuid::Uuid::new_v4().as_simple());
    info!(job_id = %job_id, query = %query, limit, "accepted scrape request");

    tokio::spawn(pipeline::run_scrape(
        state.collector.clone(),
        state.store.clone(),
        job_id.clone(),
        query,
        limit,
        use_cache,
    ));

    (
        StatusCode::ACCEPTED,
        axum::Json(serde_json::json!({
            "message": "Scraping started in the background",
            "job_id": job_id,
        })),
    )
}

#[derive(Debug, Deserialize)]
struct PostsQuery {
    limit: Option<usize>,
}

/// Most recent stored posts, newest first.
async fn posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PostsQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(100);
    axum::Json(state.store.recent(limit))
}

/// Liveness plus a few gauges worth eyeballing.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "credentials": state.collector.credentials(),
        "cache_entries": state.collector.cache_entries(),
        "stored_posts": state.store.len(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    });
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus text exposition.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
