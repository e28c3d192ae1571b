//! moodscope API service
//!
//! Single-binary service that:
//! 1. Loads config and the bearer-token pool
//! 2. Builds the collection core with the configured fetch strategy
//! 3. Serves the scrape/read routes plus health and metrics
//!
//! Collection failures degrade to empty results inside the core, so the
//! routes stay up whatever the remote API does.

mod config;
mod metrics;
mod pipeline;
mod routes;
mod sentiment;
mod store;
mod text;
mod topics;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use collector::Collector;
use common::Secret;
use token_pool::TokenPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twitter_search::{HttpFetcher, MockFetcher, SearchFetcher};

use crate::config::{Config, FetchStrategy};
use crate::routes::{AppState, build_router};
use crate::store::PostStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting moodscope-api");

    // Install the Prometheus recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        fetch_strategy = ?config.collector.fetch_strategy,
        cache_interval_secs = config.collector.cache_interval_secs,
        "configuration loaded"
    );

    // Credentials come from the environment only. The mock strategy works
    // without real tokens; a synthetic one keeps the pool invariant.
    let pool = match config.collector.fetch_strategy {
        FetchStrategy::Http => {
            TokenPool::from_env().context("bearer token configuration")?
        }
        FetchStrategy::Mock => TokenPool::from_env()
            .or_else(|_| TokenPool::new(vec![Secret::new("mock-token")]))
            .context("mock token pool")?,
    };
    info!(credentials = pool.len(), "token pool ready");

    let fetcher: Arc<dyn SearchFetcher> = match config.collector.fetch_strategy {
        FetchStrategy::Http => Arc::new(HttpFetcher::new(reqwest::Client::new())),
        FetchStrategy::Mock => {
            Arc::new(MockFetcher::sample(config.collector.mock_sample_size))
        }
    };

    let collector = Arc::new(Collector::new(
        pool,
        fetcher,
        config.collector.collector_config(),
    ));
    let store = Arc::new(PostStore::new(config.store.capacity));

    let state = AppState {
        collector,
        store,
        prometheus: prometheus_handle,
        started_at: Instant::now(),
        default_query: config.collector.default_query.clone(),
        default_limit: config.collector.default_limit,
    };

    let app = build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
