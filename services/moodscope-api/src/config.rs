//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Bearer tokens are never stored in the TOML — they come from the
//! environment only (`TWITTER_BEARER_TOKEN`, `TWITTER_BEARER_TOKEN_1..N`)
//! and are loaded by the token pool at startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use collector::{CollectorConfig, RateLimitPolicy};
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collector: CollectorSection,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_connections: default_max_connections(),
        }
    }
}

/// Which fetch strategy the collector is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Live calls against the v2 recent-search endpoint.
    Http,
    /// Deterministic synthetic corpus, no network, no real tokens needed.
    Mock,
}

/// Collection tuning
#[derive(Debug, Deserialize)]
pub struct CollectorSection {
    #[serde(default = "default_fetch_strategy")]
    pub fetch_strategy: FetchStrategy,
    #[serde(default = "default_mock_sample_size")]
    pub mock_sample_size: usize,
    #[serde(default = "default_query")]
    pub default_query: String,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,
    #[serde(default = "default_transient_retries")]
    pub transient_retries: u32,
    #[serde(default = "default_rate_limit_policy")]
    pub rate_limit_policy: RateLimitPolicy,
    #[serde(default = "default_rate_limit_max_wait_secs")]
    pub rate_limit_max_wait_secs: u64,
    #[serde(default = "default_cache_interval_secs")]
    pub cache_interval_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            fetch_strategy: default_fetch_strategy(),
            mock_sample_size: default_mock_sample_size(),
            default_query: default_query(),
            default_limit: default_limit(),
            page_cap: default_page_cap(),
            transient_retries: default_transient_retries(),
            rate_limit_policy: default_rate_limit_policy(),
            rate_limit_max_wait_secs: default_rate_limit_max_wait_secs(),
            cache_interval_secs: default_cache_interval_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl CollectorSection {
    /// Translate the TOML section into the collector crate's config.
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            page_cap: self.page_cap,
            transient_retries: self.transient_retries,
            rate_limit_policy: self.rate_limit_policy,
            rate_limit_max_wait: Duration::from_secs(self.rate_limit_max_wait_secs),
            cache_interval: Duration::from_secs(self.cache_interval_secs),
            cache_capacity: self.cache_capacity,
        }
    }
}

/// In-memory post store bound
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_capacity")]
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: default_store_capacity(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_max_connections() -> usize {
    1000
}

fn default_fetch_strategy() -> FetchStrategy {
    FetchStrategy::Http
}

fn default_mock_sample_size() -> usize {
    50
}

fn default_query() -> String {
    "depression".to_string()
}

fn default_limit() -> usize {
    100
}

fn default_page_cap() -> u32 {
    100
}

fn default_transient_retries() -> u32 {
    1
}

fn default_rate_limit_policy() -> RateLimitPolicy {
    RateLimitPolicy::Wait
}

fn default_rate_limit_max_wait_secs() -> u64 {
    900
}

fn default_cache_interval_secs() -> u64 {
    900
}

fn default_cache_capacity() -> usize {
    256
}

fn default_store_capacity() -> usize {
    5000
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.collector.page_cap == 0 || self.collector.page_cap > 100 {
            return Err(common::Error::Config(format!(
                "page_cap must be within 1..=100, got {}",
                self.collector.page_cap
            )));
        }
        if self.collector.transient_retries > 2 {
            return Err(common::Error::Config(format!(
                "transient_retries must be at most 2, got {}",
                self.collector.transient_retries
            )));
        }
        if self.collector.cache_interval_secs == 0 {
            return Err(common::Error::Config(
                "cache_interval_secs must be greater than 0".into(),
            ));
        }
        if self.collector.cache_capacity == 0 {
            return Err(common::Error::Config(
                "cache_capacity must be greater than 0".into(),
            ));
        }
        if self.collector.default_limit == 0 {
            return Err(common::Error::Config(
                "default_limit must be greater than 0".into(),
            ));
        }
        if self.store.capacity == 0 {
            return Err(common::Error::Config(
                "store capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve config file path from CLI arg or MOODSCOPE_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("MOODSCOPE_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("moodscope.toml")
    }
}
