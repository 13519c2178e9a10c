use std::{env, time::Duration};

use quire_core::retry::RetryConfig;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 60, also used when set to 0)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    /// Note: Only used when the `memory` feature is enabled.
    #[allow(dead_code)]
    pub cache_max_entries: usize,
    /// Retries after the first attempt for store writes (default: 3)
    pub retry_max_retries: u32,
    /// Linear backoff step in milliseconds (default: 1,000)
    pub retry_backoff_ms: u64,
    /// Path to SQLite database file (default: "quire.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 60)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `RETRY_MAX_RETRIES` - Retries for store writes (default: 3)
    /// - `RETRY_BACKOFF_MS` - Linear backoff step in ms (default: 1,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "quire.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    ///
    /// Unparseable values, and a `CACHE_TTL_SECONDS` of zero, fall back to
    /// the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse().ok());

        Self {
            cache_ttl_seconds: parsed("CACHE_TTL_SECONDS")
                .filter(|&ttl: &u64| ttl > 0)
                .unwrap_or(60),
            cache_max_entries: parsed("CACHE_MAX_ENTRIES")
                .map(|v: u64| v as usize)
                .unwrap_or(10_000),
            retry_max_retries: parsed("RETRY_MAX_RETRIES")
                .map(|v: u64| v.min(u32::MAX as u64) as u32)
                .unwrap_or(3),
            retry_backoff_ms: parsed("RETRY_BACKOFF_MS").unwrap_or(1_000),
            sqlite_path: lookup("SQLITE_PATH").unwrap_or_else(|| "quire.db".to_string()),
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://localhost:6379".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Retry policy for store writes.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.retry_max_retries,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
