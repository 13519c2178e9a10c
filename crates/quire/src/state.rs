//! Application state.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. The store and cache backends are chosen by feature flags;
//! each combination gets its own `AppState::new` below.

use std::sync::Arc;
use std::time::Duration;

use quire_core::post::Post;
use quire_core::retry::RetryExecutor;
use quire_core::storage::CachedDocumentRepository;

use crate::config::Config;
use crate::services::PostService;

/// Shared application state.
///
/// Cloned for each request handler. Store and cache connections live behind
/// the service and are dropped with the last clone.
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    /// Per-request deadline, longer than a full retry sequence.
    pub request_timeout: Duration,
}

/// Slack on top of the retry backoff for the store and cache calls themselves.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

impl AppState {
    fn build(repository: Arc<dyn CachedDocumentRepository<Post>>, config: &Config) -> Self {
        let retry = RetryExecutor::new(config.retry_config());
        let request_timeout = retry
            .config()
            .total_backoff()
            .saturating_add(REQUEST_TIMEOUT_MARGIN);

        Self {
            post_service: Arc::new(PostService::new(repository, retry)),
            request_timeout,
        }
    }
}

// ============================================================================
// Backend-specific constructors
// ============================================================================

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::{CachedRepository, InMemoryDocumentStore};

    impl AppState {
        /// Creates AppState with in-memory storage and in-memory cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = InMemoryDocumentStore::new();
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            let cached_post_repo = Arc::new(CachedRepository::new(
                Arc::new(store.collection::<Post>()),
                memory_cache,
                config.cache_ttl(),
            ));

            tracing::info!("Using in-memory store with in-memory cache");
            Ok(Self::build(cached_post_repo, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::{CachedRepository, InMemoryDocumentStore};

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = InMemoryDocumentStore::new();
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);

            let cached_post_repo = Arc::new(CachedRepository::new(
                Arc::new(store.collection::<Post>()),
                redis_cache,
                config.cache_ttl(),
            ));

            tracing::info!(redis_url = %config.redis_url, "Using in-memory store with Redis cache");
            Ok(Self::build(cached_post_repo, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::{CachedRepository, SqliteDocumentStore};

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = SqliteDocumentStore::new(&config.sqlite_path).await?;
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            let cached_post_repo = Arc::new(CachedRepository::new(
                Arc::new(store.collection::<Post>()),
                memory_cache,
                config.cache_ttl(),
            ));

            tracing::info!(path = %config.sqlite_path, "Using SQLite store with in-memory cache");
            Ok(Self::build(cached_post_repo, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::{CachedRepository, SqliteDocumentStore};

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = SqliteDocumentStore::new(&config.sqlite_path).await?;
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);

            let cached_post_repo = Arc::new(CachedRepository::new(
                Arc::new(store.collection::<Post>()),
                redis_cache,
                config.cache_ttl(),
            ));

            tracing::info!(
                path = %config.sqlite_path,
                redis_url = %config.redis_url,
                "Using SQLite store with Redis cache"
            );
            Ok(Self::build(cached_post_repo, config))
        }
    }
}

// ============================================================================
// Test support
// ============================================================================
