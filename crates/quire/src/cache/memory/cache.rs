//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use quire_core::cache::{Cache, Result};

/// A single cache entry with its expiration instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Expired entries are dropped lazily, on the next access to their key.
/// Uses LRU eviction to limit memory usage when max_entries is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache holding at most `max_entries` values.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Returns the live entry for `key`, dropping it first if it has expired.
    async fn live_value(&self, key: &str) -> Option<Vec<u8>> {
        let mut store = self.store.write().await;

        let expired = store.peek(key)?.is_expired();
        if expired {
            store.pop(key);
            return None;
        }

        store.get(key).map(|entry| entry.value.clone())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.live_value(key).await)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live_value(key).await.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.pop(key).is_some_and(|entry| !entry.is_expired()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    const LONG_TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "post:abc";
        let value = b"test value";

        cache.set(key, value, LONG_TTL).await.unwrap();
        let result = cache.get(key).await.unwrap();

        assert_eq!(result, Some(value.to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let result = cache.get("nonexistent:key").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("k", b"first", LONG_TTL).await.unwrap();
        cache.set("k", b"second", LONG_TTL).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "test:delete";

        cache.set(key, b"to be deleted", LONG_TTL).await.unwrap();
        assert!(cache.exists(key).await.unwrap());

        assert!(cache.delete(key).await.unwrap());
        assert!(!cache.exists(key).await.unwrap());
        assert!(!cache.delete(key).await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "test:ttl";

        cache
            .set(key, b"short-lived", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.get(key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get(key).await.unwrap().is_none());
        assert!(!cache.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_expired_entry_reports_absent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("stale", b"v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!cache.delete("stale").await.unwrap());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2);

        cache.set("a", b"1", LONG_TTL).await.unwrap();
        cache.set("b", b"2", LONG_TTL).await.unwrap();
        // Touch "a" so "b" becomes least recently used.
        cache.get("a").await.unwrap();
        cache.set("c", b"3", LONG_TTL).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_raised_to_one() {
        let cache = MemoryCache::new(0);

        cache.set("only", b"v", LONG_TTL).await.unwrap();

        assert!(cache.exists("only").await.unwrap());
    }
}
