use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for basic byte-level cache operations.
///
/// Backends must be safe for concurrent use; callers never serialize access.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. Expired entries are misses.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache, expiring after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Returns true if a live entry exists for the key.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Deletes a value by key, returning whether anything was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}
