//! Typed cache access with absolute expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{de::DeserializeOwned, Serialize};

use quire_core::cache::{deserialize_value, serialize_value, Cache, Result};

/// Stores typed values in a byte-level [`Cache`] backend.
///
/// Values are serialized as JSON. A value that cannot be decoded as the
/// requested type is reported as a miss.
pub struct CacheStore<C: Cache> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C: Cache> CacheStore<C> {
    /// Creates a store whose [`expiry_from_now`](Self::expiry_from_now) is `ttl` ahead.
    pub fn new(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// The default absolute expiry for a write made now.
    pub fn expiry_from_now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns the value under `key`, or `None` on a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.cache.get(key).await? else {
            return Ok(None);
        };

        match deserialize_value(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Cached value has unexpected shape, treating as miss");
                Ok(None)
            }
        }
    }

    /// Stores `value` under `key` until `expire_at`, replacing any previous value.
    ///
    /// Returns `Ok(false)` without writing when `expire_at` is not in the future.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expire_at: DateTime<Utc>,
    ) -> Result<bool> {
        let ttl = match (expire_at - Utc::now()).to_std() {
            Ok(ttl) if !ttl.is_zero() => ttl,
            _ => {
                tracing::debug!(key = %key, %expire_at, "Expiry already passed, skipping cache write");
                return Ok(false);
            }
        };

        let bytes = serialize_value(value)?;
        self.cache.set(key, &bytes, ttl).await?;
        Ok(true)
    }

    /// Removes `key` if present. Returns whether it was present.
    pub async fn remove_if_exists(&self, key: &str) -> Result<bool> {
        if !self.cache.exists(key).await? {
            return Ok(false);
        }
        self.cache.delete(key).await
    }
}
