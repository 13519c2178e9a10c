//! Cache-aside decorator for document repositories.
//!
//! Wraps a `DocumentRepository<T>` and keeps single documents in the cache
//! under caller-supplied keys.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use quire_core::cache::Cache;
use quire_core::storage::{CachedDocumentRepository, DocumentRepository, Result};
use quire_core::{Document, Predicate};

use crate::cache::CacheStore;

/// Cached document repository decorator.
///
/// The store is always mutated before the cache. Store errors propagate
/// unchanged; cache errors are logged and otherwise ignored, and a failed
/// cache read is handled as a miss.
///
/// # Type Parameters
///
/// * `T` - The document type
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedRepository<T, R, C>
where
    T: Document,
    R: DocumentRepository<T>,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheStore<C>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, R, C> CachedRepository<T, R, C>
where
    T: Document,
    R: DocumentRepository<T>,
    C: Cache,
{
    /// Creates a new cached repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `ttl` - Time-to-live for cached documents
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheStore::new(cache, ttl),
            _marker: PhantomData,
        }
    }

    async fn cached(&self, cache_key: &str) -> Option<T> {
        match self.cache.get::<T>(cache_key).await {
            Ok(Some(document)) => {
                tracing::trace!(cache_key, collection = T::COLLECTION, "Cache hit");
                Some(document)
            }
            Ok(None) => {
                tracing::trace!(cache_key, collection = T::COLLECTION, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(cache_key, error = %err, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn cache_document(&self, cache_key: &str, document: &T) {
        let expire_at = self.cache.expiry_from_now();
        match self.cache.set(cache_key, document, expire_at).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(cache_key, "Cache write skipped, expiry already passed");
            }
            Err(err) => {
                tracing::warn!(cache_key, error = %err, "Failed to cache document");
            }
        }
    }

    async fn evict(&self, cache_key: &str) {
        if let Err(err) = self.cache.remove_if_exists(cache_key).await {
            tracing::warn!(cache_key, error = %err, "Failed to invalidate cached document");
        }
    }
}

#[async_trait]
impl<T, R, C> CachedDocumentRepository<T> for CachedRepository<T, R, C>
where
    T: Document,
    R: DocumentRepository<T> + 'static,
    C: Cache + 'static,
{
    async fn insert_one(&self, cache_key: &str, document: &T) -> Result<()> {
        // 1. Persist to storage
        self.repository.insert_one(document).await?;

        // 2. Populate cache immediately
        self.cache_document(cache_key, document).await;

        tracing::debug!(cache_key, id = document.id(), "Document inserted");
        Ok(())
    }

    async fn get_all(
        &self,
        cache_key: Option<&str>,
        predicate: Option<&Predicate<T>>,
    ) -> Result<Vec<T>> {
        if let Some(key) = cache_key {
            if let Some(document) = self.cached(key).await {
                return Ok(vec![document]);
            }
        }

        let documents = self.repository.get_all(predicate).await?;

        // Only the first match is cached under the key.
        if let (Some(key), Some(first)) = (cache_key, documents.first()) {
            self.cache_document(key, first).await;
        }

        Ok(documents)
    }

    async fn get_first_or_default(
        &self,
        cache_key: &str,
        predicate: Option<&Predicate<T>>,
    ) -> Result<Option<T>> {
        if let Some(document) = self.cached(cache_key).await {
            return Ok(Some(document));
        }

        let document = self.repository.get_first_or_default(predicate).await?;

        if let Some(ref d) = document {
            self.cache_document(cache_key, d).await;
        }

        Ok(document)
    }

    async fn delete_one(&self, cache_key: &str, predicate: &Predicate<T>) -> Result<()> {
        // 1. Persist deletion to storage
        self.repository.delete_one(predicate).await?;

        // 2. Invalidate cache
        self.evict(cache_key).await;

        tracing::debug!(cache_key, "Document deleted");
        Ok(())
    }

    async fn update(&self, cache_key: &str, document: &T) -> Result<T> {
        // 1. Persist to storage
        let stored = self.repository.update(document).await?;

        // 2. Replace the cached copy with the stored one
        self.evict(cache_key).await;
        self.cache_document(cache_key, &stored).await;

        tracing::debug!(cache_key, id = stored.id(), "Document updated");
        Ok(stored)
    }
}
