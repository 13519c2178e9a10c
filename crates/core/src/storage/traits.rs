use async_trait::async_trait;

use crate::document::{Document, Predicate};

use super::Result;

/// Repository for one collection of typed documents.
///
/// Implementations know nothing about caching.
#[async_trait]
pub trait DocumentRepository<T: Document>: Send + Sync {
    /// Inserts a document as-is. Fails with `AlreadyExists` on a duplicate id.
    async fn insert_one(&self, document: &T) -> Result<()>;

    /// Gets all documents matching the predicate, in store order.
    ///
    /// `None` matches every document.
    async fn get_all(&self, predicate: Option<&Predicate<T>>) -> Result<Vec<T>>;

    /// Gets the first document matching the predicate, if any.
    async fn get_first_or_default(&self, predicate: Option<&Predicate<T>>) -> Result<Option<T>> {
        Ok(self.get_all(predicate).await?.into_iter().next())
    }

    /// Deletes at most one matching document. Zero matches is not an error.
    async fn delete_one(&self, predicate: &Predicate<T>) -> Result<()>;

    /// Stamps `updated_at` and replaces the stored document with the same id.
    ///
    /// Returns the stored copy. Fails with `NotFound` if no document has that id.
    async fn update(&self, document: &T) -> Result<T>;
}

/// Cache-aside repository keyed by a caller-chosen cache key.
///
/// Store mutations always happen before the matching cache mutation, and
/// cache failures never surface as errors.
#[async_trait]
pub trait CachedDocumentRepository<T: Document>: Send + Sync {
    /// Inserts into the store, then caches the document under `cache_key`.
    async fn insert_one(&self, cache_key: &str, document: &T) -> Result<()>;

    /// Gets matching documents, consulting the cache first when a key is given.
    ///
    /// The cache holds at most one document per key: a hit yields a single
    /// element, and a store result caches only its first element.
    async fn get_all(
        &self,
        cache_key: Option<&str>,
        predicate: Option<&Predicate<T>>,
    ) -> Result<Vec<T>>;

    /// Gets the first matching document, consulting the cache first.
    async fn get_first_or_default(
        &self,
        cache_key: &str,
        predicate: Option<&Predicate<T>>,
    ) -> Result<Option<T>>;

    /// Deletes from the store, then removes `cache_key` from the cache.
    async fn delete_one(&self, cache_key: &str, predicate: &Predicate<T>) -> Result<()>;

    /// Updates the store, then replaces the cached copy under `cache_key`.
    async fn update(&self, cache_key: &str, document: &T) -> Result<T>;
}
