//! In-memory document store implementation.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use quire_core::document::matches_optional;
use quire_core::storage::{DocumentRepository, RepositoryError, Result};
use quire_core::{stamped_for_update, Document, Predicate};

#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    body: Value,
}

/// Process-local document store holding every collection.
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<&'static str, Vec<StoredDocument>>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a repository over the collection named by `T::COLLECTION`.
    pub fn collection<T: Document>(&self) -> InMemoryRepository<T> {
        InMemoryRepository {
            store: self.clone(),
            _marker: PhantomData,
        }
    }

    /// Simulates an outage: while set, every operation fails with
    /// `RepositoryError::ConnectionFailed`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionFailed(
                "in-memory store is unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Repository over a single collection of an [`InMemoryDocumentStore`].
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    store: InMemoryDocumentStore,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

fn encode<T: Document>(document: &T) -> Result<Value> {
    serde_json::to_value(document).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn decode<T: Document>(stored: &StoredDocument) -> Result<T> {
    serde_json::from_value(stored.body.clone())
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

#[async_trait]
impl<T: Document> DocumentRepository<T> for InMemoryRepository<T> {
    async fn insert_one(&self, document: &T) -> Result<()> {
        self.store.ensure_available()?;
        let body = encode(document)?;

        let mut collections = self.store.collections.write().await;
        let documents = collections.entry(T::COLLECTION).or_default();
        if documents.iter().any(|d| d.id == document.id()) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: T::COLLECTION,
                id: document.id().to_string(),
            });
        }
        documents.push(StoredDocument {
            id: document.id().to_string(),
            body,
        });
        Ok(())
    }

    async fn get_all(&self, predicate: Option<&Predicate<T>>) -> Result<Vec<T>> {
        self.store.ensure_available()?;

        let collections = self.store.collections.read().await;
        let Some(documents) = collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };

        let mut matching = Vec::new();
        for stored in documents {
            let document: T = decode(stored)?;
            if matches_optional(predicate, &document) {
                matching.push(document);
            }
        }
        Ok(matching)
    }

    async fn delete_one(&self, predicate: &Predicate<T>) -> Result<()> {
        self.store.ensure_available()?;

        let mut collections = self.store.collections.write().await;
        let Some(documents) = collections.get_mut(T::COLLECTION) else {
            return Ok(());
        };

        let mut position = None;
        for (index, stored) in documents.iter().enumerate() {
            let document: T = decode(stored)?;
            if predicate.matches(&document) {
                position = Some(index);
                break;
            }
        }
        if let Some(index) = position {
            documents.remove(index);
        }
        Ok(())
    }

    async fn update(&self, document: &T) -> Result<T> {
        self.store.ensure_available()?;
        let updated = stamped_for_update(document, Utc::now());
        let body = encode(&updated)?;

        let mut collections = self.store.collections.write().await;
        let stored = collections
            .get_mut(T::COLLECTION)
            .and_then(|documents| documents.iter_mut().find(|d| d.id == updated.id()))
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: T::COLLECTION,
                id: updated.id().to_string(),
            })?;
        stored.body = body;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};
    use quire_core::post::{by_post_id, Post};

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()
    }

    fn post(title: &str) -> Post {
        Post::new(title, "Body", "Ada", published())
    }

    // ==================== Insert / Read Tests ====================

    #[tokio::test]
    async fn test_insert_and_get_all_in_insertion_order() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let first = post("First");
        let second = post("Second");
        let third = post("Third");

        for p in [&first, &second, &third] {
            repo.insert_one(p).await.unwrap();
        }

        let all = repo.get_all(None).await.unwrap();
        assert_eq!(all, vec![first, second, third]);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_fails() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let original = post("Original");
        let duplicate = post("Duplicate").with_id(original.id.clone());

        repo.insert_one(&original).await.unwrap();
        let result = repo.insert_one(&duplicate).await;

        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists {
                entity_type: "posts",
                ..
            })
        ));
        assert_eq!(repo.get_all(None).await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn test_get_all_empty_collection() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();

        assert!(repo.get_all(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_with_predicate() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let wanted = post("Wanted");
        repo.insert_one(&post("Other")).await.unwrap();
        repo.insert_one(&wanted).await.unwrap();

        let found = repo.get_all(Some(&by_post_id(wanted.post_id))).await.unwrap();

        assert_eq!(found, vec![wanted]);
    }

    #[tokio::test]
    async fn test_get_first_or_default() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let first = post("First");
        repo.insert_one(&first).await.unwrap();
        repo.insert_one(&post("Second")).await.unwrap();

        assert_eq!(repo.get_first_or_default(None).await.unwrap(), Some(first));

        let nobody = Predicate::new(|_: &Post| false);
        assert_eq!(repo.get_first_or_default(Some(&nobody)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_collections_share_store() {
        let store = InMemoryDocumentStore::new();
        let writer = store.collection::<Post>();
        let reader = store.collection::<Post>();
        let p = post("Shared");

        writer.insert_one(&p).await.unwrap();

        assert_eq!(reader.get_all(None).await.unwrap(), vec![p]);
    }

    // ==================== Delete Tests ====================

    #[tokio::test]
    async fn test_delete_one_removes_only_first_match() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let a = post("Same");
        let b = post("Same");
        repo.insert_one(&a).await.unwrap();
        repo.insert_one(&b).await.unwrap();

        let same_title = Predicate::new(|p: &Post| p.title == "Same");
        repo.delete_one(&same_title).await.unwrap();

        assert_eq!(repo.get_all(None).await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_delete_without_match_is_ok() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let p = post("Keep");
        repo.insert_one(&p).await.unwrap();

        repo.delete_one(&by_post_id(uuid::Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(repo.get_all(None).await.unwrap(), vec![p]);
    }

    #[tokio::test]
    async fn test_delete_twice_is_ok() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let p = post("Gone");
        repo.insert_one(&p).await.unwrap();

        repo.delete_one(&by_post_id(p.post_id)).await.unwrap();
        repo.delete_one(&by_post_id(p.post_id)).await.unwrap();

        assert!(repo.get_all(None).await.unwrap().is_empty());
    }

    // ==================== Update Tests ====================

    #[tokio::test]
    async fn test_update_replaces_and_stamps() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let mut p = post("Before");
        repo.insert_one(&p).await.unwrap();

        p.title = "After".to_string();
        let called_at = Utc::now();
        let stored = repo.update(&p).await.unwrap();

        assert_eq!(stored.title, "After");
        assert!(stored.updated_at.is_some_and(|at| at >= called_at));
        assert_eq!(repo.get_all(None).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let mut first = post("First");
        let second = post("Second");
        repo.insert_one(&first).await.unwrap();
        repo.insert_one(&second).await.unwrap();

        first.content = "Edited".to_string();
        let stored = repo.update(&first).await.unwrap();

        assert_eq!(repo.get_all(None).await.unwrap(), vec![stored, second]);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();

        let result = repo.update(&post("Ghost")).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_stamp_is_monotonic() {
        let repo = InMemoryDocumentStore::new().collection::<Post>();
        let mut p = post("Future");
        p.updated_at = Some(Utc::now() + Duration::days(1));
        repo.insert_one(&p).await.unwrap();

        let stored = repo.update(&p).await.unwrap();

        assert_eq!(stored.updated_at, p.updated_at);
    }

    // ==================== Outage Tests ====================

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = InMemoryDocumentStore::new();
        let repo = store.collection::<Post>();
        let p = post("Offline");
        repo.insert_one(&p).await.unwrap();

        store.set_unavailable(true);

        assert!(matches!(
            repo.insert_one(&post("New")).await,
            Err(RepositoryError::ConnectionFailed(_))
        ));
        assert!(repo.get_all(None).await.is_err());
        assert!(repo.delete_one(&by_post_id(p.post_id)).await.is_err());
        assert!(repo.update(&p).await.is_err());

        store.set_unavailable(false);
        assert_eq!(repo.get_all(None).await.unwrap(), vec![p]);
    }
}
