//! Post service: cache-aside reads and retried writes over posts.
//!
//! Every failure is logged here and reported to callers as `None` / `false`.

use std::sync::Arc;

use uuid::Uuid;

use quire_core::cache::post_key;
use quire_core::post::{by_post_id, Post, PostCreateRequest, PostUpdateRequest};
use quire_core::retry::RetryExecutor;
use quire_core::storage::{CachedDocumentRepository, RepositoryError};

/// Post operations used by the HTTP handlers.
pub struct PostService {
    repository: Arc<dyn CachedDocumentRepository<Post>>,
    retry: RetryExecutor,
}

impl PostService {
    pub fn new(repository: Arc<dyn CachedDocumentRepository<Post>>, retry: RetryExecutor) -> Self {
        Self { repository, retry }
    }

    /// Returns the post with `post_id` (zero or one element), or every post
    /// when no id is given. `None` signals a failure.
    pub async fn get_posts(&self, post_id: Option<Uuid>) -> Option<Vec<Post>> {
        let result = match post_id {
            Some(id) => {
                let key = post_key(id);
                self.repository
                    .get_all(Some(&key), Some(&by_post_id(id)))
                    .await
            }
            None => self.repository.get_all(None, None).await,
        };

        match result {
            Ok(posts) => Some(posts),
            Err(err) => {
                tracing::error!(
                    post_id = ?post_id,
                    error = %err,
                    transient = err.is_transient(),
                    "Failed to get posts"
                );
                None
            }
        }
    }

    /// Creates a post from `request`, returning it as stored.
    pub async fn add_new_post(&self, request: PostCreateRequest) -> Option<Post> {
        let post = request.into_post();
        let key = post_key(post.post_id);

        let result = self
            .retry
            .execute_if(
                || self.repository.insert_one(&key, &post),
                RepositoryError::is_retryable,
            )
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(post_id = %post.post_id, title = %post.title, "Post created");
                Some(post)
            }
            Err(err) => {
                tracing::error!(
                    post_id = %post.post_id,
                    error = %err,
                    transient = err.is_transient(),
                    "Failed to add new post"
                );
                None
            }
        }
    }

    /// Applies `request` to the post with `post_id`.
    ///
    /// Returns `None` when the post does not exist or the update fails.
    pub async fn update_post(&self, post_id: Uuid, request: PostUpdateRequest) -> Option<Post> {
        let key = post_key(post_id);

        let mut post = match self
            .repository
            .get_first_or_default(&key, Some(&by_post_id(post_id)))
            .await
        {
            Ok(Some(post)) => post,
            Ok(None) => {
                tracing::warn!(%post_id, "Post not found for update");
                return None;
            }
            Err(err) => {
                tracing::error!(
                    %post_id,
                    error = %err,
                    transient = err.is_transient(),
                    "Failed to load post for update"
                );
                return None;
            }
        };

        request.apply_to(&mut post);

        let result = self
            .retry
            .execute_if(
                || self.repository.update(&key, &post),
                RepositoryError::is_retryable,
            )
            .await;

        match result {
            Ok(stored) => {
                tracing::debug!(%post_id, "Post updated");
                Some(stored)
            }
            Err(err) => {
                tracing::error!(
                    %post_id,
                    error = %err,
                    transient = err.is_transient(),
                    "Failed to update post"
                );
                None
            }
        }
    }

    /// Deletes the post with `post_id`. A missing post counts as deleted.
    pub async fn delete_post(&self, post_id: Uuid) -> bool {
        let key = post_key(post_id);
        let predicate = by_post_id(post_id);

        let result = self
            .retry
            .execute_if(
                || self.repository.delete_one(&key, &predicate),
                RepositoryError::is_retryable,
            )
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(%post_id, "Post deleted");
                true
            }
            Err(err) => {
                tracing::error!(
                    %post_id,
                    error = %err,
                    transient = err.is_transient(),
                    "Failed to delete post"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use tokio::sync::RwLock;

    use quire_core::retry::RetryConfig;
    use quire_core::storage::Result;
    use quire_core::Predicate;

    use crate::cache::MemoryCache;
    use crate::storage::{CachedRepository, InMemoryDocumentStore};

    // Mock cached repository: writes fail `failures` times before succeeding
    struct MockCachedRepository {
        posts: RwLock<Vec<Post>>,
        write_calls: AtomicUsize,
        failures: AtomicUsize,
        fail_reads: AtomicBool,
        update_not_found: AtomicBool,
    }

    impl MockCachedRepository {
        fn new() -> Self {
            Self {
                posts: RwLock::new(Vec::new()),
                write_calls: AtomicUsize::new(0),
                failures: AtomicUsize::new(0),
                fail_reads: AtomicBool::new(false),
                update_not_found: AtomicBool::new(false),
            }
        }

        fn fail_next_writes(&self, count: usize) {
            self.failures.store(count, Ordering::SeqCst);
        }

        fn writes(&self) -> usize {
            self.write_calls.load(Ordering::SeqCst)
        }

        async fn seed(&self, post: Post) {
            self.posts.write().await.push(post);
        }

        fn write_attempt(&self) -> Result<()> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(RepositoryError::ConnectionFailed("store down".to_string()));
            }
            Ok(())
        }

        fn read_attempt(&self) -> Result<()> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(RepositoryError::QueryFailed("read failed".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CachedDocumentRepository<Post> for MockCachedRepository {
        async fn insert_one(&self, _cache_key: &str, document: &Post) -> Result<()> {
            self.write_attempt()?;
            self.posts.write().await.push(document.clone());
            Ok(())
        }

        async fn get_all(
            &self,
            _cache_key: Option<&str>,
            predicate: Option<&Predicate<Post>>,
        ) -> Result<Vec<Post>> {
            self.read_attempt()?;
            Ok(self
                .posts
                .read()
                .await
                .iter()
                .filter(|p| predicate.is_none_or(|pred| pred.matches(p)))
                .cloned()
                .collect())
        }

        async fn get_first_or_default(
            &self,
            cache_key: &str,
            predicate: Option<&Predicate<Post>>,
        ) -> Result<Option<Post>> {
            Ok(self
                .get_all(Some(cache_key), predicate)
                .await?
                .into_iter()
                .next())
        }

        async fn delete_one(&self, _cache_key: &str, predicate: &Predicate<Post>) -> Result<()> {
            self.write_attempt()?;
            let mut posts = self.posts.write().await;
            if let Some(index) = posts.iter().position(|p| predicate.matches(p)) {
                posts.remove(index);
            }
            Ok(())
        }

        async fn update(&self, _cache_key: &str, document: &Post) -> Result<Post> {
            self.write_attempt()?;
            if self.update_not_found.load(Ordering::SeqCst) {
                return Err(RepositoryError::NotFound {
                    entity_type: "posts",
                    id: document.id.clone(),
                });
            }
            let mut posts = self.posts.write().await;
            let mut stored = document.clone();
            stored.updated_at = Some(Utc::now());
            if let Some(slot) = posts.iter_mut().find(|p| p.id == document.id) {
                *slot = stored.clone();
            }
            Ok(stored)
        }
    }

    fn retry() -> RetryExecutor {
        RetryExecutor::new(RetryConfig::new(2, Duration::from_millis(100)))
    }

    fn setup() -> (PostService, Arc<MockCachedRepository>) {
        let repo = Arc::new(MockCachedRepository::new());
        let service = PostService::new(repo.clone(), retry());
        (service, repo)
    }

    fn yesterday() -> chrono::DateTime<Utc> {
        Utc::now() - ChronoDuration::days(1)
    }

    fn create_request(title: &str) -> PostCreateRequest {
        PostCreateRequest::new(title, "Body", "Ada", yesterday())
    }

    fn existing_post(title: &str) -> Post {
        Post::new(title, "Body", "Ada", yesterday())
    }

    // ==================== get_posts ====================

    #[tokio::test]
    async fn test_get_posts_without_id_returns_all() {
        let (service, repo) = setup();
        let a = existing_post("A");
        let b = existing_post("B");
        repo.seed(a.clone()).await;
        repo.seed(b.clone()).await;

        assert_eq!(service.get_posts(None).await, Some(vec![a, b]));
    }

    #[tokio::test]
    async fn test_get_posts_by_id_returns_single_post() {
        let (service, repo) = setup();
        let wanted = existing_post("Wanted");
        repo.seed(existing_post("Other")).await;
        repo.seed(wanted.clone()).await;

        assert_eq!(
            service.get_posts(Some(wanted.post_id)).await,
            Some(vec![wanted])
        );
    }

    #[tokio::test]
    async fn test_get_posts_unknown_id_is_empty() {
        let (service, _repo) = setup();

        assert_eq!(service.get_posts(Some(Uuid::new_v4())).await, Some(vec![]));
    }

    #[tokio::test]
    async fn test_get_posts_failure_is_none() {
        let (service, repo) = setup();
        repo.fail_reads.store(true, Ordering::SeqCst);

        assert_eq!(service.get_posts(None).await, None);
    }

    // ==================== add_new_post ====================

    #[tokio::test]
    async fn test_add_new_post_returns_created_post() {
        let (service, repo) = setup();

        let post = service.add_new_post(create_request("Fresh")).await.unwrap();

        assert_eq!(post.title, "Fresh");
        assert_eq!(post.id.len(), 32);
        assert!(post.updated_at.is_none());
        assert_eq!(service.get_posts(Some(post.post_id)).await, Some(vec![post]));
        assert_eq!(repo.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_new_post_retries_transient_failures() {
        let (service, repo) = setup();
        repo.fail_next_writes(2);

        let post = service.add_new_post(create_request("Eventually")).await;

        assert!(post.is_some());
        assert_eq!(repo.writes(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_new_post_gives_up_after_retries() {
        let (service, repo) = setup();
        repo.fail_next_writes(10);

        let post = service.add_new_post(create_request("Never")).await;

        assert!(post.is_none());
        assert_eq!(repo.writes(), 3);
    }

    // ==================== update_post ====================

    #[tokio::test]
    async fn test_update_post_applies_request() {
        let (service, repo) = setup();
        let original = existing_post("Before");
        repo.seed(original.clone()).await;
        let request =
            PostUpdateRequest::new("After", "New body", "Grace", Utc::now() - ChronoDuration::hours(1));

        let updated = service
            .update_post(original.post_id, request)
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.post_id, original.post_id);
        assert_eq!(updated.title, "After");
        assert_eq!(updated.author, "Grace");
        assert!(updated.updated_at.is_some());
        assert_eq!(
            service.get_posts(Some(original.post_id)).await,
            Some(vec![updated])
        );
    }

    #[tokio::test]
    async fn test_update_post_missing_is_none_without_write() {
        let (service, repo) = setup();
        let request = PostUpdateRequest::new("Title", "Body", "Ada", yesterday());

        let result = service.update_post(Uuid::new_v4(), request).await;

        assert!(result.is_none());
        assert_eq!(repo.writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_post_not_found_is_not_retried() {
        let (service, repo) = setup();
        let original = existing_post("Racing");
        repo.seed(original.clone()).await;
        repo.update_not_found.store(true, Ordering::SeqCst);
        let request = PostUpdateRequest::new("Title", "Body", "Ada", yesterday());

        let result = service.update_post(original.post_id, request).await;

        assert!(result.is_none());
        assert_eq!(repo.writes(), 1);
    }

    // ==================== delete_post ====================

    #[tokio::test]
    async fn test_delete_post_removes_post() {
        let (service, repo) = setup();
        let post = existing_post("Doomed");
        repo.seed(post.clone()).await;

        assert!(service.delete_post(post.post_id).await);
        assert_eq!(service.get_posts(Some(post.post_id)).await, Some(vec![]));
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_success() {
        let (service, _repo) = setup();

        assert!(service.delete_post(Uuid::new_v4()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_post_failure_is_false() {
        let (service, repo) = setup();
        repo.fail_next_writes(10);

        assert!(!service.delete_post(Uuid::new_v4()).await);
        assert_eq!(repo.writes(), 3);
    }

    // ==================== Cached composition ====================

    #[tokio::test]
    async fn test_cached_post_served_during_store_outage() {
        let store = InMemoryDocumentStore::new();
        let repository = Arc::new(CachedRepository::new(
            Arc::new(store.collection::<Post>()),
            Arc::new(MemoryCache::new(100)),
            Duration::from_secs(60),
        ));
        let service = PostService::new(repository, RetryExecutor::new(RetryConfig::new(0, Duration::ZERO)));

        let post = service.add_new_post(create_request("Durable")).await.unwrap();
        store.set_unavailable(true);

        assert_eq!(
            service.get_posts(Some(post.post_id)).await,
            Some(vec![post])
        );
        assert_eq!(service.get_posts(None).await, None);
    }
}
