use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{new_document_id, Document, Predicate};

/// A published post.
///
/// `id` is the store identity; `post_id` is the business identifier used by
/// callers and cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub post_id: Uuid,
    pub title: String,
    pub content: String,
    pub published_date: DateTime<Utc>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Creates a new post with fresh identifiers, created now.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        published_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_document_id(),
            post_id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            published_date,
            author: author.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Sets a specific store id (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets a specific business id (useful for testing).
    pub fn with_post_id(mut self, post_id: Uuid) -> Self {
        self.post_id = post_id;
        self
    }
}

impl Document for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

/// Matches the post with the given business id.
pub fn by_post_id(post_id: Uuid) -> Predicate<Post> {
    Predicate::new(move |post: &Post| post.post_id == post_id)
}
