//! API request types for post operations and their mapping onto [`Post`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::PostValidationError;
use super::types::Post;

/// Request payload for creating a new post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub published_date: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
}

impl PostCreateRequest {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        published_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            published_date,
            author: author.into(),
        }
    }

    /// Checks every field, returning all violations at once.
    ///
    /// A post may be published at `now` but not after it.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), Vec<PostValidationError>> {
        let mut errors = required_fields(&self.title, &self.content, &self.author);
        if self.published_date > now {
            errors.push(PostValidationError::PublishedInFuture);
        }
        into_result(errors)
    }

    /// Converts the request into a new post with fresh identifiers.
    pub fn into_post(self) -> Post {
        Post::new(self.title, self.content, self.author, self.published_date)
    }
}

/// Request payload for updating an existing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub published_date: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
}

impl PostUpdateRequest {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        published_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            published_date,
            author: author.into(),
        }
    }

    /// Checks every field, returning all violations at once.
    ///
    /// Updates require a publication date strictly before `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), Vec<PostValidationError>> {
        let mut errors = required_fields(&self.title, &self.content, &self.author);
        if self.published_date >= now {
            errors.push(PostValidationError::PublishedInFuture);
        }
        into_result(errors)
    }

    /// Applies the update to an existing post, keeping its identity.
    pub fn apply_to(self, post: &mut Post) {
        post.title = self.title;
        post.content = self.content;
        post.published_date = self.published_date;
        post.author = self.author;
        post.updated_at = Some(Utc::now());
    }
}

fn required_fields(title: &str, content: &str, author: &str) -> Vec<PostValidationError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(PostValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        errors.push(PostValidationError::EmptyContent);
    }
    if author.trim().is_empty() {
        errors.push(PostValidationError::EmptyAuthor);
    }
    errors
}

fn into_result(errors: Vec<PostValidationError>) -> Result<(), Vec<PostValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
