use thiserror::Error;

/// Validation failures for post requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    #[error("Title is required.")]
    EmptyTitle,
    #[error("Content is required.")]
    EmptyContent,
    #[error("Author is required.")]
    EmptyAuthor,
    #[error("Published date cannot be in the future.")]
    PublishedInFuture,
}

impl PostValidationError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            PostValidationError::EmptyTitle => "title",
            PostValidationError::EmptyContent => "content",
            PostValidationError::EmptyAuthor => "author",
            PostValidationError::PublishedInFuture => "publishedDate",
        }
    }
}
