use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Returns true if repeating the failed operation could succeed.
    ///
    /// A missing document stays missing, so `NotFound` is the only variant
    /// excluded from retries.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RepositoryError::NotFound { .. })
    }

    /// Returns true for connectivity and contention failures.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RepositoryError::ConnectionFailed(_) | RepositoryError::QueryFailed(_)
        )
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
