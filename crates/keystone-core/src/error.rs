//! Error types for storage operations

use thiserror::Error;

/// Result type for storage operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in storage operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Contact message not found
    #[error("contact message not found: {0}")]
    ContactNotFound(i64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Database(e.to_string())
    }
}
