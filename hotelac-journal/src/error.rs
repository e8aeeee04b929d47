//! Error types for the journal

use thiserror::Error;

/// Result type for journal operations
pub type JournalResult<T> = Result<T, JournalError>;

/// Journal error types
#[derive(Debug, Error)]
pub enum JournalError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Record serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Record not found
    #[error("Record {0} not found")]
    RecordNotFound(u64),

    /// Timestamp did not parse as `%Y-%m-%d %H:%M:%S`
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
