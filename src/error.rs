//! Error types for Halal Blob.

use thiserror::Error;

use crate::storage::PathError;

/// Common error type for Halal Blob.
#[derive(Error, Debug)]
pub enum BlobError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected path or folder input.
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Metadata (de)serialization error.
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Halal Blob operations.
pub type Result<T> = std::result::Result<T, BlobError>;
