//! Error types for object storage operations.

use seqslice_common::Error as SeqsliceError;
use thiserror::Error;

/// Result type for object storage operations
pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Error types for object storage operations
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    /// Object not found
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// Access denied (authentication/authorization failure)
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Network/connectivity error
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Invalid object key
    #[error("Invalid key: {key} - {reason}")]
    InvalidKey { key: String, reason: String },

    /// Read error
    #[error("Read error for key {key}: {details}")]
    ReadError { key: String, details: String },

    /// Write error
    #[error("Write error for key {key}: {details}")]
    WriteError { key: String, details: String },

    /// List error
    #[error("List error for prefix {prefix}: {details}")]
    ListError { prefix: String, details: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}

impl From<ObjectStoreError> for SeqsliceError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::NotFound { key } => SeqsliceError::NotFound(key),
            ObjectStoreError::InvalidConfiguration { message } => {
                SeqsliceError::Configuration(message)
            }
            ObjectStoreError::Io(io_err) => SeqsliceError::Io(io_err),
            other => SeqsliceError::Storage(other.to_string()),
        }
    }
}
