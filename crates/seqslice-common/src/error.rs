//! Error types for seqslice.

use thiserror::Error;

/// Result type alias for seqslice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for seqslice.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A locator did not resolve to an object
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object carries no recognizable record structure
    #[error("Format error: {0}")]
    Format(String),

    /// An operation requires preprocessing that has not run
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Illegal caller-supplied parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violations
    #[error("Internal error: {0}")]
    Internal(String),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
