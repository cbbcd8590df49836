//! Error types for signaldrop-core

use thiserror::Error;

/// Result type alias using signaldrop-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in signaldrop-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying storage medium could not be opened, read, or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report not found
    #[error("Report not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote exchange did not complete
    #[error("Sync exchange failed: {0}")]
    Exchange(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error means the storage medium itself is unusable.
    pub const fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
