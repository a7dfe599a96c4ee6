//! Error types for session storage.

use std::path::PathBuf;

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The storage file could not be read or written.
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
