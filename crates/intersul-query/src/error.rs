//! Error types for query operations.

/// Error returned by a cached fetch.
#[derive(Debug, thiserror::Error)]
pub enum QueryError<E> {
    /// The fetch was cancelled (e.g. by an optimistic mutation on its
    /// prefix) and its result was discarded.
    #[error("Query cancelled")]
    Cancelled,

    /// The fetcher failed.
    #[error(transparent)]
    Fetch(E),

    /// A cached value did not match the requested type.
    #[error("Cached value could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl<E> QueryError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueryError::Cancelled)
    }

    /// The fetcher's error, if that is what failed.
    pub fn into_fetch(self) -> Option<E> {
        match self {
            QueryError::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for query operations.
pub type Result<T, E> = std::result::Result<T, QueryError<E>>;
