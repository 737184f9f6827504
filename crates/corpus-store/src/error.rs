//! Vector store error types.

use corpus_core::ErrorKind;

/// Errors from the vector store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend (Qdrant) rejected the request or could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A collection referenced by a call does not exist.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// A point referenced by a call does not exist.
    #[error("point not found: {0}")]
    PointNotFound(String),

    /// The filter predicate referenced a field without a payload index.
    #[error("field not indexed: {0}")]
    IndexRequired(String),

    /// The backend returned a response we could not decode.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

impl StoreError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::BackendUnavailable,
            Self::CollectionNotFound(_) | Self::PointNotFound(_) => ErrorKind::NotFound,
            Self::IndexRequired(_) => ErrorKind::IndexRequired,
            Self::MalformedResponse(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        self.kind().retryable()
    }
}
