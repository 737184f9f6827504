//! Errors raised by the ingestion pipeline.

use corpus_core::ErrorKind;
use corpus_embeddings::EmbeddingError;
use corpus_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("record not found: {0}")]
    NotFound(String),
}

impl From<corpus_core::CoreError> for IngestError {
    fn from(err: corpus_core::CoreError) -> Self {
        match err.kind() {
            ErrorKind::IndexRequired => {
                Self::Store(StoreError::IndexRequired(err.to_string()))
            }
            _ => Self::InvalidMetadata(err.to_string()),
        }
    }
}

impl IngestError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMetadata(_) => ErrorKind::InvalidMetadata,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Store(e) => e.kind(),
            Self::Embedding(_) => ErrorKind::EmbeddingFailure,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        self.kind().retryable()
    }
}
