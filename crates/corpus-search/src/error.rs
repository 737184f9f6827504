//! Query/verification/bulk-surface error types.

use corpus_core::ErrorKind;
use corpus_ingest::IngestError;
use corpus_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("bulk patch rejected: {0}")]
    ForbiddenPatchField(String),

    #[error("import conflict on doc_id {0}")]
    ImportConflict(String),

    #[error("integrity mismatch: {0}")]
    IntegrityMismatch(String),

    #[error("io error: {0}")]
    Io(String),
}

impl QueryError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::Ingest(e) => e.kind(),
            Self::InvalidQuery(_) | Self::ForbiddenPatchField(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ImportConflict(_) => ErrorKind::Conflict,
            Self::IntegrityMismatch(_) => ErrorKind::IntegrityMismatch,
            Self::Io(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        self.kind().retryable()
    }
}
