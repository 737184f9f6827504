//! The convergence point for every internal error on its way to a tool
//! response (§7: "every tool returns a single JSON object; on error, no
//! partial content is included beyond the taxonomy fields").

use corpus_core::{ErrorKind, ErrorPayload};
use corpus_ingest::IngestError;
use corpus_search::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] corpus_config::ConfigError),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("io error: {0}")]
    Io(String),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ingest(e) => e.kind(),
            Self::Query(e) => e.kind(),
            Self::Config(_) | Self::MalformedRequest(_) | Self::UnknownTool(_) => ErrorKind::InvalidInput,
            Self::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<&ServiceError> for ErrorPayload {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
