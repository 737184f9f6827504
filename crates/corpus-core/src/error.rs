//! The error taxonomy shared across every tool response.
//!
//! Every crate above `corpus-core` defines its own `thiserror::Error` enum
//! for its internal failure modes, then converges on [`ErrorKind`] at the
//! boundary where a result becomes a tool response. `CoreError` is the
//! convergence point for failures that originate in `corpus-core` itself
//! (malformed envelopes, filter validation).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of error kinds a tool response can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    InvalidMetadata,
    IndexRequired,
    NotFound,
    Conflict,
    BackendUnavailable,
    EmbeddingFailure,
    IntegrityMismatch,
    Internal,
}

impl ErrorKind {
    /// Whether a caller retrying the same request might succeed.
    #[must_use]
    pub const fn retryable(self) -> bool {
        matches!(self, Self::BackendUnavailable | Self::EmbeddingFailure)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::InvalidMetadata => "invalid_metadata",
            Self::IndexRequired => "index_required",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::BackendUnavailable => "backend_unavailable",
            Self::EmbeddingFailure => "embedding_failure",
            Self::IntegrityMismatch => "integrity_mismatch",
            Self::Internal => "internal",
        }
    }
}

/// Errors raised while building or validating an envelope, or while
/// validating a filter predicate against the indexed-field set.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("doc_id must not be empty")]
    EmptyDocId,

    #[error("filter references unindexed field {field:?}; call ensure_index first")]
    IndexRequired { field: String },

    #[error("filter predicate is malformed: {0}")]
    MalformedFilter(String),
}

impl CoreError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMetadata(_) | Self::EmptyDocId => ErrorKind::InvalidMetadata,
            Self::IndexRequired { .. } => ErrorKind::IndexRequired,
            Self::MalformedFilter(_) => ErrorKind::InvalidInput,
        }
    }

    #[must_use]
    pub const fn retryable(&self) -> bool {
        self.kind().retryable()
    }
}

/// Shape every tool response's error field takes on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ErrorPayload {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), retryable: kind.retryable() }
    }
}

impl From<&CoreError> for ErrorPayload {
    fn from(err: &CoreError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_unavailable_is_retryable() {
        assert!(ErrorKind::BackendUnavailable.retryable());
        assert!(ErrorKind::EmbeddingFailure.retryable());
    }

    #[test]
    fn invalid_input_is_not_retryable() {
        assert!(!ErrorKind::InvalidInput.retryable());
        assert!(!ErrorKind::NotFound.retryable());
    }

    #[test]
    fn core_error_maps_to_expected_kind() {
        let err = CoreError::IndexRequired { field: "meta.category".into() };
        assert_eq!(err.kind(), ErrorKind::IndexRequired);
        let payload = ErrorPayload::from(&err);
        assert_eq!(payload.kind, ErrorKind::IndexRequired);
        assert!(payload.message.contains("meta.category"));
    }
}
