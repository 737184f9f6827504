//! Embedding error types.

use corpus_core::ErrorKind;

/// Errors that can occur during embedding generation.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Model initialization failed (download, ONNX runtime, cache issues).
    #[error("model initialization failed: {0}")]
    InitFailed(String),

    /// Embedding generation failed (inference error, invalid input).
    #[error("embedding generation failed: {0}")]
    EmbedFailed(String),

    /// Model returned a different number of embeddings than inputs.
    #[error("embedding count mismatch: requested {requested}, got {got}")]
    CountMismatch { requested: usize, got: usize },

    /// The blocking task the embedder ran on panicked or was cancelled.
    #[error("embedding task join failed: {0}")]
    JoinFailed(String),
}

impl EmbeddingError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::EmbeddingFailure
    }
}
