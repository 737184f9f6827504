//! # corpus-embeddings
//!
//! Local embedding generation using fastembed (ONNX runtime). Generates
//! dense vectors for document content and chunk text without requiring an
//! external API key.
//!
//! The spec leaves embedder thread-safety implementation-defined (§5); we
//! wrap the synchronous `fastembed` model in a `tokio::sync::Mutex` and run
//! calls on the blocking thread pool, the same pattern the teacher notes for
//! calling a synchronous ONNX/duckdb client from an async pipeline.

pub mod error;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
pub use error::EmbeddingError;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

/// Abstraction over "turn text into vectors", so the ingestion controller
/// and tests don't depend on a concrete embedding backend.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a batch of texts, returning one vector per input in order.
    ///
    /// # Errors
    /// Returns [`EmbeddingError`] if the backend fails or returns a vector
    /// count that doesn't match the input count.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Dimensionality of vectors this embedder produces.
    fn dimensions(&self) -> usize;
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".corpus").join("cache").join("fastembed")
}

/// Resolves the closed set of model identifiers `corpus-config` accepts
/// into a `fastembed` model + its known output dimensionality. Falls back
/// to `AllMiniLML6V2` for anything outside the set rather than failing —
/// the embedder stays usable while an operator fixes their config.
fn resolve_model(model_id: &str) -> (EmbeddingModel, usize) {
    match model_id {
        "BAAI/bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
        "BAAI/bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
        "sentence-transformers/all-MiniLM-L6-v2" => (EmbeddingModel::AllMiniLML6V2, 384),
        _ => (EmbeddingModel::AllMiniLML6V2, 384),
    }
}

/// `fastembed`-backed embedder, resolving `corpus-config`'s `model_id`
/// string against the known-dimension table above.
pub struct FastEmbedEmbedder {
    model: Arc<std::sync::Mutex<TextEmbedding>>,
    dimensions: usize,
}

impl FastEmbedEmbedder {
    /// Loads `model_id`, downloading it into `cache_dir` (or the default
    /// `~/.corpus/cache/fastembed/`) on first run.
    ///
    /// # Errors
    /// Returns [`EmbeddingError::InitFailed`] if the model fails to load.
    pub fn load(model_id: &str, cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let (model_kind, dimensions) = resolve_model(model_id);
        let opts = TextInitOptions::new(model_kind)
            .with_cache_dir(cache_dir.unwrap_or_else(default_cache_dir))
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(opts).map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;
        Ok(Self { model: Arc::new(std::sync::Mutex::new(model)), dimensions })
    }
}

#[async_trait]
impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let texts = texts.to_vec();
        let requested = texts.len();
        let model = Arc::clone(&self.model);

        let result = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().expect("embedding model mutex poisoned");
            model.embed(texts, None)
        })
        .await
        .map_err(|e| EmbeddingError::JoinFailed(e.to_string()))?
        .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))?;

        if result.len() != requested {
            return Err(EmbeddingError::CountMismatch { requested, got: result.len() });
        }
        Ok(result)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Deterministic fake embedder for tests — hashes each text into a small
/// fixed-size vector so identical inputs produce identical vectors and
/// different inputs produce (very likely) different ones, without pulling
/// in the ONNX runtime.
pub struct FakeEmbedder {
    dimensions: usize,
}

impl FakeEmbedder {
    #[must_use]
    pub const fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| fake_vector(t, self.dimensions)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn fake_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut seed: u64 = 1469598103934665603; // FNV offset basis
    for byte in text.bytes() {
        seed ^= u64::from(byte);
        seed = seed.wrapping_mul(1099511628211); // FNV prime
    }
    (0..dimensions)
        .map(|i| {
            let mixed = seed.wrapping_add(i as u64).wrapping_mul(2654435761);
            // Scale into roughly [-1.0, 1.0].
            (mixed % 2000) as f32 / 1000.0 - 1.0
        })
        .collect()
}
