//! # corpus-store
//!
//! Abstraction over a vector store backend that exposes only the reduced
//! primitive surface the ingestion core actually needs: upsert, vector
//! search with a filter, filtered payload mutation, filtered delete, and
//! count. Point ids are opaque to every caller above this crate — the rest
//! of the workspace addresses records by `doc_id`/`chunk_id` and never sees
//! a backend id (§9 design note: "reduced backend primitive surface").

pub mod error;
pub mod memory;
pub mod qdrant;

use async_trait::async_trait;
use corpus_core::Filter;
pub use error::StoreError;
use serde_json::Value;

/// A point about to be written to the backend.
#[derive(Debug, Clone)]
pub struct UpsertPoint {
    /// The caller-facing identity (`doc_id` or `chunk_id`). The backend is
    /// free to derive whatever internal point id it needs from this; it is
    /// never handed back to a caller above this crate.
    pub point_ref: String,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// A result row from a vector search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub point_ref: String,
    pub score: f32,
    pub payload: Value,
    /// The point's stored vector. Populated on every search so that
    /// lookup-only scans (a zero query vector plus a narrowing filter) can
    /// recover embeddings for backup/export without a second round trip.
    pub vector: Vec<f32>,
}

/// Backend connectivity/readiness, surfaced by the `get_stats` tool.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub reachable: bool,
    pub collections: Vec<CollectionStats>,
}

#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub name: String,
    pub point_count: u64,
}

/// The reduced backend primitive surface. Both the production Qdrant
/// implementation and the in-memory test double implement this trait, so
/// the ingestion/search crates never depend on a concrete backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection if it doesn't exist, with the given vector
    /// dimensionality.
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<(), StoreError>;

    /// Creates a payload index on `field` if it doesn't already exist.
    /// Required before any filter predicate may reference `field`.
    async fn ensure_payload_index(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    /// Inserts or overwrites points, keyed by `point_ref`.
    async fn upsert(&self, collection: &str, points: Vec<UpsertPoint>) -> Result<(), StoreError>;

    /// Vector similarity search, optionally restricted by a filter
    /// predicate. Results are ordered by descending score.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&Filter>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError>;

    /// Mutates the payload of every point matching `filter`, merging `patch`
    /// into the existing payload. Returns the number of points touched.
    async fn filter_update_payload(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<u64, StoreError>;

    /// Deletes every point matching `filter`. Returns the number deleted.
    async fn filter_delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Counts points matching `filter` (or all points, if `None`).
    async fn count(&self, collection: &str, filter: Option<&Filter>) -> Result<u64, StoreError>;

    /// Hard-deletes every point in the collection. Used only by `clear_all`
    /// behind an explicit caller confirmation (§9 open question).
    async fn clear_collection(&self, collection: &str) -> Result<(), StoreError>;

    /// Connectivity and per-collection point counts for the health surface.
    async fn stats(&self, collections: &[&str]) -> StoreStats;
}
