//! Component G — ingestion controller (§4.G).
//!
//! The sole caller of the embedder and the only component that issues
//! writes. Orchestrates A–F and returns an action report. Holds a
//! per-`doc_id` lock stripe (§5, §9 supplement) so concurrent writes to
//! the same logical document serialize instead of racing.

use std::sync::Arc;

use corpus_core::{DuplicateLevel, Filter, IngestAction, MetadataFragment};
use corpus_embeddings::Embedder;
use corpus_store::{UpsertPoint, VectorStore};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use crate::chunker::{self, ChunkPiece};
use crate::classifier::{self, Candidate};
use crate::diff::{self, ChunkDiffCounts};
use crate::error::IngestError;
use crate::hasher;
use crate::metadata;
use crate::versioning;

/// Chunking options a caller may request on a whole-document write (§6:
/// `{enable_chunking, chunk_size, chunk_overlap}`).
#[derive(Debug, Clone, Copy)]
pub struct ChunkingOptions {
    pub enabled: bool,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self { enabled: false, chunk_size: 512, chunk_overlap: 64 }
    }
}

/// Result of a whole-document (non-chunked) write.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub action: IngestAction,
    pub duplicate_level: DuplicateLevel,
    pub deprecated: bool,
    pub new_point_reference: Option<String>,
}

/// Result of a chunked write.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkedIngestReport {
    #[serde(flatten)]
    pub counts: ChunkDiffCounts,
}

/// Ties components A–F together over a shared store and embedder. Owns a
/// per-`doc_id` lock stripe so two concurrent writes to the same document
/// serialize rather than racing (§5's documented weakness, addressed per
/// the REDESIGN recommendation).
pub struct IngestionController {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl IngestionController {
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder, locks: DashMap::new() }
    }

    fn lock_for(&self, doc_id: &str) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.locks.entry(doc_id.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))))
    }

    /// Ingests a whole document (no chunking). Mirrors §4.G step 2.
    ///
    /// # Errors
    /// Returns [`IngestError`] on malformed metadata, embedder failure, or
    /// backend failure.
    pub async fn ingest_document(
        &self,
        collection: &str,
        content: &str,
        fragment: &MetadataFragment,
        similarity_hit: bool,
    ) -> Result<IngestReport, IngestError> {
        let doc_id = fragment
            .doc_id
            .clone()
            .or_else(|| fragment.file_path.clone())
            .ok_or_else(|| IngestError::InvalidMetadata("doc_id must not be empty".into()))?;
        let lock = self.lock_for(&doc_id);
        let _guard = lock.lock().await;

        let hash_content = hasher::hash_content(content);
        let existing = self.query_existing_by_doc_id(collection, &doc_id).await?;
        let envelope = metadata::build_whole_document(fragment, hash_content.clone(), next_version(&existing))?;

        let classification = classifier::classify(
            &Candidate { doc_id: &doc_id, hash_content: &hash_content, metadata_hash: &envelope.metadata_hash },
            &existing,
            similarity_hit,
        );
        let action = classification.level.action();

        let mut deprecated = false;
        if matches!(classification.level, DuplicateLevel::ContentUpdate) {
            if let Some(matched_hash) = &classification.matched_hash_content {
                versioning::deprecate(self.store.as_ref(), collection, matched_hash).await?;
                deprecated = true;
                tracing::debug!(doc_id = %doc_id, %collection, "deprecated prior version on content update");
            }
        }

        let new_point_reference = if matches!(action, IngestAction::Store | IngestAction::Update | IngestAction::Warn) {
            let vector = self.embed_one(content).await?;
            let payload = envelope_payload(&envelope, content)?;
            // `point_ref` must be unique per version, not per `doc_id` (§3:
            // "not unique across versions") — otherwise this upsert would
            // silently overwrite the record `deprecate` just wrote above,
            // in the same backend slot, erasing the history invariant 5
            // requires. `hash_content` is guaranteed unique per version.
            let point_ref = version_point_ref(&envelope.doc_id, &hash_content);
            self.store.upsert(collection, vec![UpsertPoint { point_ref, vector, payload }]).await?;
            tracing::info!(doc_id = %doc_id, %collection, ?action, version = envelope.version, "ingested document");
            Some(envelope.doc_id.clone())
        } else {
            tracing::debug!(doc_id = %doc_id, %collection, ?action, "skipped write, no content change");
            None
        };

        Ok(IngestReport { action, duplicate_level: classification.level, deprecated, new_point_reference })
    }

    /// Ingests a document with chunking enabled. Mirrors §4.G step 3.
    ///
    /// # Errors
    /// Returns [`IngestError`] on malformed metadata, embedder failure, or
    /// backend failure.
    pub async fn ingest_chunked_document(
        &self,
        collection: &str,
        content: &str,
        fragment: &MetadataFragment,
        options: ChunkingOptions,
    ) -> Result<ChunkedIngestReport, IngestError> {
        let doc_id = fragment
            .doc_id
            .clone()
            .or_else(|| fragment.file_path.clone())
            .ok_or_else(|| IngestError::InvalidMetadata("doc_id must not be empty".into()))?;
        let lock = self.lock_for(&doc_id);
        let _guard = lock.lock().await;

        let pieces = chunker::split(content, options.chunk_size, options.chunk_overlap);
        let existing_chunks = self.query_existing_chunks_by_parent(collection, &doc_id).await?;
        let (entries, counts) = diff::diff(&existing_chunks, &pieces);

        // Deprecation is ordered strictly before the replacement chunk's
        // embedding becomes observable (§5 ordering guarantee).
        for entry in &entries {
            if matches!(entry.action, corpus_core::ChunkAction::Changed | corpus_core::ChunkAction::Removed) {
                if let Some(old) = &entry.old {
                    versioning::deprecate(self.store.as_ref(), collection, &old.hash_content).await?;
                }
            }
        }

        let to_embed: Vec<&ChunkPiece> = entries
            .iter()
            .filter(|e| matches!(e.action, corpus_core::ChunkAction::Changed | corpus_core::ChunkAction::Added))
            .filter_map(|e| e.new.as_ref())
            .collect();

        if !to_embed.is_empty() {
            let texts: Vec<String> = to_embed.iter().map(|p| p.content.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            let mut points = Vec::with_capacity(to_embed.len());
            for (piece, vector) in to_embed.iter().zip(vectors) {
                let chunk_id = chunker::stable_chunk_id(&doc_id, piece.chunk_index);
                let prior = entries
                    .iter()
                    .find(|e| e.new.as_ref().is_some_and(|n| n.chunk_index == piece.chunk_index))
                    .and_then(|e| e.old.as_ref());
                let envelope = metadata::build_chunk(
                    fragment,
                    piece.hash_content.clone(),
                    next_version_after(prior),
                    chunk_id.clone(),
                    piece.chunk_index,
                    doc_id.clone(),
                    counts.total_chunks,
                )?;
                let payload = envelope_payload(&envelope, &piece.content)?;
                // Same reasoning as the whole-document path: the chunk's
                // backend point_ref must vary with its content, or a
                // `changed` chunk's upsert overwrites the slot the
                // deprecation above just marked, erasing it instead of
                // retaining it per invariant 5.
                let point_ref = version_point_ref(&chunk_id, &piece.hash_content);
                points.push(UpsertPoint { point_ref, vector, payload });
            }
            self.store.upsert(collection, points).await?;
            tracing::info!(doc_id = %doc_id, %collection, changed = counts.changed, added = counts.added, removed = counts.removed, "ingested chunked document");
        }

        Ok(ChunkedIngestReport { counts })
    }

    async fn embed_one(&self, content: &str) -> Result<Vec<f32>, IngestError> {
        let vectors = self.embedder.embed(std::slice::from_ref(&content.to_string())).await?;
        vectors.into_iter().next().ok_or_else(|| IngestError::InvalidMetadata("embedder returned no vector".into()))
    }

    async fn query_existing_by_doc_id(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Vec<corpus_core::DocumentEnvelope>, IngestError> {
        let filter = Filter::eq("meta.doc_id", doc_id);
        let rows = self.store.search(collection, &self.zero_vector(), Some(&filter), 256).await?;
        decode_envelopes(rows)
    }

    async fn query_existing_chunks_by_parent(
        &self,
        collection: &str,
        parent_doc_id: &str,
    ) -> Result<Vec<corpus_core::DocumentEnvelope>, IngestError> {
        let filter = Filter::eq("meta.parent_doc_id", parent_doc_id);
        let rows = self.store.search(collection, &self.zero_vector(), Some(&filter), 4096).await?;
        decode_envelopes(rows)
    }

    /// A lookup-only search (no vector similarity intended) uses a zero
    /// vector matching the embedder's dimensionality; callers pass a
    /// filter that narrows the result to the exact set they need, so
    /// ranking by similarity is irrelevant here.
    fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.embedder.dimensions()]
    }
}

/// Builds the backend-facing point identity for one version of `identity`
/// (a `doc_id` or `chunk_id`). Combining the logical identity with its
/// `hash_content` keeps every version's upsert addressed to its own slot,
/// so deprecated versions are never overwritten by their successor.
fn version_point_ref(identity: &str, hash_content: &str) -> String {
    format!("{identity}:{hash_content}")
}

fn decode_envelopes(rows: Vec<corpus_store::ScoredPoint>) -> Result<Vec<corpus_core::DocumentEnvelope>, IngestError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row.payload).map_err(|e| IngestError::InvalidMetadata(e.to_string())))
        .collect()
}

/// Serializes `envelope` to the flat payload shape the store expects, with
/// `content` folded in under a top-level `content` key alongside the
/// envelope fields — the payload is the only place content is persisted,
/// since the store's point id is opaque and carries no text of its own.
fn envelope_payload(envelope: &corpus_core::DocumentEnvelope, content: &str) -> Result<serde_json::Value, IngestError> {
    let mut payload =
        serde_json::to_value(envelope).map_err(|e| IngestError::InvalidMetadata(e.to_string()))?;
    if let serde_json::Value::Object(map) = &mut payload {
        map.insert("content".to_string(), serde_json::Value::String(content.to_string()));
    }
    Ok(payload)
}

/// Splits a payload row back into its envelope and stored content. Public
/// so `corpus-search`'s read surface (export, audit, `get_document_by_path`)
/// can decode rows without duplicating the `content` key convention.
///
/// # Errors
/// Returns [`IngestError::InvalidMetadata`] if the payload doesn't decode
/// into a [`corpus_core::DocumentEnvelope`].
pub fn decode_record(row: corpus_store::ScoredPoint) -> Result<(corpus_core::DocumentEnvelope, String), IngestError> {
    let content = row.payload.get("content").and_then(serde_json::Value::as_str).unwrap_or_default().to_string();
    let envelope: corpus_core::DocumentEnvelope =
        serde_json::from_value(row.payload).map_err(|e| IngestError::InvalidMetadata(e.to_string()))?;
    Ok((envelope, content))
}

/// Version markers are a monotone counter per §3 ("monotone version marker
/// (timestamp string or caller value)"), one past the highest version seen
/// among `existing` records sharing this `doc_id` (any status, since a
/// deprecated prior version still counts toward the sequence).
fn next_version(existing: &[corpus_core::DocumentEnvelope]) -> u32 {
    existing.iter().map(|e| e.version).max().map_or(1, |v| v + 1)
}

/// Same as [`next_version`] but for a single chunk slot, where `prior` is
/// the chunk record previously occupying that index (if any).
fn next_version_after(prior: Option<&corpus_core::DocumentEnvelope>) -> u32 {
    prior.map_or(1, |e| e.version + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_embeddings::FakeEmbedder;
    use corpus_store::memory::InMemoryVectorStore;

    fn controller() -> IngestionController {
        IngestionController::new(Arc::new(InMemoryVectorStore::new()), Arc::new(FakeEmbedder::new(8)))
    }

    fn fragment(doc_id: &str) -> MetadataFragment {
        MetadataFragment {
            doc_id: Some(doc_id.to_string()),
            category: Some("other".to_string()),
            file_path: None,
            source: None,
            repo: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn exact_duplicate_is_skipped() {
        let ctrl = controller();
        let f = fragment("A");
        let first = ctrl.ingest_document("documents", "hello", &f, false).await.unwrap();
        assert_eq!(first.action, IngestAction::Store);

        let second = ctrl.ingest_document("documents", "hello", &f, false).await.unwrap();
        assert_eq!(second.action, IngestAction::Skip);
        assert_eq!(second.duplicate_level, DuplicateLevel::Exact);
    }

    #[tokio::test]
    async fn content_update_deprecates_prior_and_stores_new() {
        let ctrl = controller();
        let f = fragment("A");
        ctrl.ingest_document("documents", "v1", &f, false).await.unwrap();
        let second = ctrl.ingest_document("documents", "v2", &f, false).await.unwrap();

        assert_eq!(second.action, IngestAction::Update);
        assert!(second.deprecated);

        let active_filter = Filter::and(vec![
            Filter::eq("meta.doc_id", "A"),
            Filter::eq("meta.status", "active"),
        ]);
        let deprecated_filter = Filter::and(vec![
            Filter::eq("meta.doc_id", "A"),
            Filter::eq("meta.status", "deprecated"),
        ]);
        let store: &dyn VectorStore = ctrl.store.as_ref();
        let active = store.search("documents", &[0.0; 8], Some(&active_filter), 10).await.unwrap();
        let deprecated = store.search("documents", &[0.0; 8], Some(&deprecated_filter), 10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(deprecated.len(), 1);
    }

    #[tokio::test]
    async fn version_increments_across_content_updates() {
        let ctrl = controller();
        let f = fragment("A");
        ctrl.ingest_document("documents", "v1", &f, false).await.unwrap();
        ctrl.ingest_document("documents", "v2", &f, false).await.unwrap();
        ctrl.ingest_document("documents", "v3", &f, false).await.unwrap();

        let active_filter = Filter::and(vec![Filter::eq("meta.doc_id", "A"), Filter::eq("meta.status", "active")]);
        let store: &dyn VectorStore = ctrl.store.as_ref();
        let active = store.search("documents", &[0.0; 8], Some(&active_filter), 10).await.unwrap();
        let (envelope, _) = crate::decode_record(active.into_iter().next().unwrap()).unwrap();
        assert_eq!(envelope.version, 3);
    }

    #[tokio::test]
    async fn chunked_partial_update_reembeds_only_changed_chunk() {
        let ctrl = controller();
        let f = fragment("doc-big");
        let first_content = format!("{}\n\n{}\n\n{}", "alpha ".repeat(80), "bravo ".repeat(80), "charlie ".repeat(80));
        let opts = ChunkingOptions { enabled: true, chunk_size: 80, chunk_overlap: 0 };
        let first = ctrl.ingest_chunked_document("documents", &first_content, &f, opts).await.unwrap();
        assert_eq!(first.counts.added, first.counts.total_chunks);

        let second_content =
            format!("{}\n\n{}\n\n{}", "alpha ".repeat(80), "bravo-modified ".repeat(80), "charlie ".repeat(80));
        let second = ctrl.ingest_chunked_document("documents", &second_content, &f, opts).await.unwrap();
        assert_eq!(second.counts.changed, 1);
        assert_eq!(second.counts.added, 0);
        assert_eq!(second.counts.removed, 0);
    }
}
