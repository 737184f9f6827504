//! Export/import surface (§4.H, §6 `export_documents`/`import_documents`).
//!
//! A document is materialized as `(envelope, content, optional embedding)`
//! — the same triple `create_backup` wraps a checksum manifest around.

use corpus_core::{Filter, ImportPolicy, MetadataFragment};
use corpus_ingest::IngestionController;
use corpus_store::VectorStore;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// One exported record. The embedding is included so a backup/export
/// round-trip can restore without a second embedder call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedDocument {
    pub envelope: corpus_core::DocumentEnvelope,
    pub content: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Materializes every record matching `filter` (or every record, if
/// `None`) as `(envelope, content, embedding)` triples.
///
/// # Errors
/// Returns [`QueryError::Store`] on an unindexed filter field or backend
/// failure, or [`QueryError::Io`] if a payload doesn't decode.
pub async fn export_documents(
    store: &dyn VectorStore,
    collection: &str,
    filter: Option<&Filter>,
    dimensions: usize,
) -> Result<Vec<ExportedDocument>, QueryError> {
    if let Some(f) = filter {
        f.validate_indexed(corpus_core::INDEXED_FIELDS)
            .map_err(|e| QueryError::Store(corpus_store::StoreError::IndexRequired(e.to_string())))?;
    }
    let rows = store.search(collection, &vec![0.0; dimensions], filter, 10_000).await?;
    rows.into_iter()
        .map(|row| {
            let vector = row.vector.clone();
            let (envelope, content) = corpus_ingest::decode_record(row)?;
            Ok(ExportedDocument { envelope, content, embedding: Some(vector) })
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: u64,
    pub skipped: u64,
}

/// Replays `documents` against `collection` under `policy`.
///
/// `Skip` leaves an existing `doc_id` untouched; `Update` re-runs the
/// document through the ingestion controller, honoring the classifier
/// (§9 open question, resolved: import re-runs classification rather than
/// overwriting blindly); `Error` fails the whole import on the first
/// `doc_id` collision.
///
/// # Errors
/// Returns [`QueryError::ImportConflict`] under `Error` policy on a
/// collision, or propagates ingestion/store failures.
pub async fn import_documents(
    controller: &IngestionController,
    store: &dyn VectorStore,
    collection: &str,
    documents: &[ExportedDocument],
    policy: ImportPolicy,
) -> Result<ImportReport, QueryError> {
    let mut report = ImportReport::default();
    for doc in documents {
        let existing = store
            .count(collection, Some(&Filter::eq("meta.doc_id", &doc.envelope.doc_id)))
            .await?;
        if existing > 0 {
            match policy {
                ImportPolicy::Skip => {
                    report.skipped += 1;
                    continue;
                }
                ImportPolicy::Error => return Err(QueryError::ImportConflict(doc.envelope.doc_id.clone())),
                ImportPolicy::Update => {}
            }
        }

        let fragment = MetadataFragment {
            doc_id: Some(doc.envelope.doc_id.clone()),
            category: Some(doc.envelope.category.as_str().to_string()),
            file_path: doc.envelope.file_path.clone(),
            source: doc.envelope.source.map(|s| s.as_str().to_string()),
            repo: doc.envelope.repo.clone(),
            tags: doc.envelope.tags.clone(),
        };
        if let Some(chunk) = &doc.envelope.chunk {
            let options = corpus_ingest::ChunkingOptions { enabled: true, chunk_size: 512, chunk_overlap: 64 };
            let mut doc_fragment = fragment;
            doc_fragment.doc_id = Some(chunk.parent_doc_id.clone());
            controller.ingest_chunked_document(collection, &doc.content, &doc_fragment, options).await?;
        } else {
            controller.ingest_document(collection, &doc.content, &fragment, false).await?;
        }
        report.imported += 1;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_embeddings::FakeEmbedder;
    use corpus_store::memory::InMemoryVectorStore;
    use std::sync::Arc;

    fn fragment(doc_id: &str) -> MetadataFragment {
        MetadataFragment { doc_id: Some(doc_id.to_string()), category: Some("other".into()), file_path: None, source: None, repo: None, tags: vec![] }
    }

    #[tokio::test]
    async fn export_then_import_skip_into_fresh_collection_is_equal() {
        let store = Arc::new(InMemoryVectorStore::new());
        let controller = IngestionController::new(store.clone(), Arc::new(FakeEmbedder::new(8)));
        controller.ingest_document("documents", "hello world", &fragment("A"), false).await.unwrap();
        controller.ingest_document("documents", "goodbye world", &fragment("B"), false).await.unwrap();

        let exported = export_documents(store.as_ref(), "documents", None, 8).await.unwrap();
        assert_eq!(exported.len(), 2);

        let fresh_store = Arc::new(InMemoryVectorStore::new());
        fresh_store.ensure_collection("documents", 8).await.unwrap();
        let fresh_controller = IngestionController::new(fresh_store.clone(), Arc::new(FakeEmbedder::new(8)));
        let report = import_documents(&fresh_controller, fresh_store.as_ref(), "documents", &exported, ImportPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(report.imported, 2);

        let reexported = export_documents(fresh_store.as_ref(), "documents", None, 8).await.unwrap();
        assert_eq!(reexported.len(), exported.len());
    }

    #[tokio::test]
    async fn import_error_policy_rejects_existing_doc_id() {
        let store = Arc::new(InMemoryVectorStore::new());
        let controller = IngestionController::new(store.clone(), Arc::new(FakeEmbedder::new(8)));
        controller.ingest_document("documents", "hello", &fragment("A"), false).await.unwrap();

        let exported = export_documents(store.as_ref(), "documents", None, 8).await.unwrap();
        let err = import_documents(&controller, store.as_ref(), "documents", &exported, ImportPolicy::Error)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::ImportConflict(id) if id == "A"));
    }

    #[tokio::test]
    async fn import_skip_policy_leaves_existing_untouched() {
        let store = Arc::new(InMemoryVectorStore::new());
        let controller = IngestionController::new(store.clone(), Arc::new(FakeEmbedder::new(8)));
        controller.ingest_document("documents", "hello", &fragment("A"), false).await.unwrap();
        let exported = export_documents(store.as_ref(), "documents", None, 8).await.unwrap();

        let report = import_documents(&controller, store.as_ref(), "documents", &exported, ImportPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.imported, 0);
    }
}
