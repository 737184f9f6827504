//! Document/point-level mutation: content replacement, deletion, and the
//! dangerous whole-collection clear (§4.H, §6 `update_document`/
//! `delete_document`/`delete_by_filter`/`clear_all`).

use corpus_core::{Filter, MetadataFragment};
use corpus_ingest::{IngestReport, IngestionController};
use corpus_store::VectorStore;

use crate::error::QueryError;

/// Replaces the content of the record addressed by `point_reference`,
/// re-running the full ingestion pipeline — including the duplicate
/// classifier — rather than overwriting in place (§9 open question:
/// import's `update` policy, and this tool, both re-run the classifier).
///
/// # Errors
/// Propagates [`corpus_ingest::IngestError`] via [`QueryError::Ingest`].
pub async fn update_document(
    controller: &IngestionController,
    collection: &str,
    point_reference: &str,
    content: &str,
    metadata_updates: MetadataFragment,
) -> Result<IngestReport, QueryError> {
    let mut fragment = metadata_updates;
    fragment.doc_id = Some(point_reference.to_string());
    Ok(controller.ingest_document(collection, content, &fragment, false).await?)
}

/// Deletes the record addressed by `point_reference`. Returns the number
/// of points deleted (0 or 1; chunked documents are deleted chunk by
/// chunk via `delete_by_filter` on `meta.parent_doc_id` instead).
pub async fn delete_document(store: &dyn VectorStore, collection: &str, point_reference: &str) -> Result<u64, QueryError> {
    let filter = Filter::eq("meta.doc_id", point_reference);
    Ok(store.filter_delete(collection, &filter).await?)
}

/// Deletes every record matching `filter`.
///
/// # Errors
/// Returns [`QueryError::Store`] wrapping [`corpus_store::StoreError::IndexRequired`]
/// if `filter` references an unindexed field.
pub async fn delete_by_filter(store: &dyn VectorStore, collection: &str, filter: &Filter) -> Result<u64, QueryError> {
    filter
        .validate_indexed(corpus_core::INDEXED_FIELDS)
        .map_err(|e| QueryError::Store(corpus_store::StoreError::IndexRequired(e.to_string())))?;
    Ok(store.filter_delete(collection, filter).await?)
}

/// Hard-deletes every record in `collection`. The source hard-deletes and
/// this specification keeps that behavior, but requires an explicit
/// `confirmed` flag at the tool surface (§9 open question).
///
/// # Errors
/// Returns [`QueryError::InvalidQuery`] if `confirmed` is `false`.
pub async fn clear_all(store: &dyn VectorStore, collection: &str, confirmed: bool) -> Result<(), QueryError> {
    if !confirmed {
        return Err(QueryError::InvalidQuery("clear_all requires explicit confirmation".into()));
    }
    store.clear_collection(collection).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_embeddings::FakeEmbedder;
    use corpus_store::memory::InMemoryVectorStore;
    use corpus_store::UpsertPoint;
    use serde_json::json;
    use std::sync::Arc;

    fn fragment(doc_id: &str) -> MetadataFragment {
        MetadataFragment { doc_id: Some(doc_id.to_string()), category: Some("other".into()), file_path: None, source: None, repo: None, tags: vec![] }
    }

    #[tokio::test]
    async fn update_document_replaces_content_via_classifier() {
        let controller = IngestionController::new(Arc::new(InMemoryVectorStore::new()), Arc::new(FakeEmbedder::new(8)));
        controller.ingest_document("documents", "v1", &fragment("A"), false).await.unwrap();

        let report = update_document(&controller, "documents", "A", "v2", MetadataFragment::default()).await.unwrap();
        assert_eq!(report.action, corpus_core::IngestAction::Update);
        assert!(report.deprecated);
    }

    #[tokio::test]
    async fn clear_all_requires_confirmation() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store.upsert("documents", vec![UpsertPoint { point_ref: "a".into(), vector: vec![1.0, 0.0], payload: json!({}) }]).await.unwrap();

        let err = clear_all(&store, "documents", false).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidQuery(_)));
        assert_eq!(store.count("documents", None).await.unwrap(), 1);

        clear_all(&store, "documents", true).await.unwrap();
        assert_eq!(store.count("documents", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_document_removes_only_the_matching_point() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store
            .upsert(
                "documents",
                vec![
                    UpsertPoint { point_ref: "a".into(), vector: vec![1.0, 0.0], payload: json!({"doc_id": "a"}) },
                    UpsertPoint { point_ref: "b".into(), vector: vec![1.0, 0.0], payload: json!({"doc_id": "b"}) },
                ],
            )
            .await
            .unwrap();

        let deleted = delete_document(&store, "documents", "a").await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.count("documents", None).await.unwrap(), 1);
    }
}
