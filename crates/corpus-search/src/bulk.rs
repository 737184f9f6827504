//! Bulk / single-record metadata mutation (§4.H "Bulk metadata mutation").
//!
//! A patch may touch only declared metadata fields — never content,
//! fingerprints, or chunk identity. Content changes always flow through
//! the ingestion controller (§3 "Lifecycle"), never through this surface.

use corpus_core::Filter;
use corpus_store::VectorStore;
use serde_json::Value;

use crate::error::QueryError;

/// Fields a metadata patch must never touch, regardless of caller intent.
pub const FORBIDDEN_PATCH_FIELDS: &[&str] =
    &["doc_id", "hash_content", "metadata_hash", "chunk_id", "chunk_index", "parent_doc_id", "total_chunks", "is_chunk"];

fn reject_forbidden_fields(patch: &Value) -> Result<(), QueryError> {
    let Value::Object(map) = patch else {
        return Err(QueryError::InvalidQuery("metadata patch must be a JSON object".into()));
    };
    if let Some(field) = map.keys().find(|k| FORBIDDEN_PATCH_FIELDS.contains(&k.as_str())) {
        return Err(QueryError::ForbiddenPatchField(field.clone()));
    }
    Ok(())
}

/// Applies `patch` to every record matching `filter`. Returns the number of
/// records touched.
///
/// # Errors
/// Returns [`QueryError::ForbiddenPatchField`] if `patch` names a field
/// outside the declared-metadata surface, or a store/index error.
pub async fn bulk_update_metadata(
    store: &dyn VectorStore,
    collection: &str,
    filter: &Filter,
    patch: Value,
) -> Result<u64, QueryError> {
    reject_forbidden_fields(&patch)?;
    filter
        .validate_indexed(corpus_core::INDEXED_FIELDS)
        .map_err(|e| QueryError::Store(corpus_store::StoreError::IndexRequired(e.to_string())))?;
    Ok(store.filter_update_payload(collection, filter, patch).await?)
}

/// Applies `patch` to the single record addressed by `point_reference`
/// (`doc_id` for a whole document, `chunk_id` for a chunk — both live in
/// the envelope's `doc_id` field, per §9 point-reference opacity).
///
/// # Errors
/// Same as [`bulk_update_metadata`].
pub async fn update_metadata(
    store: &dyn VectorStore,
    collection: &str,
    point_reference: &str,
    patch: Value,
) -> Result<u64, QueryError> {
    let filter = Filter::eq("meta.doc_id", point_reference);
    bulk_update_metadata(store, collection, &filter, patch).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_store::memory::InMemoryVectorStore;
    use corpus_store::UpsertPoint;
    use serde_json::json;

    async fn seeded_store() -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store
            .upsert(
                "documents",
                vec![UpsertPoint {
                    point_ref: "doc-1".into(),
                    vector: vec![1.0, 0.0],
                    payload: json!({"doc_id": "doc-1", "status": "active", "tags": []}),
                }],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn patch_touching_hash_content_is_rejected() {
        let store = seeded_store().await;
        let err = update_metadata(&store, "documents", "doc-1", json!({"hash_content": "evil"}))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenPatchField(field) if field == "hash_content"));
    }

    #[tokio::test]
    async fn patch_touching_doc_id_is_rejected() {
        let store = seeded_store().await;
        let err = update_metadata(&store, "documents", "doc-1", json!({"doc_id": "evil"})).await.unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenPatchField(_)));
    }

    #[tokio::test]
    async fn allowed_patch_field_is_applied() {
        let store = seeded_store().await;
        let touched = update_metadata(&store, "documents", "doc-1", json!({"tags": ["reviewed"]})).await.unwrap();
        assert_eq!(touched, 1);
        let rows = store.search("documents", &[1.0, 0.0], None, 10).await.unwrap();
        assert_eq!(rows[0].payload["tags"], json!(["reviewed"]));
    }

    #[tokio::test]
    async fn bulk_update_rejects_unindexed_filter_field() {
        let store = seeded_store().await;
        let err = bulk_update_metadata(&store, "documents", &Filter::eq("meta.unindexed", "x"), json!({"tags": []}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), corpus_core::ErrorKind::IndexRequired);
    }
}
