//! Filtered semantic search (§4.H, §6 `search_documents`).

use corpus_core::{Filter, Status};
use corpus_embeddings::Embedder;
use corpus_store::{ScoredPoint, VectorStore};

use crate::error::QueryError;

/// Which collection(s) a search spans, per §6's `content_type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    All,
    Docs,
    Code,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub content_type: ContentType,
    pub metadata_filters: Option<Filter>,
}

/// Restricts a caller-supplied predicate to `status = active` when the
/// caller did not already scope `status` themselves — the default
/// predicate named in §4.H ("The default predicate restricts
/// `status = active`").
fn effective_filter(caller_filter: Option<Filter>) -> Filter {
    match caller_filter {
        Some(filter) if filter.references_field("meta.status") => filter,
        Some(filter) => Filter::and(vec![Filter::eq("meta.status", Status::Active.as_str()), filter]),
        None => Filter::eq("meta.status", Status::Active.as_str()),
    }
}

/// Runs a filtered semantic search over `collection`.
///
/// # Errors
/// Returns [`QueryError::InvalidQuery`] if `query` is empty or `top_k` is
/// out of `[1, 50]` (§6). Returns [`QueryError::Store`]/`Embedding`-wrapped
/// errors on backend or embedder failure.
pub async fn search_documents(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    request: &SearchRequest,
) -> Result<Vec<ScoredPoint>, QueryError> {
    if request.query.trim().is_empty() {
        return Err(QueryError::InvalidQuery("query must not be empty".into()));
    }
    if !(1..=50).contains(&request.top_k) {
        return Err(QueryError::InvalidQuery("top_k must be in [1, 50]".into()));
    }

    let filter = effective_filter(request.metadata_filters.clone());
    filter
        .validate_indexed(corpus_core::INDEXED_FIELDS)
        .map_err(|e| QueryError::Store(corpus_store::StoreError::IndexRequired(e.to_string())))?;

    let vectors = embedder.embed(std::slice::from_ref(&request.query)).await.map_err(corpus_ingest::IngestError::from)?;
    let query_vector = vectors.into_iter().next().ok_or_else(|| QueryError::InvalidQuery("embedder returned no vector".into()))?;

    let results = store.search(collection, &query_vector, Some(&filter), request.top_k).await?;
    Ok(results)
}

/// Looks up the active record whose `file_path` matches exactly (§6
/// `get_document_by_path`). A lookup-only scan: the zero vector sized to
/// the collection's dimensionality carries no similarity signal, the
/// filter does all the narrowing.
///
/// # Errors
/// Returns [`QueryError::NotFound`] if no active record has that path.
pub async fn get_document_by_path(
    store: &dyn VectorStore,
    collection: &str,
    file_path: &str,
    dimensions: usize,
) -> Result<(corpus_core::DocumentEnvelope, String), QueryError> {
    let filter = Filter::and(vec![
        Filter::eq("meta.file_path", file_path),
        Filter::eq("meta.status", Status::Active.as_str()),
    ]);
    let rows = store.search(collection, &vec![0.0; dimensions], Some(&filter), 1).await?;
    let row = rows.into_iter().next().ok_or_else(|| QueryError::NotFound(file_path.to_string()))?;
    Ok(corpus_ingest::decode_record(row)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_embeddings::FakeEmbedder;
    use corpus_store::memory::InMemoryVectorStore;
    use corpus_store::UpsertPoint;
    use serde_json::json;

    async fn seeded_store() -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 8).await.unwrap();
        store
            .upsert(
                "documents",
                vec![
                    UpsertPoint {
                        point_ref: "a".into(),
                        vector: vec![1.0; 8],
                        payload: json!({"doc_id": "a", "status": "active"}),
                    },
                    UpsertPoint {
                        point_ref: "b".into(),
                        vector: vec![1.0; 8],
                        payload: json!({"doc_id": "b", "status": "deprecated"}),
                    },
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let store = seeded_store().await;
        let embedder = FakeEmbedder::new(8);
        let req = SearchRequest { query: String::new(), top_k: 5, content_type: ContentType::All, metadata_filters: None };
        let err = search_documents(&store, &embedder, "documents", &req).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn default_filter_excludes_deprecated_records() {
        let store = seeded_store().await;
        let embedder = FakeEmbedder::new(8);
        let req = SearchRequest { query: "hello".into(), top_k: 10, content_type: ContentType::All, metadata_filters: None };
        let results = search_documents(&store, &embedder, "documents", &req).await.unwrap();
        assert!(results.iter().all(|r| r.payload["status"] == "active"));
    }

    #[tokio::test]
    async fn top_k_out_of_range_is_rejected() {
        let store = seeded_store().await;
        let embedder = FakeEmbedder::new(8);
        let req = SearchRequest { query: "hello".into(), top_k: 0, content_type: ContentType::All, metadata_filters: None };
        assert!(search_documents(&store, &embedder, "documents", &req).await.is_err());
    }

    #[tokio::test]
    async fn caller_supplied_status_filter_overrides_the_active_default() {
        let store = seeded_store().await;
        let embedder = FakeEmbedder::new(8);
        let req = SearchRequest {
            query: "hello".into(),
            top_k: 10,
            content_type: ContentType::All,
            metadata_filters: Some(Filter::eq("meta.status", "deprecated")),
        };
        let results = search_documents(&store, &embedder, "documents", &req).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].payload["status"], "deprecated");
    }

    #[tokio::test]
    async fn unindexed_filter_field_surfaces_index_required() {
        let store = seeded_store().await;
        let embedder = FakeEmbedder::new(8);
        let req = SearchRequest {
            query: "hello".into(),
            top_k: 5,
            content_type: ContentType::All,
            metadata_filters: Some(Filter::eq("meta.unindexed", "x")),
        };
        let err = search_documents(&store, &embedder, "documents", &req).await.unwrap_err();
        assert_eq!(err.kind(), corpus_core::ErrorKind::IndexRequired);
    }

    fn full_envelope(doc_id: &str, file_path: &str) -> corpus_core::DocumentEnvelope {
        let now = chrono::Utc::now();
        corpus_core::DocumentEnvelope {
            doc_id: doc_id.to_string(),
            version: 1,
            category: corpus_core::Category::Other,
            status: Status::Active,
            hash_content: corpus_ingest::hasher::hash_content("body"),
            metadata_hash: "m".into(),
            created_at: now,
            updated_at: now,
            file_path: Some(file_path.to_string()),
            file_hash: None,
            source: None,
            repo: None,
            tags: vec![],
            chunk: None,
        }
    }

    #[tokio::test]
    async fn get_document_by_path_finds_active_record() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 4).await.unwrap();
        let envelope = full_envelope("doc-1", "src/lib.rs");
        let mut payload = serde_json::to_value(&envelope).unwrap();
        payload["content"] = json!("body");
        store.upsert("documents", vec![UpsertPoint { point_ref: "doc-1".into(), vector: vec![1.0; 4], payload }]).await.unwrap();

        let (found, content) = get_document_by_path(&store, "documents", "src/lib.rs", 4).await.unwrap();
        assert_eq!(found.doc_id, "doc-1");
        assert_eq!(content, "body");
    }

    #[tokio::test]
    async fn get_document_by_path_missing_is_not_found() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 4).await.unwrap();
        let err = get_document_by_path(&store, "documents", "nope.rs", 4).await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound(_)));
    }
}
