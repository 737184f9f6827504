//! Component E — versioning/deprecation engine (§4.E).
//!
//! Deprecation is expressed as a filter-based payload mutation keyed
//! exclusively on `hash_content`, the only identifier the backend can
//! safely reference without leaking its internal point id (§9: "backend
//! point-id opacity"). Refuses to run without a `hash_content`.

use chrono::Utc;
use corpus_core::{Filter, Status};
use corpus_store::VectorStore;
use serde_json::json;

use crate::error::IngestError;

/// Transitions the record whose `hash_content` matches `hash_content` from
/// `active`/`draft` to `deprecated`, updating `updated_at`. Idempotent:
/// deprecating an already-deprecated record is a no-op success.
///
/// # Errors
/// Returns [`IngestError::InvalidInput`] if `hash_content` is empty — the
/// engine refuses to operate on any other identifier (boundary scenario 7,
/// §8). Returns [`IngestError::Store`] if the backend call fails.
pub async fn deprecate(
    store: &dyn VectorStore,
    collection: &str,
    hash_content: &str,
) -> Result<u64, IngestError> {
    if hash_content.trim().is_empty() {
        return Err(IngestError::InvalidInput("deprecate requires a non-empty hash_content".into()));
    }

    let filter = Filter::eq("meta.hash_content", hash_content);
    let patch = json!({
        "status": Status::Deprecated,
        "updated_at": Utc::now(),
    });
    let touched = store.filter_update_payload(collection, &filter, patch).await?;
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_store::memory::InMemoryVectorStore;
    use corpus_store::UpsertPoint;
    use serde_json::json;

    #[tokio::test]
    async fn deprecate_requires_hash_content() {
        let store = InMemoryVectorStore::new();
        let err = deprecate(&store, "documents", "").await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn deprecate_sets_status_and_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store
            .upsert(
                "documents",
                vec![UpsertPoint {
                    point_ref: "doc-1".into(),
                    vector: vec![1.0, 0.0],
                    payload: json!({"hash_content": "h1", "status": "active"}),
                }],
            )
            .await
            .unwrap();

        let touched = deprecate(&store, "documents", "h1").await.unwrap();
        assert_eq!(touched, 1);

        let results = store.search("documents", &[1.0, 0.0], None, 10).await.unwrap();
        assert_eq!(results[0].payload["status"], "deprecated");

        // Idempotent: deprecating again still succeeds.
        let touched_again = deprecate(&store, "documents", "h1").await.unwrap();
        assert_eq!(touched_again, 1);
    }
}
