//! Version history surface (§6 `get_version_history`).

use corpus_core::{Category, DocumentEnvelope, Filter, Status};
use corpus_store::VectorStore;

use crate::error::QueryError;

/// Builds the predicate `get_version_history` searches with: always scoped
/// to `(doc_id, category)`, additionally to `status = active` unless the
/// caller asked to include deprecated versions.
#[must_use]
pub fn build_filter(doc_id: &str, category: Category, include_deprecated: bool) -> Filter {
    let mut conditions = vec![Filter::eq("meta.doc_id", doc_id), Filter::eq("meta.category", category.as_str())];
    if !include_deprecated {
        conditions.push(Filter::eq("meta.status", Status::Active.as_str()));
    }
    Filter::and(conditions)
}

/// Returns every version of `doc_id`/`category`, newest `created_at` first.
///
/// # Errors
/// Returns [`QueryError::Store`]/`Io` on backend or decode failure.
pub async fn get_version_history(
    store: &dyn VectorStore,
    collection: &str,
    doc_id: &str,
    category: Category,
    include_deprecated: bool,
    dimensions: usize,
) -> Result<Vec<DocumentEnvelope>, QueryError> {
    let filter = build_filter(doc_id, category, include_deprecated);
    let rows = store.search(collection, &vec![0.0; dimensions], Some(&filter), 4096).await?;
    let mut envelopes = rows
        .into_iter()
        .map(|row| serde_json::from_value(row.payload).map_err(|e| QueryError::Io(e.to_string())))
        .collect::<Result<Vec<DocumentEnvelope>, QueryError>>()?;
    envelopes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(envelopes)
}
