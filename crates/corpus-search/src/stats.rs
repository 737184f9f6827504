//! `get_stats` / `get_metadata_stats` (§6; §8 ambient "health/readiness").
//!
//! `get_stats` reports backend connectivity and embedder readiness — the
//! natural home for the ambient observability the spec's Non-goals exclude
//! as a *feature* ("real-time index maintenance") but still require as
//! plumbing. `get_metadata_stats` aggregates over a caller-filtered set of
//! records; the store has no native `GROUP BY`, so the aggregation itself
//! runs over records already fetched by filter.

use std::collections::HashMap;

use corpus_core::{DocumentEnvelope, Filter};
use corpus_embeddings::Embedder;
use corpus_store::{CollectionStats, VectorStore};
use serde::Serialize;

use crate::error::QueryError;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub backend_reachable: bool,
    pub embedder_dimensions: usize,
    pub collections: Vec<CollectionStats>,
}

/// Backend/embedder readiness plus per-collection point counts.
pub async fn get_stats(store: &dyn VectorStore, embedder: &dyn Embedder, collections: &[&str]) -> ServiceStats {
    let store_stats = store.stats(collections).await;
    ServiceStats {
        backend_reachable: store_stats.reachable,
        embedder_dimensions: embedder.dimensions(),
        collections: store_stats.collections,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetadataStats {
    pub total: u64,
    pub group_counts: HashMap<String, HashMap<String, u64>>,
}

/// Aggregates `records` into per-field value counts, one group per entry
/// in `group_by_fields`. Only the flat, commonly-grouped envelope fields
/// are recognized; an unrecognized field name is silently skipped rather
/// than erroring, since grouping is informational, not a filter.
#[must_use]
pub fn aggregate_metadata_stats(records: &[DocumentEnvelope], group_by_fields: &[&str]) -> MetadataStats {
    let mut stats = MetadataStats { total: records.len() as u64, group_counts: HashMap::new() };
    for field in group_by_fields {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in records {
            if let Some(value) = field_value(record, field) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        stats.group_counts.insert((*field).to_string(), counts);
    }
    stats
}

fn field_value(record: &DocumentEnvelope, field: &str) -> Option<String> {
    match field {
        "category" => Some(record.category.as_str().to_string()),
        "status" => Some(record.status.as_str().to_string()),
        "source" => record.source.map(|s| s.as_str().to_string()),
        "repo" => record.repo.clone(),
        "file_path" => record.file_path.clone(),
        "is_chunk" => Some(record.is_chunk().to_string()),
        _ => None,
    }
}

/// Fetches records matching `filter` and aggregates them by `group_by_fields`.
///
/// # Errors
/// Returns [`QueryError::Store`] on an unindexed filter field or backend
/// failure, or [`QueryError::Io`] if a payload doesn't decode.
pub async fn get_metadata_stats(
    store: &dyn VectorStore,
    collection: &str,
    filter: Option<&Filter>,
    group_by_fields: &[&str],
    dimensions: usize,
) -> Result<MetadataStats, QueryError> {
    if let Some(f) = filter {
        f.validate_indexed(corpus_core::INDEXED_FIELDS)
            .map_err(|e| QueryError::Store(corpus_store::StoreError::IndexRequired(e.to_string())))?;
    }
    let rows = store.search(collection, &vec![0.0; dimensions], filter, 10_000).await?;
    let records = rows
        .into_iter()
        .map(|row| serde_json::from_value(row.payload).map_err(|e| QueryError::Io(e.to_string())))
        .collect::<Result<Vec<DocumentEnvelope>, QueryError>>()?;
    Ok(aggregate_metadata_stats(&records, group_by_fields))
}
