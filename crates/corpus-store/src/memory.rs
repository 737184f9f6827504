//! In-memory [`VectorStore`] test double.
//!
//! Brute-force cosine similarity and a small filter-predicate evaluator
//! mirror what the Qdrant implementation delegates to the real engine for,
//! the same way the teacher's DuckDB `array_cosine_similarity` brute-force
//! scan stood in for a production vector index before the Lance migration.

use std::collections::HashMap;

use async_trait::async_trait;
use corpus_core::filter::{Combinator, FilterOperator};
use corpus_core::Filter;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::StoreError;
use crate::{CollectionStats, ScoredPoint, StoreStats, UpsertPoint, VectorStore};

#[derive(Debug, Clone)]
struct StoredPoint {
    vector: Vec<f32>,
    payload: Value,
}

#[derive(Default)]
struct Collection {
    points: DashMap<String, StoredPoint>,
    indexed_fields: DashMap<String, ()>,
}

/// A fully in-memory backend. Never talks to a network; used in unit and
/// integration tests throughout the ingestion/search crates.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: DashMap<String, Collection>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> dashmap::mapref::one::Ref<'_, String, Collection> {
        self.collections.entry(name.to_string()).or_default();
        self.collections.get(name).expect("just inserted")
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn value_at_path<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    let mut current = payload;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn compare(value: &Value, operator: FilterOperator, target: &Value) -> bool {
    match operator {
        FilterOperator::Eq => value == target,
        FilterOperator::Ne => value != target,
        FilterOperator::Lt | FilterOperator::Le | FilterOperator::Gt | FilterOperator::Ge => {
            match (value.as_f64(), target.as_f64()) {
                (Some(v), Some(t)) => match operator {
                    FilterOperator::Lt => v < t,
                    FilterOperator::Le => v <= t,
                    FilterOperator::Gt => v > t,
                    FilterOperator::Ge => v >= t,
                    _ => unreachable!(),
                },
                _ => false,
            }
        }
        FilterOperator::In => target.as_array().is_some_and(|arr| arr.contains(value)),
        FilterOperator::NotIn => !target.as_array().is_some_and(|arr| arr.contains(value)),
    }
}

fn matches(payload: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Leaf { field, operator, value } => {
            let Some(field) = field.strip_prefix("meta.") else {
                return false;
            };
            value_at_path(payload, field).is_some_and(|found| compare(found, *operator, value))
        }
        Filter::Combinator { operator, conditions } => match operator {
            Combinator::And => conditions.iter().all(|c| matches(payload, c)),
            Combinator::Or => conditions.iter().any(|c| matches(payload, c)),
            Combinator::Not => conditions.first().is_none_or(|c| !matches(payload, c)),
        },
    }
}

fn merge_payload(base: &mut Value, patch: &Value) {
    let (Value::Object(base_map), Value::Object(patch_map)) = (base, patch) else {
        return;
    };
    for (key, value) in patch_map {
        base_map.insert(key.clone(), value.clone());
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, collection: &str, _dimensions: usize) -> Result<(), StoreError> {
        self.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn ensure_payload_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        self.collection(collection).indexed_fields.insert(field.to_string(), ());
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<UpsertPoint>) -> Result<(), StoreError> {
        let coll = self.collection(collection);
        for point in points {
            coll.points.insert(point.point_ref, StoredPoint { vector: point.vector, payload: point.payload });
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&Filter>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError> {
        let coll = self.collection(collection);
        let mut scored: Vec<ScoredPoint> = coll
            .points
            .iter()
            .filter(|entry| filter.is_none_or(|f| matches(&entry.value().payload, f)))
            .map(|entry| ScoredPoint {
                point_ref: entry.key().clone(),
                score: cosine_similarity(vector, &entry.value().vector),
                payload: entry.value().payload.clone(),
                vector: entry.value().vector.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn filter_update_payload(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<u64, StoreError> {
        let coll = self.collection(collection);
        let mut touched = 0u64;
        let matching_keys: Vec<String> = coll
            .points
            .iter()
            .filter(|entry| matches(&entry.value().payload, filter))
            .map(|entry| entry.key().clone())
            .collect();
        for key in matching_keys {
            if let Some(mut entry) = coll.points.get_mut(&key) {
                merge_payload(&mut entry.payload, &patch);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn filter_delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let coll = self.collection(collection);
        let matching_keys: Vec<String> = coll
            .points
            .iter()
            .filter(|entry| matches(&entry.value().payload, filter))
            .map(|entry| entry.key().clone())
            .collect();
        for key in &matching_keys {
            coll.points.remove(key);
        }
        Ok(matching_keys.len() as u64)
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> Result<u64, StoreError> {
        let coll = self.collection(collection);
        let count = coll.points.iter().filter(|entry| filter.is_none_or(|f| matches(&entry.value().payload, f))).count();
        Ok(count as u64)
    }

    async fn clear_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.collection(collection).points.clear();
        Ok(())
    }

    async fn stats(&self, collections: &[&str]) -> StoreStats {
        let mut per_collection = HashMap::new();
        for name in collections {
            let count = self.collections.get(*name).map_or(0, |c| c.points.len() as u64);
            per_collection.insert((*name).to_string(), count);
        }
        StoreStats {
            reachable: true,
            collections: per_collection
                .into_iter()
                .map(|(name, point_count)| CollectionStats { name, point_count })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(point_ref: &str, vector: Vec<f32>, payload: Value) -> UpsertPoint {
        UpsertPoint { point_ref: point_ref.to_string(), vector, payload }
    }

    #[tokio::test]
    async fn upsert_and_search_returns_self_match_first() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 3).await.unwrap();
        store
            .upsert(
                "documents",
                vec![
                    point("doc-1", vec![1.0, 0.0, 0.0], json!({"doc_id": "doc-1"})),
                    point("doc-2", vec![0.0, 1.0, 0.0], json!({"doc_id": "doc-2"})),
                ],
            )
            .await
            .unwrap();

        let results = store.search("documents", &[1.0, 0.0, 0.0], None, 10).await.unwrap();
        assert_eq!(results[0].point_ref, "doc-1");
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn filter_restricts_search_results() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store
            .upsert(
                "documents",
                vec![
                    point("doc-1", vec![1.0, 0.0], json!({"category": "design_doc"})),
                    point("doc-2", vec![1.0, 0.0], json!({"category": "user_rule"})),
                ],
            )
            .await
            .unwrap();

        let filter = Filter::eq("meta.category", "user_rule");
        let results = store.search("documents", &[1.0, 0.0], Some(&filter), 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].point_ref, "doc-2");
    }

    #[tokio::test]
    async fn filter_update_payload_merges_fields() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store
            .upsert("documents", vec![point("doc-1", vec![1.0, 0.0], json!({"status": "active"}))])
            .await
            .unwrap();

        let touched = store
            .filter_update_payload(
                "documents",
                &Filter::eq("meta.status", "active"),
                json!({"status": "deprecated"}),
            )
            .await
            .unwrap();
        assert_eq!(touched, 1);

        let results = store.search("documents", &[1.0, 0.0], None, 10).await.unwrap();
        assert_eq!(results[0].payload["status"], "deprecated");
    }

    #[tokio::test]
    async fn filter_delete_removes_matching_points() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store
            .upsert(
                "documents",
                vec![
                    point("doc-1", vec![1.0, 0.0], json!({"status": "deprecated"})),
                    point("doc-2", vec![1.0, 0.0], json!({"status": "active"})),
                ],
            )
            .await
            .unwrap();

        let deleted =
            store.filter_delete("documents", &Filter::eq("meta.status", "deprecated")).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.count("documents", None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_collection_hard_deletes_everything() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 2).await.unwrap();
        store.upsert("documents", vec![point("doc-1", vec![1.0, 0.0], json!({}))]).await.unwrap();
        store.clear_collection("documents").await.unwrap();
        assert_eq!(store.count("documents", None).await.unwrap(), 0);
    }
}
