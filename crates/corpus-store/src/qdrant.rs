//! Production [`VectorStore`] backed by Qdrant.
//!
//! Point ids handed to Qdrant are content-derived UUIDs (v5, namespaced on
//! `point_ref`); every field a caller can filter or read lives in the
//! payload under the `meta.` prefix the filter grammar requires, so the
//! backend-internal point id never needs to leak past this module.

use std::collections::HashMap;

use async_trait::async_trait;
use corpus_core::filter::{Combinator, FilterOperator};
use corpus_core::Filter;
use qdrant_client::qdrant::{
    condition::ConditionOneOf, r#match::MatchValue, vectors_config::Config, Condition,
    CreateCollectionBuilder, DeletePointsBuilder, FieldCondition, FieldType, Filter as QFilter,
    Match, PointId, PointStruct, Range, ScoredPoint as QScoredPoint,
    SearchPointsBuilder, SetPayloadPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;
use crate::{CollectionStats, ScoredPoint, StoreStats, UpsertPoint, VectorStore};

/// Namespace for the point-id UUIDs this crate derives from `point_ref`.
/// Fixed so the same `point_ref` always maps to the same Qdrant point.
const POINT_NAMESPACE: Uuid = Uuid::from_u128(0x5f4a_35c1_94c3_4a87_9ef0_1b9a_27a0_54e1);

fn point_id(point_ref: &str) -> PointId {
    Uuid::new_v5(&POINT_NAMESPACE, point_ref.as_bytes()).to_string().into()
}

fn into_payload(value: Value) -> Result<Payload, StoreError> {
    let Value::Object(map) = value else {
        return Err(StoreError::MalformedResponse("payload must be a JSON object".into()));
    };
    Payload::try_from(Value::Object(map)).map_err(|e| StoreError::MalformedResponse(e.to_string()))
}

fn qdrant_condition(field: &str, operator: FilterOperator, value: &Value) -> Result<Condition, StoreError> {
    let unqualified = field
        .strip_prefix("meta.")
        .ok_or_else(|| StoreError::IndexRequired(field.to_string()))?;

    let condition = match operator {
        FilterOperator::Eq => Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: unqualified.to_string(),
                r#match: Some(Match { match_value: Some(json_to_match(value)) }),
                ..Default::default()
            })),
        },
        FilterOperator::In => Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: unqualified.to_string(),
                r#match: Some(Match { match_value: Some(json_array_to_match_any(value)) }),
                ..Default::default()
            })),
        },
        // `Ne`/`NotIn` never reach here directly — `translate_filter`
        // rewrites them into `Eq`/`In` wrapped in `must_not` first.
        FilterOperator::Ne | FilterOperator::NotIn => unreachable!("negated operators are handled in translate_filter"),
        FilterOperator::Lt | FilterOperator::Le | FilterOperator::Gt | FilterOperator::Ge => {
            let n = value.as_f64().ok_or_else(|| {
                StoreError::MalformedResponse(format!("{operator:?} requires a numeric value"))
            })?;
            let mut range = Range::default();
            match operator {
                FilterOperator::Lt => range.lt = Some(n),
                FilterOperator::Le => range.lte = Some(n),
                FilterOperator::Gt => range.gt = Some(n),
                FilterOperator::Ge => range.gte = Some(n),
                _ => unreachable!(),
            }
            Condition {
                condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                    key: unqualified.to_string(),
                    range: Some(range),
                    ..Default::default()
                })),
            }
        }
    };
    Ok(condition)
}

fn json_to_match(value: &Value) -> MatchValue {
    match value {
        Value::String(s) => MatchValue::Keyword(s.clone()),
        Value::Bool(b) => MatchValue::Boolean(*b),
        Value::Number(n) if n.is_i64() => MatchValue::Integer(n.as_i64().unwrap_or_default()),
        other => MatchValue::Keyword(other.to_string()),
    }
}

fn json_array_to_match_any(value: &Value) -> MatchValue {
    let keywords = value
        .as_array()
        .map(|arr| arr.iter().map(ToString::to_string).collect::<Vec<_>>())
        .unwrap_or_default();
    MatchValue::Keywords(qdrant_client::qdrant::RepeatedStrings { strings: keywords })
}

fn translate_filter(filter: &Filter) -> Result<QFilter, StoreError> {
    match filter {
        Filter::Leaf { field, operator: FilterOperator::Ne, value } => {
            let cond = qdrant_condition(field, FilterOperator::Eq, value)?;
            Ok(QFilter { must_not: vec![cond], ..Default::default() })
        }
        Filter::Leaf { field, operator: FilterOperator::NotIn, value } => {
            let cond = qdrant_condition(field, FilterOperator::In, value)?;
            Ok(QFilter { must_not: vec![cond], ..Default::default() })
        }
        Filter::Leaf { field, operator, value } => {
            Ok(QFilter { must: vec![qdrant_condition(field, *operator, value)?], ..Default::default() })
        }
        Filter::Combinator { operator, conditions } => {
            let translated: Result<Vec<QFilter>, StoreError> = conditions.iter().map(translate_filter).collect();
            let translated = translated?;
            let nested: Vec<Condition> = translated
                .into_iter()
                .map(|f| Condition { condition_one_of: Some(ConditionOneOf::Filter(f)) })
                .collect();
            Ok(match operator {
                Combinator::And => QFilter { must: nested, ..Default::default() },
                Combinator::Or => QFilter { should: nested, ..Default::default() },
                Combinator::Not => QFilter { must_not: nested, ..Default::default() },
            })
        }
    }
}

fn extract_vector(point: &QScoredPoint) -> Vec<f32> {
    use qdrant_client::qdrant::vectors_output::VectorsOptions;

    point
        .vectors
        .as_ref()
        .and_then(|v| v.vectors_options.as_ref())
        .map(|opts| match opts {
            VectorsOptions::Vector(v) => v.data.clone(),
            VectorsOptions::Vectors(_) => Vec::new(),
        })
        .unwrap_or_default()
}

fn extract_point_ref(point: &QScoredPoint) -> String {
    use qdrant_client::qdrant::point_id::PointIdOptions;

    point
        .id
        .as_ref()
        .and_then(|id| id.point_id_options.as_ref())
        .map(|opts| match opts {
            PointIdOptions::Num(n) => n.to_string(),
            PointIdOptions::Uuid(u) => u.clone(),
        })
        .unwrap_or_default()
}

fn scored_point_to_domain(point: QScoredPoint) -> ScoredPoint {
    let vector = extract_vector(&point);
    let point_ref = extract_point_ref(&point);
    let payload: Map<String, Value> = point
        .payload
        .into_iter()
        .map(|(k, v)| (k, serde_json::to_value(v).unwrap_or(Value::Null)))
        .collect();
    ScoredPoint { point_ref, score: point.score, payload: Value::Object(payload), vector }
}

/// Thin wrapper around `qdrant_client::Qdrant` that speaks the workspace's
/// reduced [`VectorStore`] surface.
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Connects to a Qdrant instance at `url`, with an optional API key.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the client cannot be built.
    pub fn connect(url: &str, api_key: Option<&str>) -> Result<Self, StoreError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<(), StoreError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if exists {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection).vectors_config(Config::Params(
                    VectorParamsBuilder::new(dimensions as u64, qdrant_client::qdrant::Distance::Cosine)
                        .build(),
                )),
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn ensure_payload_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let unqualified = field.strip_prefix("meta.").unwrap_or(field);
        self.client
            .create_field_index(collection, unqualified, FieldType::Keyword, None, None)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<UpsertPoint>) -> Result<(), StoreError> {
        let mut structs = Vec::with_capacity(points.len());
        for point in points {
            let payload = into_payload(point.payload)?;
            structs.push(PointStruct::new(point_id(&point.point_ref), point.vector, payload));
        }
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, structs))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&Filter>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError> {
        let mut builder =
            SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64).with_payload(true).with_vectors(true);
        if let Some(filter) = filter {
            builder = builder.filter(translate_filter(filter)?);
        }
        let response = self.client.search_points(builder).await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(response.result.into_iter().map(scored_point_to_domain).collect())
    }

    async fn filter_update_payload(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<u64, StoreError> {
        let qfilter = translate_filter(filter)?;
        let payload = into_payload(patch)?;
        let before = self.count(collection, Some(filter)).await?;
        self.client
            .set_payload(
                SetPayloadPointsBuilder::new(collection, payload)
                    .points_selector(qfilter),
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(before)
    }

    async fn filter_delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let qfilter = translate_filter(filter)?;
        let before = self.count(collection, Some(filter)).await?;
        self.client
            .delete_points(DeletePointsBuilder::new(collection).points(qfilter))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(before)
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> Result<u64, StoreError> {
        let mut builder = qdrant_client::qdrant::CountPointsBuilder::new(collection);
        if let Some(filter) = filter {
            builder = builder.filter(translate_filter(filter)?);
        }
        let response = self.client.count(builder).await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(response.result.map(|r| r.count).unwrap_or_default())
    }

    async fn clear_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.client
            .delete_points(DeletePointsBuilder::new(collection).points(QFilter::default()))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn stats(&self, collections: &[&str]) -> StoreStats {
        let mut stats = Vec::new();
        let mut reachable = true;
        for name in collections {
            match self.client.collection_info(*name).await {
                Ok(info) => {
                    let count = info.result.and_then(|r| r.points_count).unwrap_or_default();
                    stats.push(CollectionStats { name: (*name).to_string(), point_count: count });
                }
                Err(_) => {
                    reachable = false;
                    stats.push(CollectionStats { name: (*name).to_string(), point_count: 0 });
                }
            }
        }
        StoreStats { reachable, collections: stats }
    }
}
