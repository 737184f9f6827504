//! The filter predicate grammar shared by query, bulk-mutation, export, and
//! the versioning engine (§6). Leaves reference a *full dotted payload
//! path* (`meta.category`, not `category`) — the backend has no concept of
//! a default namespace, so the path must be exact.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Comparison applied by a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

/// A filter predicate: either a leaf comparison or a boolean combinator
/// over nested predicates.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Filter {
    Leaf { field: String, operator: FilterOperator, value: Value },
    Combinator { operator: Combinator, conditions: Vec<Filter> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    And,
    Or,
    Not,
}

/// Fields the backend has a payload index for. Anything outside this set
/// used in a filter leaf surfaces `IndexRequired` rather than silently
/// falling back to an unindexed scan.
pub const INDEXED_FIELDS: &[&str] = &[
    "meta.doc_id",
    "meta.category",
    "meta.status",
    "meta.source",
    "meta.repo",
    "meta.tags",
    "meta.hash_content",
    "meta.metadata_hash",
    "meta.file_path",
    "meta.parent_doc_id",
    "meta.is_chunk",
];

impl Filter {
    /// Walks the predicate tree and returns the first leaf field that is
    /// not in `INDEXED_FIELDS`, if any.
    #[must_use]
    pub fn first_unindexed_field<'a>(&'a self, indexed: &[&str]) -> Option<&'a str> {
        match self {
            Self::Leaf { field, .. } => (!indexed.contains(&field.as_str())).then_some(field.as_str()),
            Self::Combinator { conditions, .. } => {
                conditions.iter().find_map(|c| c.first_unindexed_field(indexed))
            }
        }
    }

    /// Validates that every leaf field in this predicate is indexed.
    ///
    /// # Errors
    /// Returns [`CoreError::IndexRequired`] naming the first offending field.
    pub fn validate_indexed(&self, indexed: &[&str]) -> Result<(), CoreError> {
        match self.first_unindexed_field(indexed) {
            Some(field) => Err(CoreError::IndexRequired { field: field.to_string() }),
            None => Ok(()),
        }
    }

    /// Whether any leaf in this predicate compares against `field`.
    #[must_use]
    pub fn references_field(&self, field: &str) -> bool {
        match self {
            Self::Leaf { field: leaf_field, .. } => leaf_field == field,
            Self::Combinator { conditions, .. } => conditions.iter().any(|c| c.references_field(field)),
        }
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Leaf { field: field.into(), operator: FilterOperator::Eq, value: value.into() }
    }

    #[must_use]
    pub fn and(conditions: Vec<Self>) -> Self {
        Self::Combinator { operator: Combinator::And, conditions }
    }

    #[must_use]
    pub fn or(conditions: Vec<Self>) -> Self {
        Self::Combinator { operator: Combinator::Or, conditions }
    }

    #[must_use]
    pub fn not(condition: Self) -> Self {
        Self::Combinator { operator: Combinator::Not, conditions: vec![condition] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_with_indexed_field_validates() {
        let f = Filter::eq("meta.category", "design_doc");
        assert!(f.validate_indexed(INDEXED_FIELDS).is_ok());
    }

    #[test]
    fn leaf_with_unindexed_field_is_rejected() {
        let f = Filter::eq("meta.nonexistent_field", "x");
        let err = f.validate_indexed(INDEXED_FIELDS).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::IndexRequired);
    }

    #[test]
    fn nested_combinator_surfaces_first_unindexed_leaf() {
        let f = Filter::and(vec![
            Filter::eq("meta.category", "design_doc"),
            Filter::or(vec![Filter::eq("meta.bogus", 1), Filter::eq("meta.status", "active")]),
        ]);
        let bad = f.first_unindexed_field(INDEXED_FIELDS);
        assert_eq!(bad, Some("meta.bogus"));
    }

    #[test]
    fn references_field_finds_leaf_inside_combinator() {
        let f = Filter::and(vec![
            Filter::eq("meta.category", "design_doc"),
            Filter::eq("meta.status", "deprecated"),
        ]);
        assert!(f.references_field("meta.status"));
        assert!(!f.references_field("meta.repo"));
    }

    #[test]
    fn stripped_field_name_is_rejected_not_silently_accepted() {
        // "category" (no "meta." prefix) must not be treated as equivalent
        // to "meta.category" — the grammar requires the full dotted path.
        let f = Filter::eq("category", "design_doc");
        assert!(f.validate_indexed(INDEXED_FIELDS).is_err());
    }
}
