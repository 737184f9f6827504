//! Closed-set enums for the ingestion core.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `Status` carries a state machine the same way the rest of the pipeline's status
//! enums do, via `allowed_next_states()`.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed set of document categories (§3 of the envelope spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UserRule,
    ProjectRule,
    ProjectCommand,
    DesignDoc,
    DebugSummary,
    TestPattern,
    Other,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRule => "user_rule",
            Self::ProjectRule => "project_rule",
            Self::ProjectCommand => "project_command",
            Self::DesignDoc => "design_doc",
            Self::DebugSummary => "debug_summary",
            Self::TestPattern => "test_pattern",
            Self::Other => "other",
        }
    }

    /// Parse from the closed set; returns `None` for anything outside it
    /// (the metadata builder turns that into `InvalidMetadata`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user_rule" => Some(Self::UserRule),
            "project_rule" => Some(Self::ProjectRule),
            "project_command" => Some(Self::ProjectCommand),
            "design_doc" => Some(Self::DesignDoc),
            "debug_summary" => Some(Self::DebugSummary),
            "test_pattern" => Some(Self::TestPattern),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a stored record.
///
/// ```text
/// draft ──write──▶ active ──supersede──▶ deprecated
///                    │                        │
///                    └──────manual set────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Active,
    Deprecated,
}

impl Status {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Active],
            Self::Active => &[Self::Deprecated],
            Self::Deprecated => &[Self::Deprecated],
        }
    }

    /// Whether transitioning to `next` is allowed. `Deprecated -> Deprecated`
    /// is allowed because §4.E requires `deprecate` to be idempotent.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Deprecated => "deprecated",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "deprecated" => Some(Self::Deprecated),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Provenance of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Manual,
    Generated,
    Imported,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Generated => "generated",
            Self::Imported => "imported",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "generated" => Some(Self::Generated),
            "imported" => Some(Self::Imported),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DuplicateLevel / IngestAction
// ---------------------------------------------------------------------------

/// Output of the four-level duplicate classifier (§4.D), ordered by match
/// strength: `Exact` wins over `ContentUpdate` wins over `SemanticSimilarity`
/// wins over `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateLevel {
    /// Level 1 — identical `hash_content` and `metadata_hash`.
    Exact,
    /// Level 2 — same `doc_id` with a different `hash_content`, or same
    /// `metadata_hash` with a different `hash_content`.
    ContentUpdate,
    /// Level 3 — embedding-space similarity above threshold, no hash match.
    SemanticSimilarity,
    /// Level 4 — none of the above.
    New,
}

impl DuplicateLevel {
    /// The action the ingestion controller takes for this level.
    #[must_use]
    pub const fn action(self) -> IngestAction {
        match self {
            Self::Exact => IngestAction::Skip,
            Self::ContentUpdate => IngestAction::Update,
            Self::SemanticSimilarity => IngestAction::Warn,
            Self::New => IngestAction::Store,
        }
    }
}

/// The write action the ingestion controller performs for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IngestAction {
    Skip,
    Store,
    Update,
    Warn,
}

// ---------------------------------------------------------------------------
// ImportPolicy
// ---------------------------------------------------------------------------

/// Per-record policy applied by the import surface (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Keep the existing record untouched if `doc_id` already exists.
    Skip,
    /// Run the record through the ingestion controller (classifier re-runs).
    Update,
    /// Fail the whole import if `doc_id` already exists.
    Error,
}

// ---------------------------------------------------------------------------
// ChunkAction
// ---------------------------------------------------------------------------

/// Per-chunk classification produced by the chunk diff engine (§4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChunkAction {
    Unchanged,
    Changed,
    Added,
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(category_design_doc, Category, Category::DesignDoc, "design_doc");
    test_serde_roundtrip!(status_deprecated, Status, Status::Deprecated, "deprecated");
    test_serde_roundtrip!(source_imported, Source, Source::Imported, "imported");
    test_serde_roundtrip!(
        level_content_update,
        DuplicateLevel,
        DuplicateLevel::ContentUpdate,
        "content_update"
    );
    test_serde_roundtrip!(action_warn, IngestAction, IngestAction::Warn, "warn");
    test_serde_roundtrip!(policy_error, ImportPolicy, ImportPolicy::Error, "error");
    test_serde_roundtrip!(chunk_action_removed, ChunkAction, ChunkAction::Removed, "removed");

    #[test]
    fn status_valid_transitions() {
        assert!(Status::Draft.can_transition_to(Status::Active));
        assert!(Status::Active.can_transition_to(Status::Deprecated));
        assert!(Status::Deprecated.can_transition_to(Status::Deprecated));
    }

    #[test]
    fn status_invalid_transitions() {
        assert!(!Status::Draft.can_transition_to(Status::Deprecated));
        assert!(!Status::Active.can_transition_to(Status::Draft));
        assert!(!Status::Deprecated.can_transition_to(Status::Active));
    }

    #[test]
    fn duplicate_level_actions() {
        assert_eq!(DuplicateLevel::Exact.action(), IngestAction::Skip);
        assert_eq!(DuplicateLevel::ContentUpdate.action(), IngestAction::Update);
        assert_eq!(DuplicateLevel::SemanticSimilarity.action(), IngestAction::Warn);
        assert_eq!(DuplicateLevel::New.action(), IngestAction::Store);
    }

    #[test]
    fn category_parse_rejects_unknown() {
        assert!(Category::parse("not_a_category").is_none());
        assert_eq!(Category::parse("design_doc"), Some(Category::DesignDoc));
    }
}
