//! The canonical metadata envelope (§3).
//!
//! `DocumentEnvelope` is the flattened payload stored alongside every
//! vector in the backend. Whole-document and chunk records share it;
//! chunk-only fields live in [`ChunkFields`], folded in via `#[serde(flatten)]`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Category, Source, Status};

/// Caller-supplied fragment used to build an envelope. Every field is
/// optional; the metadata builder (`corpus-ingest::metadata`) fills in
/// defaults and computed fields (hashes, timestamps).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetadataFragment {
    pub doc_id: Option<String>,
    pub category: Option<String>,
    pub file_path: Option<String>,
    pub source: Option<String>,
    pub repo: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The required + optional envelope fields stored with every point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentEnvelope {
    pub doc_id: String,
    pub version: u32,
    pub category: Category,
    pub status: Status,
    pub hash_content: String,
    pub metadata_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<ChunkFields>,
}

impl DocumentEnvelope {
    #[must_use]
    pub const fn is_chunk(&self) -> bool {
        self.chunk.is_some()
    }
}

/// Fields present only on chunk records (§3 "Chunk record adds").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChunkFields {
    pub is_chunk: bool,
    pub chunk_id: String,
    pub chunk_index: u32,
    pub parent_doc_id: String,
    pub total_chunks: u32,
}
