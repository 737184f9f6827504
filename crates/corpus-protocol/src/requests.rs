//! One request type per tool named in §6.
//!
//! Every chunking-capable ingestion request shares the same three knobs
//! (`enable_chunking`, `chunk_size`, `chunk_overlap`); the defaults match
//! `corpus_ingest::ChunkingOptions`'s.

use corpus_core::{Filter, ImportPolicy, MetadataFragment};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_chunk_size() -> usize {
    512
}

fn default_chunk_overlap() -> usize {
    64
}

/// Which logical collection a query or mutation tool targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypeArg {
    All,
    Docs,
    Code,
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddDocumentRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: MetadataFragment,
    #[serde(default)]
    pub enable_chunking: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddFileRequest {
    pub file_path: String,
    #[serde(default)]
    pub metadata: MetadataFragment,
    #[serde(default)]
    pub enable_chunking: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

/// `add_code` has the identical shape to `add_document`; the two differ
/// only in which collection the server routes them to.
pub type AddCodeRequest = AddDocumentRequest;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddCodeDirectoryRequest {
    pub directory: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub metadata: MetadataFragment,
    #[serde(default)]
    pub enable_chunking: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocumentsRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    #[serde(default)]
    pub metadata_filters: Option<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDocumentByPathRequest {
    pub file_path: String,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetMetadataStatsRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    #[serde(default)]
    pub filters: Option<Filter>,
    #[serde(default)]
    pub group_by_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetStatsRequest {}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateDocumentRequest {
    pub point_reference: String,
    pub content: String,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    #[serde(default)]
    pub metadata_updates: MetadataFragment,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateMetadataRequest {
    pub point_reference: String,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub metadata_updates: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteDocumentRequest {
    pub point_reference: String,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteByFilterRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub filter: Filter,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BulkUpdateMetadataRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub filter: Filter,
    pub patch: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearAllRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub confirmed: bool,
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetVersionHistoryRequest {
    pub doc_id: String,
    pub category: String,
    #[serde(default)]
    pub include_deprecated: bool,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyDocumentRequest {
    pub point_reference: String,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub pass_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyCategoryRequest {
    pub category: String,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub pass_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditStorageIntegrityRequest {
    pub source_directory: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
}

// ---------------------------------------------------------------------------
// Import / export / backup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportDocumentsRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    #[serde(default)]
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportDocumentsRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    pub documents: Vec<Value>,
    #[serde(default)]
    pub policy: Option<ImportPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateBackupRequest {
    #[serde(default)]
    pub content_type: Option<ContentTypeArg>,
    #[serde(default)]
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestoreBackupRequest {
    pub backup_name: String,
    #[serde(default)]
    pub policy: Option<ImportPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListBackupsRequest {}
