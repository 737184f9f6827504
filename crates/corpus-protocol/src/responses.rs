//! One response payload type per tool (wrapped in a [`crate::ToolEnvelope`]
//! at the transport boundary). Wire-native copies of the internal report
//! types rather than re-exports, per this crate's no-downstream-deps rule.

use corpus_core::{DocumentEnvelope, DuplicateLevel, IngestAction};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IngestReportPayload {
    pub action: IngestAction,
    pub duplicate_level: DuplicateLevel,
    pub deprecated: bool,
    pub new_point_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct ChunkDiffCountsPayload {
    pub total_chunks: u32,
    pub unchanged: u32,
    pub changed: u32,
    pub added: u32,
    pub removed: u32,
}

/// `add_document`/`add_file`/`add_code` return one of these depending on
/// whether `enable_chunking` was set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IngestOutcome {
    Whole(IngestReportPayload),
    Chunked(ChunkDiffCountsPayload),
}

/// `add_code_directory` ingests every matching file and reports a report
/// (or an error message) per relative path; a single malformed file never
/// aborts the walk (mirrors §7's bulk-flow-never-interrupts policy).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileIngestResult {
    pub file_path: String,
    pub outcome: Option<IngestOutcome>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AddCodeDirectoryResponse {
    pub results: Vec<FileIngestResult>,
    pub succeeded: u64,
    pub failed: u64,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScoredDocumentPayload {
    pub envelope: DocumentEnvelope,
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocumentsResponse {
    pub results: Vec<ScoredDocumentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDocumentByPathResponse {
    pub envelope: DocumentEnvelope,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetadataStatsPayload {
    pub total: u64,
    pub group_counts: HashMap<String, HashMap<String, u64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CollectionStatsPayload {
    pub name: String,
    pub point_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ServiceStatsResponse {
    pub backend_reachable: bool,
    pub embedder_dimensions: usize,
    pub collections: Vec<CollectionStatsPayload>,
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PointCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearAllResponse {
    pub cleared: bool,
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VersionHistoryResponse {
    pub versions: Vec<DocumentEnvelope>,
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct QualityChecksPayload {
    pub has_content: bool,
    pub min_length: bool,
    pub no_placeholder: bool,
    pub has_required_fields: bool,
    pub hash_valid: bool,
    pub has_status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyDocumentResponse {
    pub checks: QualityChecksPayload,
    pub score: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VerifyCategoryResponse {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_score: f64,
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuditStorageIntegrityResponse {
    pub missing: Vec<String>,
    pub mismatch: Vec<String>,
    pub extra: Vec<String>,
    pub passed: u64,
    pub integrity_score: f64,
}

// ---------------------------------------------------------------------------
// Import / export / backup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportedDocumentPayload {
    pub envelope: DocumentEnvelope,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExportDocumentsResponse {
    pub documents: Vec<ExportedDocumentPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ImportDocumentsResponse {
    pub imported: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateBackupResponse {
    pub backup_name: String,
    pub document_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RestoreBackupResponse {
    pub imported: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListBackupsResponse {
    pub backups: Vec<String>,
}

// Re-exported here so dispatcher code can match on the same closed sets
// the requests use without importing `corpus_core` directly.
pub use corpus_core::{Category as CategoryPayload, Filter as FilterPayload, Status as StatusPayload};
