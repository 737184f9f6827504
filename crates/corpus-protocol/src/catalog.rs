//! The `list_tools` meta-tool: a static catalog of every tool name,
//! one-line description, and JSON-Schema-derived input shape, built the
//! same way the teacher's schema registry builds its schema map — a
//! `schema_for!` call per type, collected into a lookup table.

use schemars::schema_for;
use serde::{Deserialize, Serialize};

use crate::requests;

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

macro_rules! describe {
    ($name:expr, $description:expr, $ty:ty) => {
        ToolDescriptor {
            name: $name,
            description: $description,
            input_schema: serde_json::to_value(schema_for!($ty))
                .expect("schemars output is always valid JSON"),
        }
    };
}

/// Builds the full tool catalog (§6's required tool set).
#[must_use]
pub fn list_tools() -> Vec<ToolDescriptor> {
    vec![
        describe!("add_document", "Ingest a whole document by content", requests::AddDocumentRequest),
        describe!("add_file", "Ingest a document read from a file path", requests::AddFileRequest),
        describe!("add_code", "Ingest a code record by content", requests::AddCodeRequest),
        describe!(
            "add_code_directory",
            "Ingest every matching file under a directory as code records",
            requests::AddCodeDirectoryRequest
        ),
        describe!("search_documents", "Filtered semantic search", requests::SearchDocumentsRequest),
        describe!(
            "get_document_by_path",
            "Look up the active record for an exact file path",
            requests::GetDocumentByPathRequest
        ),
        describe!(
            "get_metadata_stats",
            "Aggregate stored records by metadata field",
            requests::GetMetadataStatsRequest
        ),
        describe!("get_stats", "Backend/embedder readiness and per-collection counts", requests::GetStatsRequest),
        describe!(
            "update_document",
            "Replace a record's content, re-running the duplicate classifier",
            requests::UpdateDocumentRequest
        ),
        describe!("update_metadata", "Patch one record's declared metadata fields", requests::UpdateMetadataRequest),
        describe!("delete_document", "Delete the record addressed by a point reference", requests::DeleteDocumentRequest),
        describe!("delete_by_filter", "Delete every record matching a filter", requests::DeleteByFilterRequest),
        describe!(
            "bulk_update_metadata",
            "Patch every record matching a filter",
            requests::BulkUpdateMetadataRequest
        ),
        describe!("clear_all", "Hard-delete every record in a collection (requires confirmation)", requests::ClearAllRequest),
        describe!(
            "get_version_history",
            "List every version of a doc_id/category pair, newest first",
            requests::GetVersionHistoryRequest
        ),
        describe!("verify_document", "Score one stored record's quality checks", requests::VerifyDocumentRequest),
        describe!(
            "verify_category",
            "Score every stored record in a category",
            requests::VerifyCategoryRequest
        ),
        describe!(
            "audit_storage_integrity",
            "Compare a source directory's files against stored hashes",
            requests::AuditStorageIntegrityRequest
        ),
        describe!("export_documents", "Materialize matching records as export triples", requests::ExportDocumentsRequest),
        describe!(
            "import_documents",
            "Replay exported triples into a collection under an import policy",
            requests::ImportDocumentsRequest
        ),
        describe!("create_backup", "Write a checksummed backup directory", requests::CreateBackupRequest),
        describe!("restore_backup", "Verify and replay a backup directory", requests::RestoreBackupRequest),
        describe!("list_backups", "List backup directory names", requests::ListBackupsRequest),
    ]
}
