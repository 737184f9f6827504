//! # corpus-search
//!
//! Component H: the read/mutate/maintenance surface built on top of the
//! ingestion core — filtered semantic search, verification, bulk metadata
//! mutation, version history, export/import, backup/restore, and storage
//! integrity auditing. Every function here takes its collaborators
//! (`&dyn VectorStore`, `&dyn Embedder`, `&IngestionController`) by
//! reference rather than owning them, so the server crate wires up a single
//! shared instance of each.

pub mod audit;
pub mod backup;
pub mod bulk;
pub mod error;
pub mod export_import;
pub mod mutation;
pub mod search;
pub mod stats;
pub mod verify;
pub mod version_history;

pub use audit::{audit_storage_integrity, AuditReport};
pub use backup::{create_backup, list_backups, restore_backup, BackupMetadata, Manifest, ManifestEntry};
pub use bulk::{bulk_update_metadata, update_metadata, FORBIDDEN_PATCH_FIELDS};
pub use error::QueryError;
pub use export_import::{export_documents, import_documents, ExportedDocument, ImportReport};
pub use mutation::{clear_all, delete_by_filter, delete_document, update_document};
pub use search::{get_document_by_path, search_documents, ContentType, SearchRequest};
pub use stats::{aggregate_metadata_stats, get_metadata_stats, get_stats, MetadataStats, ServiceStats};
pub use verify::{verify_category, verify_document, CategoryVerificationSummary, QualityChecks, QualityReport};
pub use version_history::get_version_history;
