//! Backup/restore surface (§4.H, §6 `create_backup`/`restore_backup`/
//! `list_backups`).
//!
//! A backup is a directory named `backup_{collection}_{timestamp}` holding
//! three files: `documents.json` (the exported triples), `metadata.json`
//! (backup identity/timestamp/filter/counts), and `manifest.json` (per-file
//! checksum + size, using the same SHA-256 hasher as `hash_content`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use corpus_core::{Filter, ImportPolicy};
use corpus_ingest::IngestionController;
use corpus_store::VectorStore;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::export_import::{export_documents, import_documents, ExportedDocument, ImportReport};

const DOCUMENTS_FILE: &str = "documents.json";
const METADATA_FILE: &str = "metadata.json";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub filter_descriptor: Option<Filter>,
    pub document_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file_name: String,
    pub checksum: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

fn manifest_entry(file_name: &str, bytes: &[u8]) -> ManifestEntry {
    ManifestEntry { file_name: file_name.to_string(), checksum: corpus_ingest::hasher::hash(bytes), size_bytes: bytes.len() as u64 }
}

fn backup_dir_name(collection: &str, created_at: DateTime<Utc>) -> String {
    format!("backup_{collection}_{}", created_at.format("%Y%m%dT%H%M%SZ"))
}

/// Writes a backup of `collection` (optionally restricted by `filter`)
/// under `backup_root`. Returns the backup directory's path.
///
/// # Errors
/// Returns [`QueryError::Io`] on filesystem failure, or propagates the
/// export's store/index errors.
pub async fn create_backup(
    store: &dyn VectorStore,
    collection: &str,
    filter: Option<&Filter>,
    dimensions: usize,
    backup_root: &Path,
    created_at: DateTime<Utc>,
) -> Result<PathBuf, QueryError> {
    let documents = export_documents(store, collection, filter, dimensions).await?;
    let metadata = BackupMetadata {
        collection: collection.to_string(),
        created_at,
        filter_descriptor: filter.cloned(),
        document_count: documents.len() as u64,
    };

    let dir = backup_root.join(backup_dir_name(collection, created_at));
    tokio::fs::create_dir_all(&dir).await.map_err(|e| QueryError::Io(e.to_string()))?;

    let documents_bytes = serde_json::to_vec_pretty(&documents).map_err(|e| QueryError::Io(e.to_string()))?;
    let metadata_bytes = serde_json::to_vec_pretty(&metadata).map_err(|e| QueryError::Io(e.to_string()))?;

    let manifest = Manifest {
        entries: vec![manifest_entry(DOCUMENTS_FILE, &documents_bytes), manifest_entry(METADATA_FILE, &metadata_bytes)],
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest).map_err(|e| QueryError::Io(e.to_string()))?;

    tokio::fs::write(dir.join(DOCUMENTS_FILE), &documents_bytes).await.map_err(|e| QueryError::Io(e.to_string()))?;
    tokio::fs::write(dir.join(METADATA_FILE), &metadata_bytes).await.map_err(|e| QueryError::Io(e.to_string()))?;
    tokio::fs::write(dir.join(MANIFEST_FILE), &manifest_bytes).await.map_err(|e| QueryError::Io(e.to_string()))?;

    Ok(dir)
}

async fn read_and_verify(dir: &Path, file_name: &str, expected: &ManifestEntry) -> Result<Vec<u8>, QueryError> {
    let bytes = tokio::fs::read(dir.join(file_name)).await.map_err(|e| QueryError::Io(e.to_string()))?;
    if bytes.len() as u64 != expected.size_bytes {
        return Err(QueryError::IntegrityMismatch(format!("{file_name}: size mismatch")));
    }
    let checksum = corpus_ingest::hasher::hash(&bytes);
    if checksum != expected.checksum {
        return Err(QueryError::IntegrityMismatch(format!("{file_name}: checksum mismatch")));
    }
    Ok(bytes)
}

/// Restores a backup directory, verifying every manifest checksum before
/// replaying any record through [`import_documents`].
///
/// # Errors
/// Returns [`QueryError::IntegrityMismatch`] if a checksum or size fails
/// to match the manifest; propagates import errors otherwise.
pub async fn restore_backup(
    controller: &IngestionController,
    store: &dyn VectorStore,
    dir: &Path,
    policy: ImportPolicy,
) -> Result<ImportReport, QueryError> {
    let manifest_bytes = tokio::fs::read(dir.join(MANIFEST_FILE)).await.map_err(|e| QueryError::Io(e.to_string()))?;
    let manifest: Manifest = serde_json::from_slice(&manifest_bytes).map_err(|e| QueryError::Io(e.to_string()))?;

    let documents_entry = manifest
        .entries
        .iter()
        .find(|e| e.file_name == DOCUMENTS_FILE)
        .ok_or_else(|| QueryError::IntegrityMismatch("manifest missing documents.json entry".into()))?;
    let metadata_entry = manifest
        .entries
        .iter()
        .find(|e| e.file_name == METADATA_FILE)
        .ok_or_else(|| QueryError::IntegrityMismatch("manifest missing metadata.json entry".into()))?;

    let documents_bytes = read_and_verify(dir, DOCUMENTS_FILE, documents_entry).await?;
    let _metadata_bytes = read_and_verify(dir, METADATA_FILE, metadata_entry).await?;

    let documents: Vec<ExportedDocument> = serde_json::from_slice(&documents_bytes).map_err(|e| QueryError::Io(e.to_string()))?;
    import_documents(controller, store, &read_backup_collection(dir).await?, &documents, policy).await
}

async fn read_backup_collection(dir: &Path) -> Result<String, QueryError> {
    let metadata_bytes = tokio::fs::read(dir.join(METADATA_FILE)).await.map_err(|e| QueryError::Io(e.to_string()))?;
    let metadata: BackupMetadata = serde_json::from_slice(&metadata_bytes).map_err(|e| QueryError::Io(e.to_string()))?;
    Ok(metadata.collection)
}

/// Lists backup directory names (not full paths) under `backup_root`,
/// lexically sorted (the `backup_{collection}_{timestamp}` naming scheme
/// sorts chronologically within a collection because the timestamp format
/// is fixed-width and zero-padded).
///
/// # Errors
/// Returns [`QueryError::Io`] if `backup_root` cannot be read.
pub async fn list_backups(backup_root: &Path) -> Result<Vec<String>, QueryError> {
    let mut entries = tokio::fs::read_dir(backup_root).await.map_err(|e| QueryError::Io(e.to_string()))?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| QueryError::Io(e.to_string()))? {
        if entry.file_type().await.map_err(|e| QueryError::Io(e.to_string()))?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use corpus_core::MetadataFragment;
    use corpus_embeddings::FakeEmbedder;
    use corpus_store::memory::InMemoryVectorStore;
    use std::sync::Arc;

    fn fragment(doc_id: &str) -> MetadataFragment {
        MetadataFragment { doc_id: Some(doc_id.to_string()), category: Some("other".into()), file_path: None, source: None, repo: None, tags: vec![] }
    }

    #[tokio::test]
    async fn create_then_restore_backup_round_trips_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryVectorStore::new());
        let controller = IngestionController::new(store.clone(), Arc::new(FakeEmbedder::new(8)));
        controller.ingest_document("documents", "alpha content", &fragment("A"), false).await.unwrap();
        controller.ingest_document("documents", "beta content", &fragment("B"), false).await.unwrap();

        let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let dir = create_backup(store.as_ref(), "documents", None, 8, tmp.path(), created_at).await.unwrap();
        assert!(dir.join("documents.json").exists());
        assert!(dir.join("manifest.json").exists());

        let fresh_store = Arc::new(InMemoryVectorStore::new());
        fresh_store.ensure_collection("documents", 8).await.unwrap();
        let fresh_controller = IngestionController::new(fresh_store.clone(), Arc::new(FakeEmbedder::new(8)));
        let report = restore_backup(&fresh_controller, fresh_store.as_ref(), &dir, ImportPolicy::Skip).await.unwrap();
        assert_eq!(report.imported, 2);

        let listed = list_backups(tmp.path()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn restore_detects_tampered_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryVectorStore::new());
        let controller = IngestionController::new(store.clone(), Arc::new(FakeEmbedder::new(8)));
        controller.ingest_document("documents", "alpha content", &fragment("A"), false).await.unwrap();

        let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let dir = create_backup(store.as_ref(), "documents", None, 8, tmp.path(), created_at).await.unwrap();
        tokio::fs::write(dir.join("documents.json"), b"tampered").await.unwrap();

        let err = restore_backup(&controller, store.as_ref(), &dir, ImportPolicy::Skip).await.unwrap_err();
        assert!(matches!(err, QueryError::IntegrityMismatch(_)));
    }
}
