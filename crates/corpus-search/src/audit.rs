//! `audit_storage_integrity` (§4.H, §6).
//!
//! Walks a source directory with the `ignore` crate (the same file-walker
//! ecosystem crate the teacher uses for its grep/index file walker), hashes
//! each file's content the same way the hasher does, and compares against
//! the stored `hash_content` for the matching `meta.file_path`.

use std::collections::HashMap;
use std::path::Path;

use corpus_core::{Filter, Status};
use corpus_store::VectorStore;
use ignore::WalkBuilder;
use serde::Serialize;

use crate::error::QueryError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    /// `file_path`s present on disk but with no active stored record.
    pub missing: Vec<String>,
    /// `file_path`s whose on-disk `hash_content` disagrees with the stored one.
    pub mismatch: Vec<String>,
    /// Active stored `file_path`s with no corresponding file on disk.
    pub extra: Vec<String>,
    pub passed: u64,
    pub integrity_score: f64,
}

/// Audits `source_directory` against `collection`'s active, file-backed
/// records. `recursive` toggles directory descent; `file_extensions`, when
/// non-empty, restricts the walk to files with those extensions
/// (extension strings without a leading dot, e.g. `"rs"`).
///
/// # Errors
/// Returns [`QueryError::Io`] on a file read failure, or propagates
/// store/index errors fetching stored records.
pub async fn audit_storage_integrity(
    store: &dyn VectorStore,
    collection: &str,
    source_directory: &Path,
    recursive: bool,
    file_extensions: &[&str],
    dimensions: usize,
) -> Result<AuditReport, QueryError> {
    let filter = Filter::eq("meta.status", Status::Active.as_str());
    let rows = store.search(collection, &vec![0.0; dimensions], Some(&filter), 10_000).await?;
    let mut stored: HashMap<String, String> = HashMap::new();
    for row in rows {
        let (envelope, _content) = corpus_ingest::decode_record(row)?;
        if let Some(path) = envelope.file_path {
            stored.insert(path, envelope.hash_content);
        }
    }

    let mut seen_on_disk = std::collections::HashSet::new();
    let mut report = AuditReport::default();

    let mut builder = WalkBuilder::new(source_directory);
    builder.standard_filters(false).hidden(false);
    if !recursive {
        builder.max_depth(Some(1));
    }

    for entry in builder.build().filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !file_extensions.is_empty() {
            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| file_extensions.contains(&ext));
            if !matches {
                continue;
            }
        }

        let relative = entry
            .path()
            .strip_prefix(source_directory)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();
        let bytes = tokio::fs::read_to_string(entry.path()).await.map_err(|e| QueryError::Io(e.to_string()))?;
        let on_disk_hash = corpus_ingest::hasher::hash_content(&bytes);
        seen_on_disk.insert(relative.clone());

        match stored.get(&relative) {
            None => report.missing.push(relative),
            Some(stored_hash) if stored_hash != &on_disk_hash => report.mismatch.push(relative),
            Some(_) => report.passed += 1,
        }
    }

    for path in stored.keys() {
        if !seen_on_disk.contains(path) {
            report.extra.push(path.clone());
        }
    }

    let total = report.passed + report.missing.len() as u64 + report.mismatch.len() as u64 + report.extra.len() as u64;
    report.integrity_score = if total == 0 { 1.0 } else { report.passed as f64 / total as f64 };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::MetadataFragment;
    use corpus_embeddings::FakeEmbedder;
    use corpus_ingest::IngestionController;
    use corpus_store::memory::InMemoryVectorStore;
    use std::sync::Arc;

    fn fragment(doc_id: &str, file_path: &str) -> MetadataFragment {
        MetadataFragment {
            doc_id: Some(doc_id.to_string()),
            category: Some("other".into()),
            file_path: Some(file_path.to_string()),
            source: None,
            repo: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn audit_reports_mismatch_missing_and_extra() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("a.rs"), "fn a() {}\n").await.unwrap();
        tokio::fs::write(tmp.path().join("b.rs"), "fn b() {}\n").await.unwrap();

        let store = Arc::new(InMemoryVectorStore::new());
        let controller = IngestionController::new(store.clone(), Arc::new(FakeEmbedder::new(8)));
        // matches a.rs
        controller.ingest_document("documents", "fn a() {}\n", &fragment("A", "a.rs"), false).await.unwrap();
        // content differs from what's on disk for b.rs
        controller.ingest_document("documents", "stale content", &fragment("B", "b.rs"), false).await.unwrap();
        // stored but absent from disk
        controller.ingest_document("documents", "gone", &fragment("C", "c.rs"), false).await.unwrap();

        let report = audit_storage_integrity(store.as_ref(), "documents", tmp.path(), true, &[], 8).await.unwrap();
        assert_eq!(report.passed, 1);
        assert_eq!(report.mismatch, vec!["b.rs".to_string()]);
        assert_eq!(report.extra, vec!["c.rs".to_string()]);
        assert!(report.integrity_score < 1.0);
    }

    #[tokio::test]
    async fn audit_with_no_records_and_no_files_is_perfect_score() {
        let tmp = tempfile::tempdir().unwrap();
        let store = InMemoryVectorStore::new();
        store.ensure_collection("documents", 8).await.unwrap();
        let report = audit_storage_integrity(&store, "documents", tmp.path(), true, &[], 8).await.unwrap();
        assert!((report.integrity_score - 1.0).abs() < f64::EPSILON);
    }
}
