//! Component B — metadata builder (§4.B).
//!
//! Builds a [`DocumentEnvelope`] from a caller-supplied [`MetadataFragment`]
//! plus defaults. Never computes `hash_content` itself — that is the
//! hasher's responsibility; the builder only assembles the envelope and
//! calls into [`crate::hasher`] for `metadata_hash`.

use chrono::Utc;
use corpus_core::{Category, DocumentEnvelope, MetadataFragment, Source, Status};
use serde_json::json;

use crate::error::IngestError;
use crate::hasher;

/// Builds the whole-document envelope for a fresh write. `hash_content`
/// must already be computed by the caller (the controller calls the
/// hasher directly on the raw content before invoking this).
///
/// # Errors
/// Returns [`IngestError::InvalidMetadata`] when `doc_id` is empty or
/// `category` is outside the closed set.
pub fn build_whole_document(
    fragment: &MetadataFragment,
    hash_content: String,
    version: u32,
) -> Result<DocumentEnvelope, IngestError> {
    let doc_id = fragment
        .doc_id
        .clone()
        .or_else(|| fragment.file_path.clone())
        .ok_or_else(|| IngestError::InvalidMetadata("doc_id must not be empty".into()))?;
    if doc_id.trim().is_empty() {
        return Err(IngestError::InvalidMetadata("doc_id must not be empty".into()));
    }

    let category = match &fragment.category {
        Some(raw) => Category::parse(raw)
            .ok_or_else(|| IngestError::InvalidMetadata(format!("unknown category {raw:?}")))?,
        None => Category::Other,
    };

    let source = match &fragment.source {
        Some(raw) => Some(
            Source::parse(raw)
                .ok_or_else(|| IngestError::InvalidMetadata(format!("unknown source {raw:?}")))?,
        ),
        None => None,
    };

    let now = Utc::now();
    let mut envelope = DocumentEnvelope {
        doc_id,
        version,
        category,
        status: Status::Active,
        hash_content,
        metadata_hash: String::new(),
        created_at: now,
        updated_at: now,
        file_path: fragment.file_path.clone(),
        file_hash: None,
        source,
        repo: fragment.repo.clone(),
        tags: fragment.tags.clone(),
        chunk: None,
    };
    envelope.metadata_hash = compute_metadata_hash(&envelope);
    Ok(envelope)
}

/// Builds the envelope for a single chunk of a chunked document.
///
/// # Errors
/// Same as [`build_whole_document`].
pub fn build_chunk(
    fragment: &MetadataFragment,
    hash_content: String,
    version: u32,
    chunk_id: String,
    chunk_index: u32,
    parent_doc_id: String,
    total_chunks: u32,
) -> Result<DocumentEnvelope, IngestError> {
    let mut envelope = build_whole_document(fragment, hash_content, version)?;
    envelope.chunk = Some(corpus_core::ChunkFields {
        is_chunk: true,
        chunk_id,
        chunk_index,
        parent_doc_id,
        total_chunks,
    });
    envelope.metadata_hash = compute_metadata_hash(&envelope);
    Ok(envelope)
}

/// Recomputes `metadata_hash` over the envelope's fields, excluding the
/// volatile ones named in invariant 3 (§3): `status`, `version`,
/// `created_at`, `updated_at`.
#[must_use]
pub fn compute_metadata_hash(envelope: &DocumentEnvelope) -> String {
    let mut fields = json!({
        "doc_id": envelope.doc_id,
        "category": envelope.category,
        "hash_content": envelope.hash_content,
        "file_path": envelope.file_path,
        "file_hash": envelope.file_hash,
        "source": envelope.source,
        "repo": envelope.repo,
        "tags": envelope.tags,
    });
    if let Some(chunk) = &envelope.chunk {
        fields["chunk_id"] = json!(chunk.chunk_id);
        fields["chunk_index"] = json!(chunk.chunk_index);
        fields["parent_doc_id"] = json!(chunk.parent_doc_id);
        fields["total_chunks"] = json!(chunk.total_chunks);
    }
    hasher::metadata_hash(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(doc_id: &str, category: &str) -> MetadataFragment {
        MetadataFragment {
            doc_id: Some(doc_id.to_string()),
            category: Some(category.to_string()),
            file_path: None,
            source: None,
            repo: None,
            tags: vec![],
        }
    }

    #[test]
    fn rejects_empty_doc_id() {
        let mut f = fragment("", "other");
        f.doc_id = Some(String::new());
        let err = build_whole_document(&f, "h".into(), 1).unwrap_err();
        assert!(matches!(err, IngestError::InvalidMetadata(_)));
    }

    #[test]
    fn rejects_unknown_category() {
        let f = fragment("doc-1", "not_a_real_category");
        let err = build_whole_document(&f, "h".into(), 1).unwrap_err();
        assert!(matches!(err, IngestError::InvalidMetadata(_)));
    }

    #[test]
    fn metadata_hash_is_independent_of_volatile_fields() {
        let f = fragment("doc-1", "other");
        let env_a = build_whole_document(&f, "h".into(), 1).unwrap();
        let mut env_b = env_a.clone();
        env_b.version = 99;
        env_b.status = corpus_core::Status::Deprecated;
        env_b.updated_at = env_b.updated_at + chrono::Duration::days(1);
        assert_eq!(compute_metadata_hash(&env_a), compute_metadata_hash(&env_b));
    }

    #[test]
    fn chunk_envelope_carries_chunk_identity() {
        let f = fragment("doc-1", "other");
        let env = build_chunk(&f, "h".into(), 1, "doc-1_chunk_0".into(), 0, "doc-1".into(), 3).unwrap();
        assert!(env.is_chunk());
        assert_eq!(env.doc_id, "doc-1", "chunk records keep the parent's logical doc_id");
        let chunk = env.chunk.as_ref().unwrap();
        assert_eq!(chunk.chunk_id, "doc-1_chunk_0");
        assert_eq!(chunk.parent_doc_id, "doc-1");
    }
}
