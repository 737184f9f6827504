//! Component D — four-level duplicate classifier (§4.D).
//!
//! Pure over its inputs: given a candidate fingerprint pair and the set of
//! existing records sharing `doc_id`, returns a [`DuplicateLevel`]. Never
//! touches the store.

use corpus_core::{DocumentEnvelope, DuplicateLevel, Status};

/// A candidate write about to be classified against existing records.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub doc_id: &'a str,
    pub hash_content: &'a str,
    pub metadata_hash: &'a str,
}

/// Outcome of classification: the level plus, when relevant, the
/// `hash_content` of the tie-broken existing record the controller should
/// deprecate. `hash_content` rather than `doc_id` is carried here because
/// every existing record sharing a `doc_id` is itself a valid match target
/// in the Level-2 "same `doc_id`" case — `doc_id` alone can't tell the
/// controller which of several candidates `tie_break` actually picked, but
/// `hash_content` is unique per version and is exactly what the versioning
/// engine (§4.E) requires to deprecate the right one.
#[derive(Debug, Clone)]
pub struct Classification {
    pub level: DuplicateLevel,
    pub matched_hash_content: Option<String>,
}

/// Classifies `candidate` against `existing`, which must already be
/// restricted to records sharing `candidate.doc_id` (the controller
/// pre-queries this with a filter). Semantic similarity (Level 3) is
/// evaluated by the caller via `similarity_hits`, since it requires an
/// embedding-space comparison the classifier itself does not perform.
#[must_use]
pub fn classify(candidate: &Candidate<'_>, existing: &[DocumentEnvelope], similarity_hit: bool) -> Classification {
    if let Some(exact) = find_exact_match(candidate, existing) {
        return Classification { level: DuplicateLevel::Exact, matched_hash_content: Some(exact.hash_content.clone()) };
    }

    if let Some(update) = find_content_update(candidate, existing) {
        return Classification {
            level: DuplicateLevel::ContentUpdate,
            matched_hash_content: Some(update.hash_content.clone()),
        };
    }

    if similarity_hit {
        return Classification { level: DuplicateLevel::SemanticSimilarity, matched_hash_content: None };
    }

    Classification { level: DuplicateLevel::New, matched_hash_content: None }
}

fn find_exact_match<'a>(candidate: &Candidate<'_>, existing: &'a [DocumentEnvelope]) -> Option<&'a DocumentEnvelope> {
    let matches: Vec<&DocumentEnvelope> = existing
        .iter()
        .filter(|e| e.hash_content == candidate.hash_content && e.metadata_hash == candidate.metadata_hash)
        .collect();
    tie_break(matches)
}

/// Level 2 has two cases, tie-broken in order: same `doc_id` with a
/// different `hash_content` (priority case), then same `metadata_hash`
/// with a different `hash_content`.
fn find_content_update<'a>(candidate: &Candidate<'_>, existing: &'a [DocumentEnvelope]) -> Option<&'a DocumentEnvelope> {
    let same_doc_id: Vec<&DocumentEnvelope> = existing
        .iter()
        .filter(|e| e.doc_id == candidate.doc_id && e.hash_content != candidate.hash_content)
        .collect();
    if let Some(winner) = tie_break(same_doc_id) {
        return Some(winner);
    }

    let same_metadata_hash: Vec<&DocumentEnvelope> = existing
        .iter()
        .filter(|e| e.metadata_hash == candidate.metadata_hash && e.hash_content != candidate.hash_content)
        .collect();
    tie_break(same_metadata_hash)
}

/// Tie-break order (§4.D): newest `updated_at`, then `active` over other
/// statuses, then lexicographically smallest point reference.
fn tie_break(mut candidates: Vec<&DocumentEnvelope>) -> Option<&DocumentEnvelope> {
    candidates.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| status_rank(a.status).cmp(&status_rank(b.status)))
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    candidates.into_iter().next()
}

const fn status_rank(status: Status) -> u8 {
    match status {
        Status::Active => 0,
        Status::Draft => 1,
        Status::Deprecated => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use corpus_core::Category;

    fn envelope(doc_id: &str, hash_content: &str, metadata_hash: &str, status: Status, age_secs: i64) -> DocumentEnvelope {
        let now = Utc::now() - Duration::seconds(age_secs);
        DocumentEnvelope {
            doc_id: doc_id.to_string(),
            version: 1,
            category: Category::Other,
            status,
            hash_content: hash_content.to_string(),
            metadata_hash: metadata_hash.to_string(),
            created_at: now,
            updated_at: now,
            file_path: None,
            file_hash: None,
            source: None,
            repo: None,
            tags: vec![],
            chunk: None,
        }
    }

    #[test]
    fn exact_match_wins_over_everything() {
        let candidate = Candidate { doc_id: "A", hash_content: "h1", metadata_hash: "m1" };
        let existing = vec![envelope("A", "h1", "m1", Status::Active, 0)];
        let result = classify(&candidate, &existing, false);
        assert_eq!(result.level, corpus_core::DuplicateLevel::Exact);
    }

    #[test]
    fn same_doc_id_different_hash_is_content_update() {
        let candidate = Candidate { doc_id: "A", hash_content: "h2", metadata_hash: "m2" };
        let existing = vec![envelope("A", "h1", "m1", Status::Active, 0)];
        let result = classify(&candidate, &existing, false);
        assert_eq!(result.level, corpus_core::DuplicateLevel::ContentUpdate);
    }

    #[test]
    fn same_metadata_hash_different_hash_is_content_update() {
        let candidate = Candidate { doc_id: "A", hash_content: "h2", metadata_hash: "m1" };
        let existing = vec![envelope("B", "h1", "m1", Status::Active, 0)];
        let result = classify(&candidate, &existing, false);
        assert_eq!(result.level, corpus_core::DuplicateLevel::ContentUpdate);
    }

    #[test]
    fn no_match_and_no_similarity_hit_is_new() {
        let candidate = Candidate { doc_id: "A", hash_content: "h2", metadata_hash: "m2" };
        let existing: Vec<DocumentEnvelope> = vec![];
        let result = classify(&candidate, &existing, false);
        assert_eq!(result.level, corpus_core::DuplicateLevel::New);
    }

    #[test]
    fn similarity_hit_without_hash_match_is_semantic_similarity() {
        let candidate = Candidate { doc_id: "A", hash_content: "h2", metadata_hash: "m2" };
        let existing = vec![envelope("A", "h1", "m1", Status::Active, 0)];
        let result = classify(&candidate, &existing, true);
        assert_eq!(result.level, corpus_core::DuplicateLevel::SemanticSimilarity);
    }

    #[test]
    fn tie_break_prefers_newest_updated_at() {
        let candidate = Candidate { doc_id: "A", hash_content: "h2", metadata_hash: "m2" };
        let existing = vec![
            envelope("A", "h1", "m1", Status::Active, 100),
            envelope("A", "h3", "m3", Status::Active, 1),
        ];
        let result = classify(&candidate, &existing, false);
        // Both entries share doc_id "A", so only `hash_content` can show
        // which one tie_break actually picked — the newest, "h3".
        assert_eq!(result.matched_hash_content.as_deref(), Some("h3"));
        let refs: Vec<&DocumentEnvelope> = existing.iter().collect();
        let winner = tie_break(refs).unwrap();
        assert_eq!(winner.hash_content, "h3");
    }
}
