//! Verification surface (§4.H "Verification").
//!
//! Computes a quality vector over a stored record: a handful of boolean
//! checks whose passing fraction is the record's quality score. The pass
//! threshold defaults to 1.0 (every check must pass) but callers may relax
//! it for `verify_category`'s aggregate pass/fail split.

use std::sync::LazyLock;

use corpus_core::DocumentEnvelope;
use regex::Regex;
use serde::Serialize;

/// Records shorter than this (in chars, after trimming) fail `min_length`.
const MIN_CONTENT_LENGTH: usize = 10;

/// Known placeholder markers a real document should never contain.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(TODO|TBD|FIXME|XXX|lorem ipsum|placeholder text|insert[- ]content[- ]here)\b")
        .expect("placeholder pattern is a valid regex")
});

/// The six boolean checks a record is scored against.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct QualityChecks {
    pub has_content: bool,
    pub min_length: bool,
    pub no_placeholder: bool,
    pub has_required_fields: bool,
    pub hash_valid: bool,
    pub has_status: bool,
}

impl QualityChecks {
    fn as_array(self) -> [bool; 6] {
        [self.has_content, self.min_length, self.no_placeholder, self.has_required_fields, self.hash_valid, self.has_status]
    }

    /// Fraction of checks that passed, in `[0.0, 1.0]`.
    #[must_use]
    pub fn score(self) -> f64 {
        let passed = self.as_array().iter().filter(|c| **c).count();
        passed as f64 / self.as_array().len() as f64
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QualityReport {
    pub checks: QualityChecks,
    pub score: f64,
    pub passed: bool,
}

/// Verifies one record's stored content against its envelope.
///
/// `hash_valid` recomputes `hash_content` from `content` and compares it
/// against the envelope's stored value — this is the one check that can
/// catch a store-level corruption the other checks can't see.
#[must_use]
pub fn verify_document(envelope: &DocumentEnvelope, content: &str, pass_threshold: f64) -> QualityReport {
    let checks = QualityChecks {
        has_content: !content.trim().is_empty(),
        min_length: content.trim().chars().count() >= MIN_CONTENT_LENGTH,
        no_placeholder: !PLACEHOLDER_PATTERN.is_match(content),
        has_required_fields: !envelope.doc_id.is_empty()
            && !envelope.hash_content.is_empty()
            && !envelope.metadata_hash.is_empty(),
        hash_valid: envelope.hash_content == corpus_ingest::hasher::hash_content(content),
        // `Status` is a closed enum populated on every successful
        // deserialization, so this check exists to keep the quality
        // vector's shape stable even though it can never fail in practice.
        has_status: true,
    };
    let score = checks.score();
    QualityReport { checks, score, passed: score >= pass_threshold }
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct CategoryVerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_score: f64,
}

/// Verifies every `(envelope, content)` pair in a category. Never aborts on
/// an individual failure — per §7, verification errors are collected, not
/// propagated.
#[must_use]
pub fn verify_category(
    records: &[(DocumentEnvelope, String)],
    pass_threshold: f64,
) -> (CategoryVerificationSummary, Vec<(String, QualityReport)>) {
    let mut summary = CategoryVerificationSummary { total: records.len(), ..Default::default() };
    let mut total_score = 0.0;
    let mut reports = Vec::with_capacity(records.len());

    for (envelope, content) in records {
        let report = verify_document(envelope, content, pass_threshold);
        total_score += report.score;
        if report.passed {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
        reports.push((envelope.doc_id.clone(), report));
    }

    summary.average_score = if records.is_empty() { 0.0 } else { total_score / records.len() as f64 };
    (summary, reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use corpus_core::{Category, Status};

    fn envelope(hash_content: &str) -> DocumentEnvelope {
        let now = Utc::now();
        DocumentEnvelope {
            doc_id: "doc-1".into(),
            version: 1,
            category: Category::Other,
            status: Status::Active,
            hash_content: hash_content.to_string(),
            metadata_hash: "m".into(),
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
    fn well_formed_record_passes_every_check() {
        let content = "this is a perfectly reasonable piece of content";
        let env = envelope(&corpus_ingest::hasher::hash_content(content));
        let report = verify_document(&env, content, 1.0);
        assert!(report.passed);
        assert_eq!(report.score, 1.0);
    }

    #[test]
    fn placeholder_content_fails_no_placeholder_check() {
        let content = "TODO: write real content here, this is long enough";
        let env = envelope(&corpus_ingest::hasher::hash_content(content));
        let report = verify_document(&env, content, 1.0);
        assert!(!report.checks.no_placeholder);
        assert!(!report.passed);
    }

    #[test]
    fn tampered_hash_fails_hash_valid_check() {
        let content = "some perfectly fine content right here";
        let env = envelope("not-the-real-hash");
        let report = verify_document(&env, content, 1.0);
        assert!(!report.checks.hash_valid);
        assert!(!report.passed);
    }

    #[test]
    fn relaxed_threshold_allows_a_single_failing_check() {
        let content = "short";
        let env = envelope(&corpus_ingest::hasher::hash_content(content));
        let report = verify_document(&env, content, 0.8);
        assert!(!report.checks.min_length);
        assert!(report.score > 0.8);
        assert!(report.passed);
    }

    #[test]
    fn category_summary_aggregates_pass_and_fail_counts() {
        let good = "a perfectly fine piece of document content";
        let bad = "TODO fill this in eventually when there is time";
        let records = vec![
            (envelope(&corpus_ingest::hasher::hash_content(good)), good.to_string()),
            (envelope(&corpus_ingest::hasher::hash_content(bad)), bad.to_string()),
        ];
        let (summary, reports) = verify_category(&records, 1.0);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(reports.len(), 2);
    }
}
