//! Component A — content/metadata fingerprinting (§4.A).
//!
//! Pure, deterministic functions: `normalize` then `hash`. `metadata_hash`
//! hashes a canonical (key-sorted) JSON serialization of the envelope with
//! the volatile fields removed, so two otherwise-identical envelopes
//! compare equal regardless of deprecation state (invariant 3, §3).

use sha2::{Digest, Sha256};
use serde_json::Value;

/// Strips trailing whitespace per line and collapses the final newline,
/// per invariant 2 (§3): "normalization: strip trailing whitespace per
/// line, collapse final newline, stable Unicode form". Rust `String`s are
/// already well-formed UTF-8, so no further Unicode normalization pass is
/// needed here.
#[must_use]
pub fn normalize(content: &str) -> String {
    let mut lines: Vec<&str> = content.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let mut result = lines.join("\n");
    result.push('\n');
    result
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(s, "{byte:02x}");
    }
    s
}

/// `hash_content = hash(normalize(content))`.
#[must_use]
pub fn hash_content(content: &str) -> String {
    hash(normalize(content).as_bytes())
}

/// Recursively sorts object keys so that two structurally-equal JSON
/// values always serialize to the same byte string, regardless of
/// insertion order.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(String, Value)> =
                map.iter().map(|(k, v)| (k.clone(), canonicalize(v))).collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// `metadata_hash = hash(canonical_serialization(envelope \ volatile))`.
/// `fields` should already have the volatile keys removed.
#[must_use]
pub fn metadata_hash(fields: &Value) -> String {
    let canonical = canonicalize(fields);
    hash(canonical.to_string().as_bytes())
}
