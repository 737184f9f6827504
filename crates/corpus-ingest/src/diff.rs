//! Component F — chunk diff/update engine (§4.F).
//!
//! Aligns the existing chunk set against the newly-chunked content by
//! `chunk_index` and classifies each slot: unchanged, changed, added, or
//! removed. Only `changed`/`added` chunks require re-embedding.

use std::collections::BTreeMap;

use corpus_core::{ChunkAction, DocumentEnvelope};

use crate::chunker::ChunkPiece;

/// One classified chunk slot.
#[derive(Debug, Clone)]
pub struct ChunkDiffEntry {
    pub chunk_index: u32,
    pub action: ChunkAction,
    /// The existing record at this index, when one existed (needed to
    /// deprecate by `hash_content` for `changed`/`removed`).
    pub old: Option<DocumentEnvelope>,
    /// The new chunk content at this index, when one exists (needed to
    /// embed for `changed`/`added`).
    pub new: Option<ChunkPiece>,
}

/// Counts of each classification, included verbatim in the controller's
/// chunked-update response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ChunkDiffCounts {
    pub total_chunks: u32,
    pub unchanged: u32,
    pub changed: u32,
    pub added: u32,
    pub removed: u32,
}

/// Diffs `old_chunks` (existing chunk records for this `doc_id`, any
/// status) against `new_pieces` (the chunker's fresh output), producing
/// one [`ChunkDiffEntry`] per index present in either set.
#[must_use]
pub fn diff(old_chunks: &[DocumentEnvelope], new_pieces: &[ChunkPiece]) -> (Vec<ChunkDiffEntry>, ChunkDiffCounts) {
    let mut by_index: BTreeMap<u32, (Option<&DocumentEnvelope>, Option<&ChunkPiece>)> = BTreeMap::new();

    for old in old_chunks {
        if let Some(chunk) = &old.chunk {
            by_index.entry(chunk.chunk_index).or_insert((None, None)).0 = Some(old);
        }
    }
    for piece in new_pieces {
        by_index.entry(piece.chunk_index).or_insert((None, None)).1 = Some(piece);
    }

    let mut entries = Vec::with_capacity(by_index.len());
    let mut counts = ChunkDiffCounts { total_chunks: new_pieces.len() as u32, ..Default::default() };

    for (chunk_index, (old, new)) in by_index {
        let action = match (old, new) {
            (Some(old), Some(new)) if old.hash_content == new.hash_content => {
                counts.unchanged += 1;
                ChunkAction::Unchanged
            }
            (Some(_), Some(_)) => {
                counts.changed += 1;
                ChunkAction::Changed
            }
            (None, Some(_)) => {
                counts.added += 1;
                ChunkAction::Added
            }
            (Some(_), None) => {
                counts.removed += 1;
                ChunkAction::Removed
            }
            (None, None) => unreachable!("index present without either side"),
        };
        entries.push(ChunkDiffEntry { chunk_index, action, old: old.cloned(), new: new.cloned() });
    }

    (entries, counts)
}
