//! # corpus-ingest
//!
//! Hashing, metadata building, chunking, duplicate classification,
//! versioning, the chunk diff engine, and the ingestion controller that
//! ties them together (components A–G).

pub mod chunker;
pub mod classifier;
pub mod controller;
pub mod diff;
pub mod error;
pub mod hasher;
pub mod metadata;
pub mod versioning;

pub use controller::{ChunkedIngestReport, ChunkingOptions, IngestReport, IngestionController, decode_record};
pub use error::IngestError;
