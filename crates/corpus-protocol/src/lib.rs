//! # corpus-protocol
//!
//! Tool request/response wire types and the `list_tools` catalog (§6).
//!
//! This crate depends on `corpus-core` only — not on `corpus-ingest`,
//! `corpus-store`, or `corpus-search` — so the wire shape stays stable
//! independent of internal refactors. The server crate converts between
//! these types and the internal ones at the dispatch boundary.

pub mod catalog;
pub mod envelope;
pub mod requests;
pub mod responses;

pub use catalog::{list_tools, ToolDescriptor};
pub use envelope::ToolEnvelope;
