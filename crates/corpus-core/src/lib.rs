//! Shared envelope, enum, filter, and error types for the ingestion core.
//!
//! Every other crate in the workspace depends on this one; it carries no
//! dependency on the embedder, the vector store, or the protocol layer.

pub mod enums;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod ids;

pub use enums::{Category, ChunkAction, DuplicateLevel, ImportPolicy, IngestAction, Source, Status};
pub use envelope::{ChunkFields, DocumentEnvelope, MetadataFragment};
pub use error::{CoreError, ErrorKind, ErrorPayload};
pub use filter::{Combinator, Filter, FilterOperator, INDEXED_FIELDS};
