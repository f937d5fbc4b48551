//! LanceDB-backed chunk storage for semantic search.
//!
//! [`LanceChunkStore`] implements `ChunkStore`: `nearest` runs a cosine
//! vector query when the table's `embedding` column is a fixed-size vector and
//! reports `StoreError::VectorUnsupported` otherwise; `candidates` is a plain
//! filtered scan used by the in-process fallback.

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use schema::{build_chunk_schema, EmbeddingLayout, EMBEDDING_COLUMN};
pub use search::LanceChunkStore;
pub use writer::insert_chunks;
