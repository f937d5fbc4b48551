//! Domain types shared by the embedding, storage and search crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ChunkId = String;

/// Dense embedding produced by an [`crate::traits::EmbedProvider`].
pub type EmbeddingVector = Vec<f32>;

/// Smallest number of results a search may return.
pub const MIN_RESULT_LIMIT: usize = 1;
/// Hard cap on results per search, regardless of configuration.
pub const MAX_RESULT_LIMIT: usize = 20;
/// Result limit used when neither the query nor the configuration sets one.
pub const DEFAULT_RESULT_LIMIT: usize = 5;
/// Embedding dimension assumed when a provider reports nothing better.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Clamp a requested result count into `[MIN_RESULT_LIMIT, MAX_RESULT_LIMIT]`.
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(MIN_RESULT_LIMIT, MAX_RESULT_LIMIT)
}

/// A persisted content fragment as the search core sees it.
///
/// Rows are written by an external indexing pipeline and are read-only here.
/// `embedding` is `None` for rows that were never embedded; its length may
/// differ between rows when the embedding model changed over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedChunk {
    pub id: ChunkId,
    pub tenant_id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub content: String,
    #[serde(default)]
    pub embedding: Option<EmbeddingVector>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Equality predicates applied to every storage read, combined with AND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFilter {
    pub tenant_id: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
}

impl ChunkFilter {
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self { tenant_id: tenant_id.into(), entity_type: None, entity_id: None }
    }

    pub fn matches(&self, chunk: &IndexedChunk) -> bool {
        chunk.tenant_id == self.tenant_id
            && self.entity_type.as_deref().map_or(true, |t| chunk.entity_type == t)
            && self.entity_id.as_deref().map_or(true, |id| chunk.entity_id == id)
    }
}

/// A tenant-scoped free-text search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub tenant_id: String,
    pub text: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    /// Requested result count; clamped to `[1, 20]` by the engine.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(tenant_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { tenant_id: tenant_id.into(), text: text.into(), entity_type: None, entity_id: None, limit: None }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn filter(&self) -> ChunkFilter {
        ChunkFilter {
            tenant_id: self.tenant_id.clone(),
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
        }
    }
}

/// Arguments of a native nearest-neighbour query.
#[derive(Debug, Clone, Copy)]
pub struct NearestQuery<'a> {
    pub vector: &'a [f32],
    pub dim: usize,
    pub filter: &'a ChunkFilter,
    pub limit: usize,
}

/// A row produced by a store's native similarity query.
///
/// `score` is `1 - distance`; higher is better.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub id: ChunkId,
    pub content: String,
    pub entity_type: String,
    pub entity_id: String,
    pub score: f32,
    pub metadata: Option<Value>,
}

/// The uniform result shape returned to callers, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub id: ChunkId,
    pub content: String,
    pub entity_type: String,
    pub entity_id: String,
    pub score: f64,
    pub metadata: Option<Value>,
}

impl From<StoreHit> for ScoredResult {
    fn from(hit: StoreHit) -> Self {
        Self {
            id: hit.id,
            content: hit.content,
            entity_type: hit.entity_type,
            entity_id: hit.entity_id,
            score: f64::from(hit.score),
            metadata: hit.metadata.filter(|m| !m.is_null()),
        }
    }
}

/// Which execution path answered a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchPath {
    Native,
    Fallback,
}
