use async_trait::async_trait;

use crate::error::{EmbedError, StoreError};
use crate::types::{ChunkFilter, EmbeddingVector, IndexedChunk, NearestQuery, StoreHit};

/// Per-call hints passed to an embedding provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    pub tenant_id: Option<String>,
    /// Overrides the provider's configured model.
    pub model: Option<String>,
}

#[async_trait]
pub trait EmbedProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `mock:d768`).
    fn provider_id(&self) -> &str;
    /// Configured embedding dimensionality.
    fn dim(&self) -> usize;
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String], options: &EmbedOptions) -> Result<Vec<EmbeddingVector>, EmbedError>;
}

#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Native similarity query, best match first.
    ///
    /// Must fail with [`StoreError::VectorUnsupported`] when the backing
    /// table has no native vector capability.
    async fn nearest(&self, query: &NearestQuery<'_>) -> Result<Vec<StoreHit>, StoreError>;

    /// Plain filtered row fetch, at most `max_rows` rows, no vector features used.
    async fn candidates(&self, filter: &ChunkFilter, max_rows: usize) -> Result<Vec<IndexedChunk>, StoreError>;
}

#[async_trait]
impl<T: ChunkStore + ?Sized> ChunkStore for std::sync::Arc<T> {
    async fn nearest(&self, query: &NearestQuery<'_>) -> Result<Vec<StoreHit>, StoreError> {
        (**self).nearest(query).await
    }
    async fn candidates(&self, filter: &ChunkFilter, max_rows: usize) -> Result<Vec<IndexedChunk>, StoreError> {
        (**self).candidates(filter, max_rows).await
    }
}
