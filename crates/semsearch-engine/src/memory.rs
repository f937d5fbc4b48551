//! Chunk store held entirely in memory.
//!
//! Mirrors the two capabilities of a database-backed store: with
//! `native_vectors` on it ranks by cosine itself, otherwise `nearest`
//! reports [`StoreError::VectorUnsupported`] and only generic row access works.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use semsearch_core::error::StoreError;
use semsearch_core::traits::ChunkStore;
use semsearch_core::types::{ChunkFilter, IndexedChunk, NearestQuery, StoreHit};

use crate::fallback::{best_first, cosine_similarity};

#[derive(Debug, Default)]
pub struct InMemoryChunkStore {
    chunks: Vec<IndexedChunk>,
    native_vectors: bool,
    nearest_calls: AtomicUsize,
    candidate_calls: AtomicUsize,
    last_max_rows: AtomicUsize,
}

impl InMemoryChunkStore {
    /// A store that ranks natively.
    pub fn with_vectors(chunks: Vec<IndexedChunk>) -> Self {
        Self { chunks, native_vectors: true, ..Self::default() }
    }

    /// A store without native vector support.
    pub fn without_vectors(chunks: Vec<IndexedChunk>) -> Self {
        Self { chunks, native_vectors: false, ..Self::default() }
    }

    pub fn supports_vectors(&self) -> bool { self.native_vectors }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn nearest_calls(&self) -> usize { self.nearest_calls.load(Ordering::Relaxed) }

    pub fn candidate_calls(&self) -> usize { self.candidate_calls.load(Ordering::Relaxed) }

    /// Row cap passed to the most recent `candidates` call.
    pub fn last_max_rows(&self) -> usize { self.last_max_rows.load(Ordering::Relaxed) }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn nearest(&self, query: &NearestQuery<'_>) -> Result<Vec<StoreHit>, StoreError> {
        self.nearest_calls.fetch_add(1, Ordering::Relaxed);
        if !self.native_vectors {
            return Err(StoreError::VectorUnsupported("in-memory store has no vector support".into()));
        }

        let mut hits: Vec<StoreHit> = self
            .chunks
            .iter()
            .filter(|c| query.filter.matches(c))
            .filter_map(|c| {
                let embedding = c.embedding.as_deref().filter(|e| e.len() == query.dim)?;
                let score = cosine_similarity(query.vector, embedding)?;
                Some(StoreHit {
                    id: c.id.clone(),
                    content: c.content.clone(),
                    entity_type: c.entity_type.clone(),
                    entity_id: c.entity_id.clone(),
                    score: score as f32,
                    metadata: c.metadata.clone(),
                })
            })
            .collect();
        hits.sort_by(|a, b| best_first(f64::from(a.score), &a.id, f64::from(b.score), &b.id));
        hits.truncate(query.limit);
        Ok(hits)
    }

    async fn candidates(&self, filter: &ChunkFilter, max_rows: usize) -> Result<Vec<IndexedChunk>, StoreError> {
        self.candidate_calls.fetch_add(1, Ordering::Relaxed);
        self.last_max_rows.store(max_rows, Ordering::Relaxed);
        Ok(self.chunks.iter().filter(|c| filter.matches(c)).take(max_rows).cloned().collect())
    }
}
