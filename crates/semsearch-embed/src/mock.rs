//! Deterministic hash-bucket embedder for development and tests.
//!
//! Every UTF-16 code unit is folded into a 32-bit FNV-1a accumulator and the
//! accumulator state after that fold picks one bucket to increment. The result
//! is L2-normalized; the empty string stays the all-zero vector.

use async_trait::async_trait;

use semsearch_core::error::EmbedError;
use semsearch_core::traits::{EmbedOptions, EmbedProvider};
use semsearch_core::types::EmbeddingVector;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("mock:d{}", dim) }
    }

    pub fn embed_text(&self, text: &str) -> EmbeddingVector {
        hash_embedding(text, self.dim)
    }
}

#[async_trait]
impl EmbedProvider for HashEmbedder {
    fn provider_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }

    async fn embed(&self, texts: &[String], _options: &EmbedOptions) -> Result<Vec<EmbeddingVector>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Bucketed FNV embedding of `text` into `dim` components.
pub fn hash_embedding(text: &str, dim: usize) -> EmbeddingVector {
    let dim = dim.max(1);
    let mut v = vec![0f32; dim];
    let mut hash = FNV_OFFSET_BASIS;
    for unit in text.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(FNV_PRIME);
        v[hash as usize % dim] += 1.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm = if norm == 0.0 { 1.0 } else { norm };
    for x in &mut v { *x /= norm; }
    v
}
