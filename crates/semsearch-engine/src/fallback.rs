//! In-process cosine ranking used when the store cannot rank by vector.
//!
//! Only generic row access is needed: candidates are fetched with the same
//! filters as the native query, oversampled by [`OVERSAMPLE_FACTOR`], scored
//! here and truncated. Rows without an embedding, with a different dimension,
//! or with a zero vector are skipped silently.

use std::cmp::Ordering;

use semsearch_core::error::StoreError;
use semsearch_core::traits::ChunkStore;
use semsearch_core::types::{ChunkFilter, IndexedChunk, ScoredResult};

/// Rows fetched per requested result.
pub const OVERSAMPLE_FACTOR: usize = 4;

/// Number of candidate rows fetched for `limit` results.
pub fn candidate_cap(limit: usize) -> usize {
    limit.saturating_mul(OVERSAMPLE_FACTOR).max(limit)
}

pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum()
}

/// Cosine similarity, or `None` for mismatched dimensions or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() { return None; }
    let (na, nb) = (l2_norm(a), l2_norm(b));
    if na == 0.0 || nb == 0.0 { return None; }
    Some(dot(a, b) / (na * nb))
}

/// Best-first ordering: score descending, then id ascending for equal scores.
pub(crate) fn best_first(a_score: f64, a_id: &str, b_score: f64, b_id: &str) -> Ordering {
    b_score.total_cmp(&a_score).then_with(|| a_id.cmp(b_id))
}

/// Score `candidates` against `query` and keep the best `limit`.
pub fn score_candidates(query: &[f32], candidates: Vec<IndexedChunk>, limit: usize) -> Vec<ScoredResult> {
    let query_norm = l2_norm(query);
    if query.is_empty() || query_norm == 0.0 { return Vec::new(); }

    let mut scored: Vec<ScoredResult> = candidates
        .into_iter()
        .filter_map(|chunk| {
            let embedding = chunk.embedding.as_deref()?;
            if embedding.len() != query.len() { return None; }
            let norm = l2_norm(embedding);
            if norm == 0.0 { return None; }
            let score = dot(query, embedding) / (query_norm * norm);
            Some(ScoredResult {
                id: chunk.id,
                content: chunk.content,
                entity_type: chunk.entity_type,
                entity_id: chunk.entity_id,
                score,
                metadata: chunk.metadata.filter(|m| !m.is_null()),
            })
        })
        .collect();
    scored.sort_by(|a, b| best_first(a.score, &a.id, b.score, &b.id));
    scored.truncate(limit);
    scored
}

/// Fetch candidates from `store` and rank them in process.
///
/// Returns an empty list without touching the store when `query` is empty or
/// the zero vector.
pub async fn rank<S>(store: &S, query: &[f32], filter: &ChunkFilter, limit: usize) -> Result<Vec<ScoredResult>, StoreError>
where
    S: ChunkStore + ?Sized,
{
    if query.is_empty() || l2_norm(query) == 0.0 {
        return Ok(Vec::new());
    }
    let cap = candidate_cap(limit);
    let candidates = store.candidates(filter, cap).await?;
    let fetched = candidates.len();
    let ranked = score_candidates(query, candidates, limit);
    tracing::debug!(fetched, cap, kept = ranked.len(), "fallback ranking complete");
    Ok(ranked)
}
