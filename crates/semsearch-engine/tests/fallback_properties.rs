use proptest::prelude::*;
use semsearch_core::types::{ChunkFilter, IndexedChunk, MAX_RESULT_LIMIT, MIN_RESULT_LIMIT};
use semsearch_engine::fallback::{candidate_cap, l2_norm, rank, score_candidates};
use semsearch_engine::InMemoryChunkStore;

fn vector(max_dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0f32, 1..=max_dim)
}

fn candidates() -> impl Strategy<Value = Vec<IndexedChunk>> {
    prop::collection::vec(prop::option::of(vector(6)), 0..40).prop_map(|embeddings| {
        embeddings
            .into_iter()
            .enumerate()
            .map(|(i, embedding)| IndexedChunk {
                id: format!("c{i:03}"),
                tenant_id: "t1".into(),
                entity_type: "listing".into(),
                entity_id: format!("L-{i}"),
                content: String::new(),
                embedding,
                metadata: None,
            })
            .collect()
    })
}

fn usable(query: &[f32], chunk: &IndexedChunk) -> bool {
    chunk.embedding.as_deref().is_some_and(|e| e.len() == query.len() && l2_norm(e) > 0.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn scored_results_are_ordered_bounded_and_dimension_matched(
        query in vector(6),
        rows in candidates(),
        limit in 0usize..30,
    ) {
        prop_assume!(l2_norm(&query) > 0.0);
        let expected = rows.iter().filter(|c| usable(&query, c)).count().min(limit);
        let ranked = score_candidates(&query, rows.clone(), limit);

        prop_assert_eq!(ranked.len(), expected);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for r in &ranked {
            prop_assert!(r.score.is_finite());
            prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&r.score));
            let source = rows.iter().find(|c| c.id == r.id);
            prop_assert!(source.is_some_and(|c| usable(&query, c)));
        }
    }

    #[test]
    fn rank_fetches_four_times_the_limit(
        query in vector(6),
        rows in candidates(),
        limit in MIN_RESULT_LIMIT..=MAX_RESULT_LIMIT,
    ) {
        prop_assume!(l2_norm(&query) > 0.0);
        let store = InMemoryChunkStore::without_vectors(rows);
        let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
        let ranked = runtime
            .block_on(rank(&store, &query, &ChunkFilter::tenant("t1"), limit))
            .expect("rank");

        prop_assert_eq!(store.candidate_calls(), 1);
        prop_assert_eq!(store.last_max_rows(), candidate_cap(limit));
        prop_assert_eq!(candidate_cap(limit), limit * 4);
        prop_assert!(ranked.len() <= limit);
    }
}
