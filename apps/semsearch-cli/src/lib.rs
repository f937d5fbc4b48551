//! Helpers behind the `semsearch` binary: JSON-lines input and result output.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use semsearch_core::traits::{EmbedOptions, EmbedProvider};
use semsearch_core::types::{IndexedChunk, SearchQuery};
use semsearch_engine::SearchOutcome;

const EMBED_BATCH_SIZE: usize = 64;
const SNIPPET_CHARS: usize = 160;

pub fn read_chunks(path: &Path) -> Result<Vec<IndexedChunk>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_chunk_lines(BufReader::new(file))
}

/// One `IndexedChunk` JSON object per line; blank lines are ignored.
pub fn parse_chunk_lines<R: BufRead>(reader: R) -> Result<Vec<IndexedChunk>> {
    let mut chunks = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let chunk: IndexedChunk = serde_json::from_str(&line).with_context(|| format!("line {}: invalid chunk", i + 1))?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Fill in embeddings for chunks that have none. Returns how many were embedded.
pub async fn embed_missing(
    provider: &dyn EmbedProvider,
    chunks: &mut [IndexedChunk],
    progress: &indicatif::ProgressBar,
) -> Result<usize> {
    let missing: Vec<usize> = chunks.iter().enumerate().filter(|(_, c)| c.embedding.is_none()).map(|(i, _)| i).collect();
    progress.set_length(missing.len() as u64);
    for batch in missing.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|&i| chunks[i].content.clone()).collect();
        // Rows in one batch may belong to different tenants; pass the first as a hint.
        let options = EmbedOptions { tenant_id: batch.first().map(|&i| chunks[i].tenant_id.clone()), model: None };
        let vectors = provider.embed(&texts, &options).await?;
        for (&i, v) in batch.iter().zip(vectors) {
            chunks[i].embedding = Some(v);
        }
        progress.inc(batch.len() as u64);
    }
    Ok(missing.len())
}

pub fn vector_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn snippet(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS { return flat; }
    let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    format!("{cut}...")
}

pub fn format_human(query: &SearchQuery, outcome: &SearchOutcome) -> String {
    if outcome.results.is_empty() {
        return format!("No results for \"{}\" in tenant {}", query.text, query.tenant_id);
    }
    let mut out = format!("Results for \"{}\" ({:?} search):\n", query.text, outcome.path);
    for (rank, r) in outcome.results.iter().enumerate() {
        out.push_str(&format!("{:>2}. [{:.3}] {}/{} ({})\n    {}\n", rank + 1, r.score, r.entity_type, r.entity_id, r.id, snippet(&r.content)));
    }
    out
}

pub fn format_json(query: &SearchQuery, outcome: &SearchOutcome) -> Result<String> {
    let body = json!({
        "query": query,
        "path": outcome.path,
        "results": outcome.results,
    });
    Ok(serde_json::to_string_pretty(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semsearch_core::types::{ScoredResult, SearchPath};
    use semsearch_embed::HashEmbedder;

    fn outcome() -> SearchOutcome {
        SearchOutcome {
            results: vec![ScoredResult {
                id: "c1".into(),
                content: "3 bed\n ranch   house".into(),
                entity_type: "listing".into(),
                entity_id: "L-1".into(),
                score: 0.91234,
                metadata: None,
            }],
            path: SearchPath::Fallback,
        }
    }

    #[test]
    fn parses_json_lines_and_skips_blanks() {
        let input = concat!(
            r#"{"id":"c1","tenantId":"t1","entityType":"listing","entityId":"L-1","content":"ranch","embedding":[0.6,0.8]}"#,
            "\n\n",
            r#"{"id":"c2","tenantId":"t1","entityType":"listing","entityId":"L-2","content":"condo","embedding":null,"metadata":{"beds":2}}"#,
            "\n",
        );
        let chunks = parse_chunk_lines(input.as_bytes()).expect("parse");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].embedding, Some(vec![0.6, 0.8]));
        assert!(chunks[1].embedding.is_none());
        assert_eq!(chunks[1].metadata, Some(json!({ "beds": 2 })));
    }

    #[test]
    fn bad_line_reports_its_number() {
        let input = "{\"id\":\"c1\"}\n";
        let err = parse_chunk_lines(input.as_bytes()).expect_err("missing fields");
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn human_output_ranks_and_flattens_content() {
        let text = format_human(&SearchQuery::new("t1", "ranch"), &outcome());
        assert!(text.contains("Fallback search"));
        assert!(text.contains(" 1. [0.912] listing/L-1 (c1)"));
        assert!(text.contains("3 bed ranch house"));
        let empty = SearchOutcome { results: Vec::new(), path: SearchPath::Native };
        assert_eq!(format_human(&SearchQuery::new("t1", "x"), &empty), "No results for \"x\" in tenant t1");
    }

    #[test]
    fn json_output_uses_camel_case_fields() {
        let text = format_json(&SearchQuery::new("t1", "ranch"), &outcome()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["path"], "Fallback");
        assert_eq!(value["query"]["tenantId"], "t1");
        assert_eq!(value["results"][0]["entityId"], "L-1");
    }

    #[tokio::test]
    async fn only_missing_embeddings_are_filled() {
        let mut chunks = parse_chunk_lines(
            concat!(
                r#"{"id":"a","tenantId":"t1","entityType":"listing","entityId":"L-1","content":"ranch","embedding":[1.0]}"#,
                "\n",
                r#"{"id":"b","tenantId":"t1","entityType":"listing","entityId":"L-2","content":"condo"}"#,
            )
            .as_bytes(),
        )
        .expect("parse");
        let provider = HashEmbedder::new(8);
        let filled = embed_missing(&provider, &mut chunks, &indicatif::ProgressBar::hidden()).await.expect("embed");
        assert_eq!(filled, 1);
        assert_eq!(chunks[0].embedding, Some(vec![1.0]));
        assert_eq!(chunks[1].embedding.as_ref().map(Vec::len), Some(8));
    }
}
