use anyhow::{anyhow, Result};
use arrow_array::types::Float32Type;
use arrow_array::{ArrayRef, FixedSizeListArray, ListArray, RecordBatch, RecordBatchIterator, StringArray};
use lancedb::Connection;
use std::sync::Arc;

use semsearch_core::types::IndexedChunk;

use crate::schema::{build_chunk_schema, EmbeddingLayout};
use crate::table::table_exists;

const INSERT_BATCH_SIZE: usize = 1000;

/// Append chunks to `table_name`, creating it with `layout` on first insert.
///
/// Returns the number of rows written. With a fixed layout every present
/// embedding must have exactly the column's dimension.
pub async fn insert_chunks(conn: &Connection, table_name: &str, chunks: &[IndexedChunk], layout: EmbeddingLayout) -> Result<usize> {
	if chunks.is_empty() { return Ok(0); }
	let mut written = 0usize;
	for batch in chunks.chunks(INSERT_BATCH_SIZE) {
		let record_batch = chunks_to_record_batch(batch, layout)?;
		let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if table_exists(conn, table_name).await? {
			conn.open_table(table_name).execute().await?.add(reader).execute().await?;
		} else {
			conn.create_table(table_name, reader).execute().await?;
		}
		written += batch.len();
		tracing::debug!(table = table_name, written, "inserted chunk batch");
	}
	Ok(written)
}

pub fn chunks_to_record_batch(chunks: &[IndexedChunk], layout: EmbeddingLayout) -> Result<RecordBatch> {
	let schema = build_chunk_schema(layout);
	let mut ids = Vec::with_capacity(chunks.len());
	let mut tenants = Vec::with_capacity(chunks.len());
	let mut entity_types = Vec::with_capacity(chunks.len());
	let mut entity_ids = Vec::with_capacity(chunks.len());
	let mut contents = Vec::with_capacity(chunks.len());
	let mut metadata: Vec<Option<String>> = Vec::with_capacity(chunks.len());
	let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());
	for c in chunks {
		if let (EmbeddingLayout::Fixed(dim), Some(e)) = (layout, c.embedding.as_ref()) {
			if e.len() != dim {
				return Err(anyhow!("chunk {} has a {}-dim embedding, table expects {}", c.id, e.len(), dim));
			}
		}
		ids.push(c.id.clone());
		tenants.push(c.tenant_id.clone());
		entity_types.push(c.entity_type.clone());
		entity_ids.push(c.entity_id.clone());
		contents.push(c.content.clone());
		metadata.push(c.metadata.as_ref().map(|m| m.to_string()));
		vectors.push(c.embedding.as_ref().map(|e| e.iter().map(|&x| Some(x)).collect()));
	}
	let embeddings: ArrayRef = match layout {
		EmbeddingLayout::Fixed(dim) => Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim as i32)),
		EmbeddingLayout::Variable => Arc::new(ListArray::from_iter_primitive::<Float32Type, _, _>(vectors)),
	};
	let record_batch = RecordBatch::try_new(schema, vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(tenants)),
		Arc::new(StringArray::from(entity_types)),
		Arc::new(StringArray::from(entity_ids)),
		Arc::new(StringArray::from(contents)),
		Arc::new(StringArray::from(metadata)),
		embeddings,
	])?;
	Ok(record_batch)
}

#[cfg(test)]
mod tests {
	use super::*;
	use arrow_array::Array;

	fn chunk(id: &str, embedding: Option<Vec<f32>>) -> IndexedChunk {
		IndexedChunk {
			id: id.into(),
			tenant_id: "t1".into(),
			entity_type: "listing".into(),
			entity_id: format!("L-{id}"),
			content: format!("content {id}"),
			embedding,
			metadata: Some(serde_json::json!({ "beds": 3 })),
		}
	}

	#[test]
	fn fixed_layout_keeps_null_embeddings() {
		let rb = chunks_to_record_batch(&[chunk("a", Some(vec![1.0, 0.0])), chunk("b", None)], EmbeddingLayout::Fixed(2)).expect("batch");
		assert_eq!(rb.num_rows(), 2);
		let col = rb.column_by_name("embedding").expect("embedding column");
		assert!(col.is_valid(0));
		assert!(col.is_null(1));
	}

	#[test]
	fn fixed_layout_rejects_wrong_dimension() {
		assert!(chunks_to_record_batch(&[chunk("a", Some(vec![1.0, 0.0, 0.0]))], EmbeddingLayout::Fixed(2)).is_err());
	}

	#[test]
	fn variable_layout_accepts_mixed_dimensions() {
		let rb = chunks_to_record_batch(&[chunk("a", Some(vec![1.0])), chunk("b", Some(vec![1.0, 2.0, 3.0]))], EmbeddingLayout::Variable).expect("batch");
		assert_eq!(rb.num_rows(), 2);
	}
}
