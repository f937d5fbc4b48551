use anyhow::{anyhow, Context, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{Array, ArrayRef, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::table::Table;
use lancedb::{Connection, DistanceType};
use serde_json::Value;

use semsearch_core::error::StoreError;
use semsearch_core::traits::ChunkStore;
use semsearch_core::types::{ChunkFilter, IndexedChunk, NearestQuery, StoreHit};

use crate::schema::{vector_dimension, EMBEDDING_COLUMN};

/// Chunk table in LanceDB, searched natively when its embedding column is a
/// fixed-size vector.
pub struct LanceChunkStore { pub(crate) db: Connection, pub(crate) table_name: String }

impl LanceChunkStore {
	pub async fn open(uri: &str, table_name: &str) -> Result<Self> {
		let db = crate::table::open_db(uri).await?;
		Ok(Self { db, table_name: table_name.to_string() })
	}

	pub fn from_connection(db: Connection, table_name: &str) -> Self {
		Self { db, table_name: table_name.to_string() }
	}

	pub fn table_name(&self) -> &str { &self.table_name }

	async fn table(&self) -> Result<Table> {
		self.db
			.open_table(&self.table_name)
			.execute()
			.await
			.with_context(|| format!("failed to open table `{}`", self.table_name))
	}
}

#[async_trait]
impl ChunkStore for LanceChunkStore {
	async fn nearest(&self, query: &NearestQuery<'_>) -> Result<Vec<StoreHit>, StoreError> {
		let table = self.table().await?;
		let schema = table.schema().await.context("failed to read table schema")?;
		let column_dim = vector_dimension(&schema).ok_or_else(|| {
			StoreError::VectorUnsupported(format!(
				"column `{}` of table `{}` is not a fixed-size float vector",
				EMBEDDING_COLUMN, self.table_name
			))
		})?;
		if query.vector.len() != query.dim || column_dim != query.dim {
			return Err(anyhow!(
				"query vector has {} dimensions (expected {}), column `{}` has {}",
				query.vector.len(), query.dim, EMBEDDING_COLUMN, column_dim
			).into());
		}

		let predicate = format!("{} AND {} IS NOT NULL", filter_predicate(query.filter), EMBEDDING_COLUMN);
		let stream = table
			.vector_search(query.vector.to_vec())
			.context("failed to build vector query")?
			.column(EMBEDDING_COLUMN)
			.distance_type(DistanceType::Cosine)
			.only_if(predicate)
			.limit(query.limit)
			.execute()
			.await
			.context("vector query failed")?;
		let batches: Vec<RecordBatch> = stream.try_collect().await.context("failed to read vector query results")?;

		let mut hits = Vec::new();
		for batch in &batches { hits.extend(hits_from_batch(batch)?); }
		hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
		hits.truncate(query.limit);
		Ok(hits)
	}

	async fn candidates(&self, filter: &ChunkFilter, max_rows: usize) -> Result<Vec<IndexedChunk>, StoreError> {
		let table = self.table().await?;
		let stream = table
			.query()
			.only_if(filter_predicate(filter))
			.limit(max_rows)
			.execute()
			.await
			.context("candidate query failed")?;
		let batches: Vec<RecordBatch> = stream.try_collect().await.context("failed to read candidate rows")?;

		let mut rows = Vec::new();
		for batch in &batches { rows.extend(chunks_from_batch(batch)?); }
		rows.truncate(max_rows);
		Ok(rows)
	}
}

/// Quote a string as a SQL literal. LanceDB filters take no bound
/// parameters, so every user value goes through here.
pub fn sql_literal(value: &str) -> String {
	format!("'{}'", value.replace('\'', "''"))
}

/// `tenant_id = '..'` plus optional entity predicates, joined with AND.
pub fn filter_predicate(filter: &ChunkFilter) -> String {
	let mut clauses = vec![format!("tenant_id = {}", sql_literal(&filter.tenant_id))];
	if let Some(t) = &filter.entity_type { clauses.push(format!("entity_type = {}", sql_literal(t))); }
	if let Some(id) = &filter.entity_id { clauses.push(format!("entity_id = {}", sql_literal(id))); }
	clauses.join(" AND ")
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_string_opt::<i32>())
		.ok_or_else(|| anyhow!("missing or non-string column `{}`", name))
}

fn metadata_at(col: &StringArray, row: usize) -> Option<Value> {
	if col.is_null(row) { return None; }
	let raw = col.value(row);
	match serde_json::from_str::<Value>(raw) {
		Ok(Value::Null) => None,
		Ok(v) => Some(v),
		Err(_) => Some(Value::String(raw.to_string())),
	}
}

/// Read one embedding cell from either a fixed-size or variable list column.
fn embedding_at(col: &ArrayRef, row: usize) -> Result<Option<Vec<f32>>> {
	if col.is_null(row) { return Ok(None); }
	let values = if let Some(list) = col.as_fixed_size_list_opt() {
		list.value(row)
	} else if let Some(list) = col.as_list_opt::<i32>() {
		list.value(row)
	} else if let Some(list) = col.as_list_opt::<i64>() {
		list.value(row)
	} else {
		return Err(anyhow!("column `{}` is not a list of floats", EMBEDDING_COLUMN));
	};
	let floats = values
		.as_primitive_opt::<Float32Type>()
		.ok_or_else(|| anyhow!("column `{}` items are not Float32", EMBEDDING_COLUMN))?;
	if floats.null_count() > 0 { return Ok(None); }
	Ok(Some(floats.values().to_vec()))
}

fn hits_from_batch(batch: &RecordBatch) -> Result<Vec<StoreHit>> {
	let ids = string_column(batch, "id")?;
	let contents = string_column(batch, "content")?;
	let entity_types = string_column(batch, "entity_type")?;
	let entity_ids = string_column(batch, "entity_id")?;
	let metadata = string_column(batch, "metadata")?;
	let distances = batch
		.column_by_name("_distance")
		.and_then(|c| c.as_primitive_opt::<Float32Type>())
		.ok_or_else(|| anyhow!("vector query returned no `_distance` column"))?;
	let mut hits = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		// Cosine distance against a zero vector is NaN.
		if distances.is_null(i) || !distances.value(i).is_finite() { continue; }
		hits.push(StoreHit {
			id: ids.value(i).to_string(),
			content: contents.value(i).to_string(),
			entity_type: entity_types.value(i).to_string(),
			entity_id: entity_ids.value(i).to_string(),
			score: 1.0 - distances.value(i),
			metadata: metadata_at(metadata, i),
		});
	}
	Ok(hits)
}

fn chunks_from_batch(batch: &RecordBatch) -> Result<Vec<IndexedChunk>> {
	let ids = string_column(batch, "id")?;
	let tenants = string_column(batch, "tenant_id")?;
	let contents = string_column(batch, "content")?;
	let entity_types = string_column(batch, "entity_type")?;
	let entity_ids = string_column(batch, "entity_id")?;
	let metadata = string_column(batch, "metadata")?;
	let embeddings = batch
		.column_by_name(EMBEDDING_COLUMN)
		.ok_or_else(|| anyhow!("missing column `{}`", EMBEDDING_COLUMN))?;
	let mut rows = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		rows.push(IndexedChunk {
			id: ids.value(i).to_string(),
			tenant_id: tenants.value(i).to_string(),
			entity_type: entity_types.value(i).to_string(),
			entity_id: entity_ids.value(i).to_string(),
			content: contents.value(i).to_string(),
			embedding: embedding_at(embeddings, i)?,
			metadata: metadata_at(metadata, i),
		});
	}
	Ok(rows)
}
