//! Arrow layout of the chunk table.
//!
//! The `embedding` column decides whether the table has native vector
//! capability: a `FixedSizeList<Float32, D>` column can be searched by
//! distance, a variable `List<Float32>` column can only be read back.

use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const EMBEDDING_COLUMN: &str = "embedding";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingLayout {
	/// Fixed-dimension vector column, searchable natively.
	Fixed(usize),
	/// Variable-length float list; mixed dimensions allowed, no native search.
	Variable,
}

fn item_field() -> Arc<Field> {
	Arc::new(Field::new("item", DataType::Float32, true))
}

pub fn embedding_data_type(layout: EmbeddingLayout) -> DataType {
	match layout {
		EmbeddingLayout::Fixed(dim) => DataType::FixedSizeList(item_field(), dim as i32),
		EmbeddingLayout::Variable => DataType::List(item_field()),
	}
}

pub fn build_chunk_schema(layout: EmbeddingLayout) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("tenant_id", DataType::Utf8, false),
		Field::new("entity_type", DataType::Utf8, false),
		Field::new("entity_id", DataType::Utf8, false),
		Field::new("content", DataType::Utf8, false),
		Field::new("metadata", DataType::Utf8, true),
		Field::new(EMBEDDING_COLUMN, embedding_data_type(layout), true),
	]))
}

/// Dimension of the native vector column, if the schema has one.
pub fn vector_dimension(schema: &Schema) -> Option<usize> {
	let field = schema.field_with_name(EMBEDDING_COLUMN).ok()?;
	match field.data_type() {
		DataType::FixedSizeList(item, dim) if item.data_type() == &DataType::Float32 && *dim > 0 => Some(*dim as usize),
		_ => None,
	}
}
