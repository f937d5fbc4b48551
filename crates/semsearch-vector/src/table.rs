//! LanceDB connection and housekeeping helpers.

use anyhow::Result;
use arrow_array::{RecordBatch, RecordBatchIterator};
use arrow_schema::ArrowError;
use lancedb::{connect, Connection};

use crate::schema::{build_chunk_schema, EmbeddingLayout};

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

/// Create an empty chunk table with the given embedding layout unless it exists.
pub async fn ensure_chunk_table(conn: &Connection, name: &str, layout: EmbeddingLayout) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    let schema = build_chunk_schema(layout);
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(Vec::<Result<RecordBatch, ArrowError>>::new(), schema);
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}
