use std::path::Path;

use semsearch_core::types::ChunkFilter;
use semsearch_core::traits::ChunkStore;
use semsearch_vector::schema::vector_dimension;
use semsearch_vector::table::open_db;
use semsearch_vector::LanceChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
    let db_path = ws_root.join("dev_data/lancedb");
    let tenant = std::env::args().nth(1).unwrap_or_else(|| "t1".to_string());
    let conn = open_db(&db_path.to_string_lossy()).await?;
    let schema = conn.open_table("chunks").execute().await?.schema().await?;
    match vector_dimension(&schema) {
        Some(dim) => println!("chunks: native vector column, dim={}", dim),
        None => println!("chunks: no native vector column (fallback scoring only)"),
    }
    let store = LanceChunkStore::from_connection(conn, "chunks");
    let rows = store.candidates(&ChunkFilter::tenant(&tenant), 1_000_000).await?;
    let with_vec = rows.iter().filter(|r| r.embedding.is_some()).count();
    println!("tenant {}: total={} with_embedding={}", tenant, rows.len(), with_vec);
    Ok(())
}
