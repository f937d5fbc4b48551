use semsearch_core::config::EmbeddingSettings;
use semsearch_core::traits::{EmbedOptions, EmbedProvider};
use semsearch_embed::provider_from_settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let embedder = provider_from_settings(&EmbeddingSettings::default())?;
    let texts = vec!["hello world".to_string(), "ranch house with pool".to_string()];
    let embs = embedder.embed(&texts, &EmbedOptions::default()).await?;
    println!("provider={} B={} dim={}", embedder.provider_id(), embs.len(), embedder.dim());
    Ok(())
}
