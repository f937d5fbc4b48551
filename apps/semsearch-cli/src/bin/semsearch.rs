//! `semsearch`: tenant-scoped semantic search from the command line.
//!
//! ```bash
//! semsearch search "3 bed ranch house" --tenant t1 -n 5
//! semsearch load chunks.jsonl --embed-missing
//! semsearch embed "ranch house" "downtown condo"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use semsearch_cli::{embed_missing, format_human, format_json, read_chunks, vector_norm};
use semsearch_core::config::{Config, Settings};
use semsearch_core::traits::EmbedOptions;
use semsearch_core::types::SearchQuery;
use semsearch_embed::provider_from_settings;
use semsearch_engine::SemanticSearchEngine;
use semsearch_vector::table::{ensure_chunk_table, open_db};
use semsearch_vector::{insert_chunks, EmbeddingLayout, LanceChunkStore};

#[derive(Parser)]
#[command(name = "semsearch", version, about = "Semantic search over tenant-scoped chunks")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search one tenant's chunks
    Search(SearchArgs),
    /// Append JSON-lines chunks to the configured table
    Load(LoadArgs),
    /// Embed texts with the configured provider and print vector stats
    Embed {
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[derive(Args)]
struct SearchArgs {
    query: String,

    #[arg(long, env = "SEMSEARCH_TENANT")]
    tenant: String,

    #[arg(long)]
    entity_type: Option<String>,

    #[arg(long)]
    entity_id: Option<String>,

    /// Maximum number of results (clamped to 1..=20)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LoadArgs {
    file: PathBuf,

    /// Fixed embedding dimension for a new table (default: embedding.dimension)
    #[arg(long, conflicts_with = "variable")]
    dim: Option<usize>,

    /// Store embeddings as variable-length lists (no native vector search)
    #[arg(long)]
    variable: bool,

    /// Embed rows that arrive without an embedding
    #[arg(long)]
    embed_missing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings();

    match cli.command {
        Command::Search(args) => search(settings, args).await,
        Command::Load(args) => load(settings, args).await,
        Command::Embed { texts } => embed(settings, texts).await,
    }
}

async fn search(settings: &Settings, args: SearchArgs) -> Result<()> {
    let store = LanceChunkStore::open(&settings.store.uri, &settings.store.table).await?;
    let engine = SemanticSearchEngine::from_settings(settings, store)?;

    let mut query = SearchQuery::new(args.tenant, args.query);
    query.entity_type = args.entity_type;
    query.entity_id = args.entity_id;
    query.limit = args.limit;

    let outcome = engine.search_with_path(&query).await?;
    if args.json {
        println!("{}", format_json(&query, &outcome)?);
    } else {
        print!("{}", format_human(&query, &outcome));
    }
    Ok(())
}

async fn load(settings: &Settings, args: LoadArgs) -> Result<()> {
    let mut chunks = read_chunks(&args.file)?;
    let layout = if args.variable {
        EmbeddingLayout::Variable
    } else {
        EmbeddingLayout::Fixed(args.dim.unwrap_or(settings.embedding.dimension))
    };

    if args.embed_missing {
        let provider = provider_from_settings(&settings.embedding)?;
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} embedding [{bar:40}] {pos}/{len}")
                .context("invalid progress template")?
                .progress_chars("=> "),
        );
        let filled = embed_missing(provider.as_ref(), &mut chunks, &bar).await?;
        bar.finish_and_clear();
        println!("Embedded {} rows with {}", filled, provider.provider_id());
    }

    let conn = open_db(&settings.store.uri).await?;
    ensure_chunk_table(&conn, &settings.store.table, layout).await?;
    let written = insert_chunks(&conn, &settings.store.table, &chunks, layout).await?;
    println!("Loaded {} chunks into {} ({:?})", written, settings.store.table, layout);
    Ok(())
}

async fn embed(settings: &Settings, texts: Vec<String>) -> Result<()> {
    let provider = provider_from_settings(&settings.embedding)?;
    let vectors = provider.embed(&texts, &EmbedOptions::default()).await?;
    println!("provider: {}", provider.provider_id());
    for (text, v) in texts.iter().zip(&vectors) {
        println!("{:>5} dims  norm {:.4}  {}", v.len(), vector_norm(v), text);
    }
    Ok(())
}
