//! Tenant-scoped semantic search over stored chunks.
//!
//! [`SemanticSearchEngine`] embeds the query once, asks the store for a
//! native nearest-neighbour ranking and, only when the store reports that it
//! has no vector support, ranks candidate rows in process instead.

use semsearch_core::config::{SearchSettings, Settings};
use semsearch_core::error::{EmbedError, Result};
use semsearch_core::traits::{ChunkStore, EmbedOptions, EmbedProvider};
use semsearch_core::types::{clamp_limit, NearestQuery, ScoredResult, SearchPath, SearchQuery};

pub mod fallback;
pub mod memory;

pub use memory::InMemoryChunkStore;

/// Results of one search along with the path that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<ScoredResult>,
    pub path: SearchPath,
}

pub struct SemanticSearchEngine<S> where S: ChunkStore {
    store: S,
    embedder: Box<dyn EmbedProvider>,
    settings: SearchSettings,
    model: Option<String>,
}

impl<S> SemanticSearchEngine<S> where S: ChunkStore {
    pub fn new(store: S, embedder: Box<dyn EmbedProvider>, settings: SearchSettings) -> Self {
        Self { store, embedder, settings, model: None }
    }

    /// Build the configured embedding provider and wire it to `store`.
    pub fn from_settings(settings: &Settings, store: S) -> std::result::Result<Self, EmbedError> {
        let embedder = semsearch_embed::provider_from_settings(&settings.embedding)?;
        Ok(Self::new(store, embedder, settings.search.clone()).with_model(settings.embedding.model.clone()))
    }

    /// Model name forwarded to the provider on every call.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn store(&self) -> &S { &self.store }

    pub fn embedder(&self) -> &dyn EmbedProvider { self.embedder.as_ref() }

    /// The clamped result count for a request.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        clamp_limit(requested.unwrap_or(self.settings.default_limit))
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredResult>> {
        Ok(self.search_with_path(query).await?.results)
    }

    pub async fn search_with_path(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        let limit = self.effective_limit(query.limit);
        let options = EmbedOptions { tenant_id: Some(query.tenant_id.clone()), model: self.model.clone() };
        let vector = self
            .embedder
            .embed(std::slice::from_ref(&query.text), &options)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        if vector.is_empty() || fallback::l2_norm(&vector) == 0.0 {
            tracing::debug!(tenant = %query.tenant_id, "query embedding has no direction, nothing to rank");
            return Ok(SearchOutcome { results: Vec::new(), path: SearchPath::Native });
        }
        let dim = vector.len();
        let filter = query.filter();

        tracing::debug!(tenant = %query.tenant_id, dim, limit, provider = self.embedder.provider_id(), "native vector search");
        let native = NearestQuery { vector: &vector, dim, filter: &filter, limit };
        match self.store.nearest(&native).await {
            Ok(hits) => {
                let mut results: Vec<ScoredResult> =
                    hits.into_iter().filter(|h| h.score.is_finite()).map(ScoredResult::from).collect();
                results.truncate(limit);
                Ok(SearchOutcome { results, path: SearchPath::Native })
            }
            Err(err) if err.is_vector_unsupported() => {
                tracing::info!(tenant = %query.tenant_id, reason = %err, "vector search unavailable, ranking in process");
                let results = fallback::rank(&self.store, &vector, &filter, limit).await?;
                Ok(SearchOutcome { results, path: SearchPath::Fallback })
            }
            Err(err) => Err(err.into()),
        }
    }
}
