use thiserror::Error;

/// Message fragment Postgres-style drivers emit when the vector extension is missing.
pub const VECTOR_TYPE_MISSING: &str = "type \"vector\" does not exist";

#[derive(Debug, Error)]
pub enum EmbedError {
    /// The selected provider lacks credentials or an endpoint.
    #[error("Invalid embedding configuration: {0}")]
    Config(String),

    /// Transport, HTTP or payload failure reported by the remote provider.
    #[error("embedding request failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has no native vector type/operator for this table.
    #[error("vector similarity unsupported: {0}")]
    VectorUnsupported(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Whether this failure means "no native vector capability".
    ///
    /// Accessors should raise [`StoreError::VectorUnsupported`] themselves; a
    /// `Backend` error is also accepted when some message in its chain carries
    /// [`VECTOR_TYPE_MISSING`], for drivers that only report text.
    pub fn is_vector_unsupported(&self) -> bool {
        match self {
            StoreError::VectorUnsupported(_) => true,
            StoreError::Backend(err) => err.chain().any(|cause| cause.to_string().contains(VECTOR_TYPE_MISSING)),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Embedding(#[from] EmbedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
