//! Embedding providers: a deterministic hash mock and a remote vendor client.
//!
//! Pick one with [`provider_from_settings`]; the choice is made once, at
//! construction, from the configured provider alias.

use semsearch_core::config::EmbeddingSettings;
use semsearch_core::error::EmbedError;
use semsearch_core::traits::EmbedProvider;

pub mod mock;
pub mod vendor;

pub use mock::{hash_embedding, HashEmbedder};
pub use vendor::VendorEmbedder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Vendor,
}

impl ProviderKind {
    /// Map a configured alias onto a provider; `None` for unrecognised names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "mock" | "hash" | "fake" => Some(Self::Mock),
            "openai" | "llm" | "vendor" | "remote" => Some(Self::Vendor),
            _ => None,
        }
    }

    /// Like [`ProviderKind::parse`], warning and falling back to the mock.
    pub fn resolve(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(provider = name, "unknown embedding provider, using mock embeddings");
            Self::Mock
        })
    }
}

pub fn provider_from_settings(settings: &EmbeddingSettings) -> Result<Box<dyn EmbedProvider>, EmbedError> {
    match ProviderKind::resolve(&settings.provider) {
        ProviderKind::Mock => {
            tracing::debug!(dim = settings.dimension, "using hash embeddings");
            Ok(Box::new(HashEmbedder::new(settings.dimension)))
        }
        ProviderKind::Vendor => Ok(Box::new(VendorEmbedder::new(settings)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_closed_set() {
        assert_eq!(ProviderKind::parse("MOCK"), Some(ProviderKind::Mock));
        assert_eq!(ProviderKind::parse(""), Some(ProviderKind::Mock));
        assert_eq!(ProviderKind::parse("openai"), Some(ProviderKind::Vendor));
        assert_eq!(ProviderKind::parse(" LLM "), Some(ProviderKind::Vendor));
        assert_eq!(ProviderKind::parse("cohere"), None);
        assert_eq!(ProviderKind::resolve("cohere"), ProviderKind::Mock);
    }

    #[test]
    fn factory_builds_selected_provider() {
        let mock = provider_from_settings(&EmbeddingSettings::default()).expect("mock");
        assert_eq!(mock.provider_id(), "mock:d768");

        let vendor = provider_from_settings(&EmbeddingSettings { provider: "openai".into(), ..EmbeddingSettings::default() })
            .expect("vendor");
        assert_eq!(vendor.provider_id(), "openai:text-embedding-3-small");

        let unknown = provider_from_settings(&EmbeddingSettings { provider: "bogus".into(), dimension: 16, ..EmbeddingSettings::default() })
            .expect("fallback");
        assert_eq!(unknown.provider_id(), "mock:d16");
        assert_eq!(unknown.dim(), 16);
    }
}
