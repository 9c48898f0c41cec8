pub mod batcher;
pub mod cache;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use docqa_core::config::EmbeddingConfig;

pub use batcher::{embed_one, embed_texts};
pub use cache::{CachedEmbedder, EmbeddingCache};
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Create the embedding backend named by `config.provider`, wrapped in an
/// LRU cache when `cache_capacity > 0`.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.provider.as_str() {
        "ollama" => {
            let inner = OllamaEmbedder::new(
                config.url.clone(),
                config.model.clone(),
                config.dimensions,
            );
            Ok(with_cache(inner, config.cache_capacity))
        }
        "openai" => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let inner = OpenAiEmbedder::new(
                api_key,
                config.model.clone(),
                config.openai_base_url.clone(),
                config.dimensions,
            );
            Ok(with_cache(inner, config.cache_capacity))
        }
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: '{}'",
            other
        ))),
    }
}

fn with_cache<E: Embedder + 'static>(inner: E, capacity: usize) -> Arc<dyn Embedder> {
    if capacity == 0 {
        Arc::new(inner)
    } else {
        Arc::new(CachedEmbedder::new(inner, capacity))
    }
}
