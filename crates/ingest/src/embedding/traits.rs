use async_trait::async_trait;
use docqa_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Input texts cannot be empty")]
    EmptyInput,

    #[error("Embedder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding provider not configured: {0}")]
    NotConfigured(String),
}

impl Classify for EmbeddingError {
    fn kind(&self) -> ErrorKind {
        match self {
            EmbeddingError::EmptyInput => ErrorKind::InvalidInput,
            _ => ErrorKind::Processing,
        }
    }
}

/// Check a backend response: one vector per input, each `dims` wide.
pub(crate) fn check_vectors(
    vectors: &[Vec<f32>],
    inputs: usize,
    dims: usize,
) -> Result<(), EmbeddingError> {
    if vectors.len() != inputs {
        return Err(EmbeddingError::CountMismatch {
            expected: inputs,
            actual: vectors.len(),
        });
    }
    match vectors.iter().find(|v| v.len() != dims) {
        Some(bad) => Err(EmbeddingError::DimensionMismatch {
            expected: dims,
            actual: bad.len(),
        }),
        None => Ok(()),
    }
}

/// Trait for embedding backends (Ollama, OpenAI, ...).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;
}
