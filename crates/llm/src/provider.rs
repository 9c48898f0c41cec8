use std::time::Duration;

use async_trait::async_trait;
use docqa_core::{Classify, ErrorKind};

use crate::config::GenerationConfig;

/// A text-generation backend. Each provider implements this.
///
/// `generate` returns the full text: the prompt followed by the model's
/// continuation, the way a causal language model pipeline reports it.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, LlmError>;

    /// Short provider label for logs.
    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("generation output has no '{0}' marker")]
    MissingMarker(String),
}

impl Classify for LlmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Generation
    }
}
