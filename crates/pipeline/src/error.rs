use docqa_core::{Classify, ErrorKind};
use docqa_index::IndexError;
use docqa_ingest::{ChunkError, EmbeddingError, LoadError};
use docqa_llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Generation(#[from] LlmError),
    #[error("system not ready: {0}")]
    NotReady(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Classify for PipelineError {
    fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Load(e) => e.kind(),
            PipelineError::Chunk(e) => e.kind(),
            PipelineError::Embedding(e) => e.kind(),
            PipelineError::Index(e) => e.kind(),
            PipelineError::Generation(e) => e.kind(),
            PipelineError::NotReady(_) => ErrorKind::NotReady,
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}
