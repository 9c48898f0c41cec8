use docqa_core::config::ChunkingConfig;
use docqa_core::{Classify, ErrorKind};
use thiserror::Error;

// ── Configuration ───────────────────────────────────────────────────────────

/// Window geometry, measured in whitespace-delimited words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Words per chunk (default: 350).
    pub chunk_size: usize,
    /// Words repeated from the end of the previous chunk (default: 100).
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 350,
            overlap: 100,
        }
    }
}

impl From<&ChunkingConfig> for ChunkConfig {
    fn from(c: &ChunkingConfig) -> Self {
        Self {
            chunk_size: c.chunk_size,
            overlap: c.overlap,
        }
    }
}

impl ChunkConfig {
    /// Reject geometries whose stride would be zero or negative.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(ChunkError::InvalidConfig {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// Words to advance between window starts. Only meaningful after `validate`.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Input text cannot be empty")]
    EmptyText,
    #[error("invalid chunking config: overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    InvalidConfig { chunk_size: usize, overlap: usize },
}

impl Classify for ChunkError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// A contiguous word window of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based ordinal position within the document.
    pub id: usize,
    /// Window words joined by single spaces.
    pub text: String,
}

impl Chunk {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Approximate token count via whitespace splitting.
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
