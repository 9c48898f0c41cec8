use std::sync::Arc;

use docqa_core::{Classify, ErrorKind};
use docqa_ingest::Chunk;
use serde::Serialize;
use thiserror::Error;

use crate::distance::{cosine_distance, magnitude};
use crate::tokens::TokenCounter;

/// Neighbours returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 3;
/// Token budget for [`VectorIndex::search_with_budget`] when none is configured.
pub const DEFAULT_MAX_TOKENS: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("cannot build an index from zero chunks")]
    Empty,
    #[error("got {embeddings} embeddings for {chunks} chunks")]
    LengthMismatch { embeddings: usize, chunks: usize },
    #[error("embedding {position} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },
    #[error("query has dimension {actual}, index has {expected}")]
    QueryDimensionMismatch { expected: usize, actual: usize },
}

impl Classify for IndexError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Processing
    }
}

/// A chunk returned by a search, with its cosine distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub id: usize,
    pub text: String,
    pub distance: f32,
}

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
    magnitude: f32,
    /// Filled in when a token counter is attached.
    tokens: Option<usize>,
}

/// Ordered `(chunk, embedding)` pairs searched by exhaustive cosine distance.
///
/// Built once per document and never mutated afterwards; share it behind an
/// `Arc` for concurrent queries.
pub struct VectorIndex {
    entries: Vec<Entry>,
    dimensions: usize,
    token_counter: Option<Arc<dyn TokenCounter>>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("len", &self.entries.len())
            .field("dimensions", &self.dimensions)
            .field("counts_tokens", &self.token_counter.is_some())
            .finish()
    }
}

impl VectorIndex {
    /// Pair `embeddings[i]` with `chunks[i]`.
    ///
    /// Both sides must have the same non-zero length and every embedding the
    /// same non-zero dimension.
    pub fn build(embeddings: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> Result<Self, IndexError> {
        if embeddings.len() != chunks.len() {
            return Err(IndexError::LengthMismatch {
                embeddings: embeddings.len(),
                chunks: chunks.len(),
            });
        }
        if chunks.is_empty() {
            return Err(IndexError::Empty);
        }

        let dimensions = embeddings[0].len();
        let mut entries = Vec::with_capacity(chunks.len());
        for (position, (vector, chunk)) in embeddings.into_iter().zip(chunks).enumerate() {
            if vector.is_empty() || vector.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    position,
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
            entries.push(Entry {
                magnitude: magnitude(&vector),
                chunk,
                vector,
                tokens: None,
            });
        }

        tracing::info!(chunks = entries.len(), dimensions, "built vector index");
        Ok(Self {
            entries,
            dimensions,
            token_counter: None,
        })
    }

    /// Build from bare texts; chunk ids are the positions.
    pub fn from_texts(embeddings: Vec<Vec<f32>>, texts: Vec<String>) -> Result<Self, IndexError> {
        let chunks = texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Chunk::new(id, text))
            .collect();
        Self::build(embeddings, chunks)
    }

    /// Attach a token counter, enabling budgeted search. Every chunk is
    /// counted once, here.
    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        for entry in &mut self.entries {
            entry.tokens = Some(counter.count(&entry.chunk.text));
        }
        self.token_counter = Some(counter);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn counts_tokens(&self) -> bool {
        self.token_counter.is_some()
    }

    /// The `k` nearest chunks by ascending cosine distance.
    ///
    /// Equal distances keep document order. `k` larger than the index
    /// returns every chunk.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, IndexError> {
        Ok(self
            .ranked(query, k)?
            .into_iter()
            .map(|(i, distance)| self.retrieved(i, distance))
            .collect())
    }

    /// Walk the `k` nearest chunks in distance order, keeping them while the
    /// running token total stays within `max_tokens`.
    ///
    /// Accumulation stops at the first chunk that would overflow the budget;
    /// a smaller, worse-ranked chunk after it is never considered. Without a
    /// token counter this is plain [`search`](Self::search).
    pub fn search_with_budget(
        &self,
        query: &[f32],
        k: usize,
        max_tokens: usize,
    ) -> Result<Vec<RetrievedChunk>, IndexError> {
        if self.token_counter.is_none() {
            return self.search(query, k);
        }

        let mut selected = Vec::new();
        let mut used = 0usize;
        for (i, distance) in self.ranked(query, k)? {
            let tokens = self.entries[i].tokens.unwrap_or(0);
            if used + tokens > max_tokens {
                tracing::debug!(
                    used,
                    next = tokens,
                    max_tokens,
                    kept = selected.len(),
                    "token budget exhausted"
                );
                break;
            }
            used += tokens;
            selected.push(self.retrieved(i, distance));
        }
        Ok(selected)
    }

    fn ranked(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::QueryDimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        let query_mag = magnitude(query);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let d = cosine_distance(query, &e.vector, query_mag, e.magnitude);
                (i, if d.is_nan() { f32::INFINITY } else { d })
            })
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }

    fn retrieved(&self, i: usize, distance: f32) -> RetrievedChunk {
        let chunk = &self.entries[i].chunk;
        RetrievedChunk {
            id: chunk.id,
            text: chunk.text.clone(),
            distance,
        }
    }
}

/// Newline-join retrieved chunk texts into a prompt context.
pub fn join_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
