//! In-memory cosine nearest-neighbour index over document chunks.

pub mod distance;
pub mod index;
pub mod tokens;

pub use index::{join_context, IndexError, RetrievedChunk, VectorIndex, DEFAULT_MAX_TOKENS, DEFAULT_TOP_K};
pub use tokens::{TokenCounter, WhitespaceTokenCounter};
