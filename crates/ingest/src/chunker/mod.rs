//! Fixed-stride word-window chunking.
//!
//! Splits document text into overlapping windows of whitespace-delimited
//! words. Each window after the first starts `chunk_size - overlap` words
//! after its predecessor.

mod types;
mod window;

pub use types::{Chunk, ChunkConfig, ChunkError};
pub use window::chunk_text;
