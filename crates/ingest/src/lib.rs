//! Build-time half of the pipeline: turn a document on disk into ordered
//! chunks and their embeddings.

pub mod chunker;
pub mod document;
pub mod embedding;

pub use chunker::{chunk_text, Chunk, ChunkConfig, ChunkError};
pub use document::{extract_text, load_path, load_pdf, ExtractedDocument, LoadError, PageContent};
pub use embedding::{embed_texts, CachedEmbedder, Embedder, EmbeddingError};
