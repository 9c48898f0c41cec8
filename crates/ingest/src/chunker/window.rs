use super::types::{Chunk, ChunkConfig, ChunkError};

/// Split `text` into overlapping word windows.
///
/// Windows start at `0, stride, 2 * stride, ...` and the last one may be
/// shorter than `chunk_size`. Iteration stops after the first window that
/// reaches the final word.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>, ChunkError> {
    config.validate()?;

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Err(ChunkError::EmptyText);
    }

    let stride = config.stride();
    let mut chunks = Vec::with_capacity(words.len() / stride + 1);
    let mut start = 0;

    loop {
        let end = (start + config.chunk_size).min(words.len());
        chunks.push(Chunk::new(chunks.len(), words[start..end].join(" ")));
        if end == words.len() {
            break;
        }
        start += stride;
    }

    tracing::debug!(
        words = words.len(),
        chunks = chunks.len(),
        chunk_size = config.chunk_size,
        overlap = config.overlap,
        "chunked text"
    );
    Ok(chunks)
}
