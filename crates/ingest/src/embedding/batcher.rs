use super::traits::{Embedder, EmbeddingError};

/// Embed `texts` in batches of at most `batch_size`, preserving order.
///
/// Every returned vector is checked against the first one so the caller gets
/// exactly one fixed-dimension vector per input or an error.
pub async fn embed_texts(
    embedder: &dyn Embedder,
    texts: &[&str],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    let batch_size = batch_size.max(1);

    let mut out: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        let vectors = embedder.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: batch.len(),
                actual: vectors.len(),
            });
        }
        out.extend(vectors);
    }

    let dims = out[0].len();
    if dims == 0 {
        return Err(EmbeddingError::Api("embedding vectors are empty".to_string()));
    }
    if let Some(bad) = out.iter().find(|v| v.len() != dims) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dims,
            actual: bad.len(),
        });
    }

    tracing::debug!(count = out.len(), dims, "embedded texts");
    Ok(out)
}

/// Embed a single text, e.g. a question.
pub async fn embed_one(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    let mut vectors = embed_texts(embedder, &[text], 1).await?;
    Ok(vectors.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Encodes each text as `[len, first byte, call index]`.
    struct FakeEmbedder {
        call_count: AtomicUsize,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst) as f32;
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, t.bytes().next().unwrap_or(0) as f32, call])
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Drops the last vector of every batch.
    struct LossyEmbedder;

    #[async_trait]
    impl Embedder for LossyEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    /// Returns a different dimension for each input.
    struct RaggedEmbedder;

    #[async_trait]
    impl Embedder for RaggedEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|t| vec![0.5; t.len()]).collect())
        }

        fn dimensions(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn one_vector_per_text_in_order() {
        let embedder = FakeEmbedder::new();
        let texts = ["a", "bb", "ccc", "dddd", "eeeee"];
        let vectors = embed_texts(&embedder, &texts, 2).await.unwrap();

        assert_eq!(vectors.len(), 5);
        assert!(vectors.iter().all(|v| v.len() == 3));
        let lens: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lens, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        // 5 texts in batches of 2 → 3 calls.
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 3);
        assert_eq!(vectors[4][2], 2.0);
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let embedder = FakeEmbedder::new();
        let err = embed_texts(&embedder, &[], 8).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyInput));
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_vectors_are_detected() {
        let err = embed_texts(&LossyEmbedder, &["a", "b"], 8).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn ragged_dimensions_are_detected() {
        let err = embed_texts(&RaggedEmbedder, &["ab", "abc"], 8).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn zero_batch_size_is_treated_as_one() {
        let embedder = FakeEmbedder::new();
        let vectors = embed_texts(&embedder, &["x", "y"], 0).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn embed_one_returns_single_vector() {
        let v = embed_one(&FakeEmbedder::new(), "hello").await.unwrap();
        assert_eq!(v, vec![5.0, b'h' as f32, 0.0]);
    }
}
