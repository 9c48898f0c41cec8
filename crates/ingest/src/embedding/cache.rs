use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use lru::LruCache;

use super::traits::{Embedder, EmbeddingError};

/// LRU cache mapping text hash to embedding vector.
pub struct EmbeddingCache {
    cache: LruCache<u64, Vec<f32>>,
    hits: u64,
    misses: u64,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    fn hash_text(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }

    /// Look up a cached embedding by text.
    pub fn get(&mut self, text: &str) -> Option<Vec<f32>> {
        let key = Self::hash_text(text);
        if let Some(vec) = self.cache.get(&key) {
            self.hits += 1;
            Some(vec.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store an embedding for a text.
    pub fn put(&mut self, text: &str, embedding: Vec<f32>) {
        let key = Self::hash_text(text);
        self.cache.put(key, embedding);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Wraps an embedder with an [`EmbeddingCache`] so repeated questions skip
/// the embedding service. Only texts missing from the cache are sent, in one
/// batch, and results are stitched back in input order.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<EmbeddingCache>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(EmbeddingCache::new(capacity)),
        }
    }

    /// `(hits, misses)` so far.
    pub fn stats(&self) -> (u64, u64) {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        (cache.hits(), cache.misses())
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<(usize, &str)> = Vec::new();
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            for (i, text) in texts.iter().enumerate() {
                let hit = cache.get(text);
                if hit.is_none() {
                    missing.push((i, *text));
                }
                out.push(hit);
            }
        }

        if !missing.is_empty() {
            let batch: Vec<&str> = missing.iter().map(|(_, t)| *t).collect();
            let fresh = self.inner.embed_batch(&batch).await?;
            if fresh.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    actual: fresh.len(),
                });
            }
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            for ((i, text), vector) in missing.into_iter().zip(fresh) {
                cache.put(text, vector.clone());
                out[i] = Some(vector);
            }
        }

        Ok(out.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}
