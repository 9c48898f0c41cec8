use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{check_vectors, Embedder, EmbeddingError};

/// Embedder backed by a local Ollama instance (`POST /api/embed`).
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(url: String, model: String, dimensions: usize) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.trim_end_matches('/').to_string(),
            model,
            dimensions,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.url)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    /// Clip inputs longer than the model's context instead of failing.
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            truncate: true,
        };
        debug!(model = %self.model, count = texts.len(), "Ollama embed request");

        let response = self.client.post(self.endpoint()).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: EmbedResponse = response.json().await?;
        check_vectors(&parsed.embeddings, texts.len(), self.dimensions)?;
        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_batch_and_truncation() {
        let texts = ["first chunk", "second chunk"];
        let body = serde_json::to_value(EmbedRequest {
            model: "all-minilm",
            input: &texts,
            truncate: true,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "all-minilm",
                "input": ["first chunk", "second chunk"],
                "truncate": true
            })
        );
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let e = OllamaEmbedder::new("http://localhost:11434/".into(), "all-minilm".into(), 384);
        assert_eq!(e.endpoint(), "http://localhost:11434/api/embed");
        assert_eq!(e.dimensions(), 384);
    }
}
