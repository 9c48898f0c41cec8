use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{check_vectors, Embedder, EmbeddingError};

/// Embedder for any OpenAI-compatible `/v1/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: String, base_url: Option<String>, dimensions: usize) -> Self {
        let base_url = base_url.as_deref().unwrap_or("https://api.openai.com");
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
    index: usize,
}

/// Items may arrive in any order; `index` refers to the input position.
fn into_ordered(mut data: Vec<EmbedItem>) -> Vec<Vec<f32>> {
    data.sort_by_key(|item| item.index);
    data.into_iter().map(|item| item.embedding).collect()
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };
        debug!(model = %self.model, count = texts.len(), "OpenAI embed request");

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: EmbedResponse = response.json().await?;
        let vectors = into_ordered(parsed.data);
        check_vectors(&vectors, texts.len(), self.dimensions)?;
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
