use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::provider::{LlmError, TextGenerator};

/// Raw completion against Ollama's `/api/generate`.
///
/// The prompt is sent with `raw: true` so no chat template is wrapped around
/// it, which keeps the output a plain continuation of the prompt.
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            url: url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

/// Map decoding parameters onto Ollama's `options` object.
///
/// Ollama has no n-gram blocking or pad token, so those are not sent; greedy
/// decoding is expressed as temperature 0 with a fixed seed.
pub(crate) fn options(config: &GenerationConfig) -> Value {
    let mut opts = Map::new();
    opts.insert("num_predict".into(), json!(config.max_new_tokens));
    opts.insert("repeat_penalty".into(), json!(config.repetition_penalty));
    if config.no_repeat_ngram_size > 0 {
        debug!(
            size = config.no_repeat_ngram_size,
            "no_repeat_ngram_size has no Ollama equivalent; not sent"
        );
    }
    if config.is_deterministic() {
        opts.insert("temperature".into(), json!(0.0));
        opts.insert("seed".into(), json!(config.seed.unwrap_or(0)));
    } else {
        if let Some(t) = config.temperature {
            opts.insert("temperature".into(), json!(t));
        }
        if let Some(seed) = config.seed {
            opts.insert("seed".into(), json!(seed));
        }
    }
    Value::Object(opts)
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.url);

        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "raw": true,
            "stream": false,
            "options": options(config),
        });

        debug!("Ollama generate request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: Value = response.json().await?;
        let continuation = resp["response"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing response".into()))?;

        Ok(format!("{prompt}{continuation}"))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
