use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::provider::{LlmError, TextGenerator};

/// Legacy completions endpoint (`/v1/completions`), which continues a raw
/// prompt rather than a chat transcript.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, model: String, base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

pub(crate) fn request_body(model: &str, prompt: &str, config: &GenerationConfig) -> Value {
    let temperature = if config.is_deterministic() {
        0.0
    } else {
        config.temperature.unwrap_or(1.0)
    };
    let mut body = json!({
        "model": model,
        "prompt": prompt,
        "max_tokens": config.max_new_tokens,
        "temperature": temperature,
        // The closest this API has to a repetition penalty.
        "frequency_penalty": (config.repetition_penalty - 1.0).clamp(0.0, 2.0),
    });
    if let Some(seed) = config.seed {
        body["seed"] = json!(seed);
    }
    body
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, LlmError> {
        let url = format!("{}/v1/completions", self.base_url);
        let body = request_body(&self.model, prompt, config);

        debug!("OpenAI completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
        let continuation = resp["choices"][0]["text"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing choices[0].text".into()))?;

        Ok(format!("{prompt}{continuation}"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
