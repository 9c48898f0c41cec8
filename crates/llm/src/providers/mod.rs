pub mod ollama;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use docqa_core::config::LlmConfig;

use crate::provider::{LlmError, TextGenerator};

pub use ollama::OllamaGenerator;
pub use openai::OpenAiGenerator;

/// Create the generation backend named by `config.provider`.
///
/// The HTTP client timeout is `timeout_secs`, the same bound the answer
/// generator puts around each call.
pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Arc::new(OpenAiGenerator::new(
                api_key.clone(),
                config.model.clone(),
                base_url.to_string(),
                timeout,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaGenerator::new(
            config.url.clone(),
            config.model.clone(),
            timeout,
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            url: "http://localhost:11434".to_string(),
            model: "gpt2".to_string(),
            openai_api_key: None,
            openai_base_url: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn ollama_needs_no_key() {
        let generator = create_generator(&config("ollama")).unwrap();
        assert_eq!(generator.name(), "ollama");
    }

    #[test]
    fn openai_requires_key() {
        assert!(matches!(
            create_generator(&config("openai")),
            Err(LlmError::NotConfigured(_))
        ));

        let mut cfg = config("openai");
        cfg.openai_api_key = Some("sk-test".into());
        assert_eq!(create_generator(&cfg).unwrap().name(), "openai");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = create_generator(&config("gemini")).err().unwrap();
        assert!(err.to_string().contains("gemini"));
    }
}
