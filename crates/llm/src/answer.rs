use std::sync::Arc;
use std::time::Duration;

use docqa_core::config::AnswerSettings;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::provider::{LlmError, TextGenerator};

const INSTRUCTION: &str = "Answer the question based on the context below. \
If you don't know the answer, say 'I don't know'.";

/// Build the question-answering prompt. `marker` is the cue the model
/// continues from and the anchor [`extract_answer`] looks for.
pub fn build_prompt(question: &str, context: &str, marker: &str) -> String {
    format!("{INSTRUCTION}\n\nContext: {context}\n\nQuestion: {question}\n{marker}")
}

/// Pull the answer out of a full generation output.
///
/// If the output echoes `prompt`, only the continuation is considered, so a
/// marker inside the question or context cannot confuse the split. Otherwise
/// the text after the first marker is used. Either way the answer stops at the
/// next marker the model produced.
pub fn extract_answer<'a>(output: &'a str, prompt: &str, marker: &str) -> Result<&'a str, LlmError> {
    let tail = match output.strip_prefix(prompt) {
        Some(rest) => rest,
        None => {
            let start = output
                .find(marker)
                .ok_or_else(|| LlmError::MissingMarker(marker.to_string()))?;
            &output[start + marker.len()..]
        }
    };
    let answer = match tail.find(marker) {
        Some(end) => &tail[..end],
        None => tail,
    };
    Ok(answer.trim())
}

/// Turns a question plus retrieved context into a single answer string.
pub struct AnswerGenerator {
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
    settings: AnswerSettings,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        config: GenerationConfig,
        mut settings: AnswerSettings,
        timeout: Duration,
    ) -> Self {
        for prefix in &mut settings.blocklist {
            *prefix = prefix.to_lowercase();
        }
        Self {
            generator,
            config: config.normalized(),
            settings,
            timeout,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn settings(&self) -> &AnswerSettings {
        &self.settings
    }

    /// Generate, extract and filter an answer, surfacing any failure.
    pub async fn try_answer(&self, question: &str, context: &str) -> Result<String, LlmError> {
        self.try_answer_with(question, context, &self.config).await
    }

    /// [`try_answer`](Self::try_answer) with per-call decoding parameters.
    pub async fn try_answer_with(
        &self,
        question: &str,
        context: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(question, context, &self.settings.marker);
        debug!(
            provider = self.generator.name(),
            prompt_chars = prompt.len(),
            "Generating answer"
        );

        let output = tokio::time::timeout(self.timeout, self.generator.generate(&prompt, config))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        let answer = extract_answer(&output, &prompt, &self.settings.marker)?;
        if self.is_blocked(answer) {
            info!("Generated answer rejected by blocklist: {:?}", answer);
            return Ok(self.settings.no_answer.clone());
        }
        Ok(answer.to_string())
    }

    /// Like [`try_answer`](Self::try_answer) but never fails: errors are
    /// logged and replaced with the configured fallback message.
    pub async fn answer(&self, question: &str, context: &str) -> String {
        self.answer_with(question, context, &self.config).await
    }

    pub async fn answer_with(&self, question: &str, context: &str, config: &GenerationConfig) -> String {
        match self.try_answer_with(question, context, config).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                self.settings.generation_failed.clone()
            }
        }
    }

    fn is_blocked(&self, answer: &str) -> bool {
        let lower = answer.to_lowercase();
        self.settings
            .blocklist
            .iter()
            .any(|prefix| lower.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::config::{DEFAULT_GENERATION_FAILED, DEFAULT_NO_ANSWER};

    /// Echoes the prompt followed by a canned continuation.
    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, prompt: &str, _: &GenerationConfig) -> Result<String, LlmError> {
            Ok(format!("{prompt}{}", self.0))
        }
        fn name(&self) -> &str {
            "canned"
        }
    }

    /// Returns text without echoing the prompt.
    struct Bare(&'static str);

    #[async_trait]
    impl TextGenerator for Bare {
        async fn generate(&self, _: &str, _: &GenerationConfig) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
        fn name(&self) -> &str {
            "bare"
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _: &str, _: &GenerationConfig) -> Result<String, LlmError> {
            Err(LlmError::ApiError {
                status: 500,
                body: "model crashed".into(),
            })
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Slow;

    #[async_trait]
    impl TextGenerator for Slow {
        async fn generate(&self, prompt: &str, _: &GenerationConfig) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(format!("{prompt} too late"))
        }
        fn name(&self) -> &str {
            "slow"
        }
    }

    fn generator(g: impl TextGenerator + 'static) -> AnswerGenerator {
        AnswerGenerator::new(
            Arc::new(g),
            GenerationConfig::default(),
            AnswerSettings::default(),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn prompt_layout() {
        let prompt = build_prompt("What is X?", "X is a letter.", "Answer:");
        assert!(prompt.starts_with("Answer the question based on the context below."));
        assert!(prompt.contains("\n\nContext: X is a letter.\n\nQuestion: What is X?\n"));
        assert!(prompt.ends_with("\nAnswer:"));
    }

    #[test]
    fn extract_uses_continuation_after_prompt() {
        let prompt = build_prompt("Answer: what?", "ctx", "Answer:");
        let output = format!("{prompt}  forty two \nAnswer: again");
        assert_eq!(extract_answer(&output, &prompt, "Answer:").unwrap(), "forty two");
    }

    #[test]
    fn extract_falls_back_to_first_marker() {
        let answer = extract_answer("junk Answer: blue Answer: red", "other prompt", "Answer:").unwrap();
        assert_eq!(answer, "blue");
    }

    #[test]
    fn extract_without_marker_fails() {
        assert!(matches!(
            extract_answer("no cue here", "prompt", "Answer:"),
            Err(LlmError::MissingMarker(_))
        ));
    }

    #[tokio::test]
    async fn answers_with_trimmed_continuation() {
        let g = generator(Canned(" Paris.\n"));
        assert_eq!(g.answer("Capital?", "Paris is the capital.").await, "Paris.");
    }

    #[tokio::test]
    async fn blocklisted_opening_becomes_i_dont_know() {
        let g = generator(Canned(" The question is about X"));
        assert_eq!(g.answer("What is X?", "ctx").await, DEFAULT_NO_ANSWER);

        let g = generator(Canned(" WHAT DOES it mean"));
        assert_eq!(g.try_answer("q", "ctx").await.unwrap(), DEFAULT_NO_ANSWER);
    }

    #[tokio::test]
    async fn failure_yields_fallback_message() {
        let g = generator(Failing);
        assert_eq!(g.answer("q", "ctx").await, DEFAULT_GENERATION_FAILED);
        assert!(g.try_answer("q", "ctx").await.is_err());
    }

    #[tokio::test]
    async fn missing_marker_yields_fallback_message() {
        let g = generator(Bare("the model ignored the cue"));
        assert_eq!(g.answer("q", "ctx").await, DEFAULT_GENERATION_FAILED);
    }

    #[tokio::test]
    async fn slow_generation_times_out() {
        let g = AnswerGenerator::new(
            Arc::new(Slow),
            GenerationConfig::default(),
            AnswerSettings::default(),
            Duration::from_millis(20),
        );
        assert!(matches!(
            g.try_answer("q", "ctx").await,
            Err(LlmError::Timeout(_))
        ));
        assert_eq!(g.answer("q", "ctx").await, DEFAULT_GENERATION_FAILED);
    }

    #[tokio::test]
    async fn deterministic_config_gives_identical_answers() {
        let g = generator(Canned(" same every time"));
        assert!(g.config().is_deterministic());
        let a = g.answer("q", "ctx").await;
        let b = g.answer("q", "ctx").await;
        assert_eq!(a, b);
    }

    /// Fails unless sampling is switched on for the call.
    struct NeedsSampling;

    #[async_trait]
    impl TextGenerator for NeedsSampling {
        async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, LlmError> {
            if config.do_sample {
                Ok(format!("{prompt} sampled"))
            } else {
                Err(LlmError::ParseError("greedy".into()))
            }
        }
        fn name(&self) -> &str {
            "needs-sampling"
        }
    }

    #[tokio::test]
    async fn per_call_config_reaches_the_backend() {
        let g = generator(NeedsSampling);
        assert_eq!(g.answer("q", "ctx").await, DEFAULT_GENERATION_FAILED);

        let sampled = GenerationConfig {
            do_sample: true,
            ..GenerationConfig::default()
        };
        assert_eq!(g.answer_with("q", "ctx", &sampled).await, "sampled");
    }

    #[tokio::test]
    async fn mixed_case_blocklist_entries_still_match() {
        let settings = AnswerSettings {
            blocklist: vec!["The Question Is".to_string()],
            ..AnswerSettings::default()
        };
        let g = AnswerGenerator::new(
            Arc::new(Canned(" the question is about X")),
            GenerationConfig::default(),
            settings,
            Duration::from_secs(1),
        );
        assert_eq!(g.settings().blocklist, vec!["the question is"]);
        assert_eq!(g.answer("What is X?", "ctx").await, DEFAULT_NO_ANSWER);
    }

    #[test]
    fn custom_marker_is_respected() {
        let settings = AnswerSettings {
            marker: "A:".into(),
            ..AnswerSettings::default()
        };
        let g = AnswerGenerator::new(
            Arc::new(Canned("")),
            GenerationConfig::default(),
            settings,
            Duration::from_secs(1),
        );
        assert_eq!(g.settings().marker, "A:");
        assert!(build_prompt("q", "c", "A:").ends_with("\nA:"));
    }
}
