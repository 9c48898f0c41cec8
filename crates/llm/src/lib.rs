pub mod answer;
pub mod config;
pub mod provider;
pub mod providers;

pub use answer::{build_prompt, extract_answer, AnswerGenerator};
pub use config::{GenerationConfig, GenerationOverrides, Truncation};
pub use provider::{LlmError, TextGenerator};
pub use providers::create_generator;
