//! Decoding parameters passed to every generation call.

use std::fmt;
use std::str::FromStr;

use docqa_core::config::GenerationSettings;
use serde::{Deserialize, Deserializer, Serialize};

/// How an over-long prompt may be shortened by the backend.
///
/// Accepts either a boolean (`true` = longest-first, `false` = disabled) or
/// one of the strategy names when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    Disabled,
    LongestFirst,
    /// Truncate the context only, never the question.
    OnlyFirst,
    OnlySecond,
}

impl From<bool> for Truncation {
    fn from(enabled: bool) -> Self {
        if enabled {
            Truncation::LongestFirst
        } else {
            Truncation::Disabled
        }
    }
}

impl FromStr for Truncation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "longest_first" => Ok(Truncation::LongestFirst),
            "false" | "disabled" | "do_not_truncate" => Ok(Truncation::Disabled),
            "only_first" => Ok(Truncation::OnlyFirst),
            "only_second" => Ok(Truncation::OnlySecond),
            other => Err(format!("unknown truncation strategy: '{other}'")),
        }
    }
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Truncation::Disabled => "disabled",
            Truncation::LongestFirst => "longest_first",
            Truncation::OnlyFirst => "only_first",
            Truncation::OnlySecond => "only_second",
        })
    }
}

impl<'de> Deserialize<'de> for Truncation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(b) => Ok(Truncation::from(b)),
            Raw::Name(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Decoding parameters, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    /// `false` means greedy, deterministic decoding.
    pub do_sample: bool,
    pub truncation: Truncation,
    pub pad_token_id: u32,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: u32,
    /// Only meaningful while sampling; dropped by [`normalized`](Self::normalized) otherwise.
    pub temperature: Option<f32>,
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 100,
            do_sample: false,
            truncation: Truncation::OnlyFirst,
            pad_token_id: 50256,
            repetition_penalty: 1.5,
            no_repeat_ngram_size: 2,
            temperature: None,
            seed: None,
        }
    }
}

impl GenerationConfig {
    /// Build from env-loaded settings. An unknown truncation name falls back
    /// to the default strategy with a warning.
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        let truncation = settings.truncation.parse().unwrap_or_else(|e: String| {
            tracing::warn!("{e}; using only_first");
            Truncation::OnlyFirst
        });
        Self {
            max_new_tokens: settings.max_new_tokens,
            do_sample: settings.do_sample,
            truncation,
            pad_token_id: settings.pad_token_id,
            repetition_penalty: settings.repetition_penalty,
            no_repeat_ngram_size: settings.no_repeat_ngram_size,
            temperature: settings.temperature,
            seed: None,
        }
        .normalized()
    }

    /// Drop fields that conflict with the decoding mode instead of failing:
    /// `temperature` has no effect without sampling.
    pub fn normalized(mut self) -> Self {
        if !self.do_sample && self.temperature.take().is_some() {
            tracing::debug!("dropping temperature: sampling is disabled");
        }
        self
    }

    pub fn is_deterministic(&self) -> bool {
        !self.do_sample
    }
}

/// Partial configuration layered over [`GenerationConfig`] like a dictionary
/// update. Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationOverrides {
    pub max_new_tokens: Option<u32>,
    pub do_sample: Option<bool>,
    pub truncation: Option<Truncation>,
    pub pad_token_id: Option<u32>,
    pub repetition_penalty: Option<f32>,
    pub no_repeat_ngram_size: Option<u32>,
    pub temperature: Option<f32>,
    pub seed: Option<u64>,
}

impl GenerationOverrides {
    pub fn apply(self, base: GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            max_new_tokens: self.max_new_tokens.unwrap_or(base.max_new_tokens),
            do_sample: self.do_sample.unwrap_or(base.do_sample),
            truncation: self.truncation.unwrap_or(base.truncation),
            pad_token_id: self.pad_token_id.unwrap_or(base.pad_token_id),
            repetition_penalty: self.repetition_penalty.unwrap_or(base.repetition_penalty),
            no_repeat_ngram_size: self.no_repeat_ngram_size.unwrap_or(base.no_repeat_ngram_size),
            temperature: self.temperature.or(base.temperature),
            seed: self.seed.or(base.seed),
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_greedy() {
        let c = GenerationConfig::default();
        assert!(c.is_deterministic());
        assert_eq!(c.max_new_tokens, 100);
        assert_eq!(c.truncation, Truncation::OnlyFirst);
        assert_eq!(c.no_repeat_ngram_size, 2);
    }

    #[test]
    fn temperature_dropped_without_sampling() {
        let c = GenerationConfig {
            temperature: Some(0.7),
            ..Default::default()
        }
        .normalized();
        assert_eq!(c.temperature, None);

        let sampled = GenerationConfig {
            do_sample: true,
            temperature: Some(0.7),
            ..Default::default()
        }
        .normalized();
        assert_eq!(sampled.temperature, Some(0.7));
    }

    #[test]
    fn overrides_update_like_a_dict() {
        let overrides: GenerationOverrides = serde_json::from_value(json!({
            "max_length": 200,
            "max_new_tokens": 64,
            "truncation": true,
            "temperature": 0.9,
            "pad_token_id": 50256
        }))
        .unwrap();
        let c = overrides.apply(GenerationConfig::default());
        assert_eq!(c.max_new_tokens, 64);
        assert_eq!(c.truncation, Truncation::LongestFirst);
        // Still greedy, so the temperature is silently dropped.
        assert_eq!(c.temperature, None);
        assert_eq!(c.repetition_penalty, 1.5);
    }

    #[test]
    fn truncation_accepts_bool_or_name() {
        let t: Truncation = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(t, Truncation::Disabled);
        let t: Truncation = serde_json::from_value(json!("only_first")).unwrap();
        assert_eq!(t, Truncation::OnlyFirst);
        assert!(serde_json::from_value::<Truncation>(json!("sideways")).is_err());
        assert_eq!(Truncation::OnlySecond.to_string(), "only_second");
    }

    #[test]
    fn from_settings_tolerates_unknown_truncation() {
        let settings = GenerationSettings {
            max_new_tokens: 10,
            do_sample: false,
            truncation: "bogus".to_string(),
            pad_token_id: 0,
            repetition_penalty: 1.0,
            no_repeat_ngram_size: 0,
            temperature: Some(1.2),
        };
        let c = GenerationConfig::from_settings(&settings);
        assert_eq!(c.truncation, Truncation::OnlyFirst);
        assert_eq!(c.temperature, None);
        assert_eq!(c.max_new_tokens, 10);
    }
}
