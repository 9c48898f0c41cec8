use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub document: DocumentConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
    pub answer: AnswerSettings,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCQA_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DOCQA_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            document: DocumentConfig::from_env_profiled(p),
            chunking: ChunkingConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            generation: GenerationSettings::from_env_profiled(p),
            retrieval: RetrievalSettings::from_env_profiled(p),
            answer: AnswerSettings::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  document:    pdf_path={}", self.document.pdf_path.display());
        tracing::info!(
            "  chunking:    chunk_size={}, overlap={}",
            self.chunking.chunk_size,
            self.chunking.overlap
        );
        tracing::info!(
            "  embedding:   provider={}, model={}, dims={}",
            self.embedding.provider,
            self.embedding.model,
            self.embedding.dimensions
        );
        tracing::info!(
            "  llm:         provider={}, model={}, timeout={}s",
            self.llm.provider,
            self.llm.model,
            self.llm.timeout_secs
        );
        tracing::info!(
            "  retrieval:   top_k={}, max_context_tokens={}, count_tokens={}",
            self.retrieval.top_k,
            self.retrieval.max_context_tokens,
            self.retrieval.count_tokens
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "document": { "pdf_path": self.document.pdf_path },
            "chunking": {
                "chunk_size": self.chunking.chunk_size,
                "overlap": self.chunking.overlap,
            },
            "embedding": {
                "provider": self.embedding.provider,
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "configured": self.embedding.is_configured(),
            },
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.model,
                "configured": self.llm.is_configured(),
            },
            "generation": self.generation,
            "retrieval": self.retrieval,
        })
    }
}

// ── Document ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub pdf_path: PathBuf,
}

impl DocumentConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            pdf_path: PathBuf::from(profiled_env_or(p, "PDF_PATH", "document.pdf")),
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between adjacent chunks. Must be smaller than `chunk_size`.
    pub overlap: usize,
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_size: profiled_env_parse(p, "CHUNK_SIZE", 350),
            overlap: profiled_env_parse(p, "CHUNK_OVERLAP", 100),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama", "openai"
    pub provider: String,
    pub url: String,
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    /// LRU entries kept for query embeddings (0 disables the cache).
    pub cache_capacity: usize,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", "ollama"),
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "EMBEDDING_MODEL", "all-minilm"),
            dimensions: profiled_env_parse(p, "EMBEDDING_DIMENSIONS", 384),
            batch_size: profiled_env_parse(p, "EMBEDDING_BATCH_SIZE", 64),
            cache_capacity: profiled_env_parse(p, "EMBEDDING_CACHE_CAPACITY", 256),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── LLM ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama", "openai"
    pub provider: String,
    pub url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    /// Upper bound for a single generation call.
    pub timeout_secs: u64,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "ollama"),
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "LLM_MODEL", "gpt2"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            timeout_secs: profiled_env_parse(p, "LLM_TIMEOUT_SECS", 60),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Generation (decoding parameters) ──────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    /// "true", "false", "longest_first", "only_first", "only_second"
    pub truncation: String,
    pub pad_token_id: u32,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: u32,
    /// Only honoured when `do_sample` is on.
    pub temperature: Option<f32>,
}

impl GenerationSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_new_tokens: profiled_env_parse(p, "GEN_MAX_NEW_TOKENS", 100),
            do_sample: profiled_env_bool(p, "GEN_DO_SAMPLE", false),
            truncation: profiled_env_or(p, "GEN_TRUNCATION", "only_first"),
            // GPT-2's eos token id.
            pad_token_id: profiled_env_parse(p, "GEN_PAD_TOKEN_ID", 50256),
            repetition_penalty: profiled_env_parse(p, "GEN_REPETITION_PENALTY", 1.5),
            no_repeat_ngram_size: profiled_env_parse(p, "GEN_NO_REPEAT_NGRAM_SIZE", 2),
            temperature: profiled_env_opt(p, "GEN_TEMPERATURE").and_then(|v| v.parse().ok()),
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub max_context_tokens: usize,
    /// When false, the token budget is ignored and the first `top_k` hits are used.
    pub count_tokens: bool,
}

impl RetrievalSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_k: profiled_env_parse(p, "RETRIEVAL_TOP_K", 3),
            max_context_tokens: profiled_env_parse(p, "RETRIEVAL_MAX_CONTEXT_TOKENS", 500),
            count_tokens: profiled_env_bool(p, "RETRIEVAL_COUNT_TOKENS", true),
        }
    }
}

// ── Answer post-processing ────────────────────────────────────

pub const DEFAULT_ANSWER_MARKER: &str = "Answer:";
pub const DEFAULT_NO_ANSWER: &str = "I don't know";
pub const DEFAULT_GENERATION_FAILED: &str =
    "I couldn't generate a response. Please try a more specific question.";
pub const DEFAULT_BLOCKLIST: &[&str] = &["the question is", "the word", "what does"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSettings {
    pub marker: String,
    /// Lower-cased answer openings that are replaced by `no_answer`.
    pub blocklist: Vec<String>,
    pub no_answer: String,
    pub generation_failed: String,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            marker: DEFAULT_ANSWER_MARKER.to_string(),
            blocklist: DEFAULT_BLOCKLIST.iter().map(|s| s.to_string()).collect(),
            no_answer: DEFAULT_NO_ANSWER.to_string(),
            generation_failed: DEFAULT_GENERATION_FAILED.to_string(),
        }
    }
}

impl AnswerSettings {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        // Comma-separated list, e.g. ANSWER_BLOCKLIST="the question is,the word".
        let blocklist = profiled_env_opt(p, "ANSWER_BLOCKLIST")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.blocklist);
        Self {
            marker: profiled_env_or(p, "ANSWER_MARKER", &defaults.marker),
            blocklist,
            no_answer: profiled_env_or(p, "ANSWER_NO_ANSWER", &defaults.no_answer),
            generation_failed: profiled_env_or(
                p,
                "ANSWER_GENERATION_FAILED",
                &defaults.generation_failed,
            ),
        }
    }
}
