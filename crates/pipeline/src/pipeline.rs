use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use docqa_core::Config;
use docqa_index::{join_context, VectorIndex, WhitespaceTokenCounter};
use docqa_ingest::embedding::embed_one;
use docqa_ingest::{chunk_text, embed_texts, load_path, load_pdf, ChunkConfig, Embedder, ExtractedDocument, LoadError};
use docqa_llm::{AnswerGenerator, GenerationConfig, GenerationOverrides, TextGenerator};

use crate::error::PipelineError;

/// A pipeline behind a lock so the index can be swapped while serving.
pub type SharedPipeline = Arc<RwLock<Pipeline>>;

/// Answer plus the chunk texts it was generated from, in retrieval order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub ready: bool,
    pub document: PathBuf,
    pub chunk_count: usize,
    pub dimensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

enum State {
    Ready(Ready),
    /// Startup failed; permanent until a successful [`reload`].
    NotReady { message: String },
}

struct Ready {
    index: VectorIndex,
    answerer: AnswerGenerator,
}

/// The assembled question-answering system for one document.
pub struct Pipeline {
    config: Config,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    state: State,
}

impl Pipeline {
    /// Load, chunk, embed and index `config.document.pdf_path`.
    ///
    /// Never fails: any startup error leaves the pipeline not ready, and every
    /// later question is rejected with that error's message.
    pub async fn initialize(
        config: Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let path = config.document.pdf_path.clone();
        info!("Initializing pipeline for {}", path.display());

        let state = match build(&config, &path, embedder.as_ref(), generator.clone()).await {
            Ok(ready) => {
                info!(
                    chunks = ready.index.len(),
                    dims = ready.index.dimensions(),
                    "Pipeline ready"
                );
                State::Ready(ready)
            }
            Err(e) => {
                error!("Pipeline initialization failed: {}", e);
                State::NotReady {
                    message: e.to_string(),
                }
            }
        };

        Self {
            config,
            embedder,
            generator,
            state,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> PipelineStatus {
        let document = self.config.document.pdf_path.clone();
        match &self.state {
            State::Ready(ready) => PipelineStatus {
                ready: true,
                document,
                chunk_count: ready.index.len(),
                dimensions: ready.index.dimensions(),
                message: None,
            },
            State::NotReady { message } => PipelineStatus {
                ready: false,
                document,
                chunk_count: 0,
                dimensions: 0,
                message: Some(message.clone()),
            },
        }
    }

    /// Answer `question` from the nearest document chunks.
    ///
    /// Embedding and search failures are errors; generation failures are not,
    /// they come back as the configured fallback answer.
    pub async fn ask(&self, question: &str) -> Result<AskResponse, PipelineError> {
        self.ask_with(question, None).await
    }

    /// [`ask`](Self::ask) with decoding parameters layered over the
    /// configured ones for this question only.
    pub async fn ask_with(
        &self,
        question: &str,
        overrides: Option<GenerationOverrides>,
    ) -> Result<AskResponse, PipelineError> {
        let ready = match &self.state {
            State::Ready(ready) => ready,
            State::NotReady { message } => return Err(PipelineError::NotReady(message.clone())),
        };
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::InvalidInput("question must not be empty".into()));
        }

        let query = embed_one(self.embedder.as_ref(), question).await?;
        let retrieval = &self.config.retrieval;
        let hits = ready
            .index
            .search_with_budget(&query, retrieval.top_k, retrieval.max_context_tokens)?;
        let context = join_context(&hits);
        debug!(
            hits = hits.len(),
            context_chars = context.len(),
            "Retrieved context for question"
        );

        let answer = match overrides {
            Some(overrides) => {
                let config = overrides.apply(ready.answerer.config().clone());
                ready.answerer.answer_with(question, &context, &config).await
            }
            None => ready.answerer.answer(question, &context).await,
        };

        Ok(AskResponse {
            answer,
            context: hits.into_iter().map(|h| h.text).collect(),
        })
    }
}

/// Wrap a pipeline for shared use across tasks.
pub fn shared(pipeline: Pipeline) -> SharedPipeline {
    Arc::new(RwLock::new(pipeline))
}

/// Index a new document and swap it in, discarding the previous chunks.
///
/// The new index is built before the write lock is taken, so questions keep
/// being served from the old one meanwhile. On failure the old state is kept.
pub async fn reload(
    pipeline: &SharedPipeline,
    path: impl Into<PathBuf>,
) -> Result<PipelineStatus, PipelineError> {
    let path = path.into();
    let (mut config, embedder, generator) = {
        let current = pipeline.read().await;
        (
            current.config.clone(),
            current.embedder.clone(),
            current.generator.clone(),
        )
    };
    config.document.pdf_path = path.clone();

    info!("Reloading pipeline from {}", path.display());
    let ready = build(&config, &path, embedder.as_ref(), generator).await?;

    let mut current = pipeline.write().await;
    current.config = config;
    current.state = State::Ready(ready);
    let status = current.status();
    info!(chunks = status.chunk_count, "Pipeline reloaded");
    Ok(status)
}

async fn build(
    config: &Config,
    path: &Path,
    embedder: &dyn Embedder,
    generator: Arc<dyn TextGenerator>,
) -> Result<Ready, PipelineError> {
    let owned = path.to_path_buf();
    let doc = tokio::task::spawn_blocking(move || load_document(&owned))
        .await
        .map_err(|e| LoadError::Pdf(format!("loader task failed: {e}")))??;
    let text = doc.require_text()?;

    let chunks = chunk_text(&text, &ChunkConfig::from(&config.chunking))?;
    info!(
        chunks = chunks.len(),
        chunk_size = config.chunking.chunk_size,
        overlap = config.chunking.overlap,
        "Document chunked"
    );

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let embeddings = embed_texts(embedder, &texts, config.embedding.batch_size).await?;

    let mut index = VectorIndex::build(embeddings, chunks)?;
    if config.retrieval.count_tokens {
        index = index.with_token_counter(Arc::new(WhitespaceTokenCounter));
    }

    let answerer = AnswerGenerator::new(
        generator,
        GenerationConfig::from_settings(&config.generation),
        config.answer.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    );

    Ok(Ready { index, answerer })
}

/// PDFs (and extensionless paths) go through the PDF loader; anything else is
/// dispatched on its extension.
fn load_document(path: &Path) -> Result<ExtractedDocument, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        None => load_pdf(path),
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => load_pdf(path),
        Some(_) => load_path(path),
    }
}
