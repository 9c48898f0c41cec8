//! Transport-agnostic request handling: JSON in, status code plus JSON out.
//! An HTTP layer only has to forward the body and copy the status.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use docqa_core::{Classify, ErrorKind};
use docqa_llm::GenerationOverrides;

use crate::error::PipelineError;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryResponse {
    pub status: u16,
    pub body: Value,
}

impl BoundaryResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, error: &str, details: Option<String>) -> Self {
        let body = match details {
            Some(details) => json!({ "error": error, "details": details }),
            None => json!({ "error": error }),
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: Option<String>,
    #[serde(default)]
    generation: Option<GenerationOverrides>,
}

/// Handle `{"question": "..."}` and answer with `{"answer", "context"}`.
///
/// Readiness is checked before the request body, so a pipeline that never
/// started answers 503 whatever it is sent.
pub async fn handle_ask(pipeline: &Pipeline, request: &Value) -> BoundaryResponse {
    if !pipeline.is_ready() {
        let details = pipeline.status().message;
        return BoundaryResponse::error(503, "System not ready", details);
    }

    let parsed = match AskRequest::deserialize(request) {
        Ok(parsed) => parsed,
        Err(e) => {
            return BoundaryResponse::error(400, "Missing question parameter", Some(e.to_string()));
        }
    };
    let Some(question) = parsed.question else {
        return BoundaryResponse::error(400, "Missing question parameter", None);
    };

    match pipeline.ask_with(&question, parsed.generation).await {
        Ok(response) => BoundaryResponse::ok(json!({
            "answer": response.answer,
            "context": response.context,
        })),
        Err(e) => error_response(&e),
    }
}

/// Readiness and index shape, for health checks.
pub fn handle_status(pipeline: &Pipeline) -> BoundaryResponse {
    let status = pipeline.status();
    let code = if status.ready { 200 } else { 503 };
    BoundaryResponse {
        status: code,
        body: json!({
            "status": status,
            "config": pipeline.config().redacted_summary(),
        }),
    }
}

fn error_response(err: &PipelineError) -> BoundaryResponse {
    let kind = err.kind();
    let error = match kind {
        ErrorKind::NotReady => "System not ready",
        ErrorKind::InvalidInput => "Invalid question",
        ErrorKind::Generation => "Answer generation failed",
        ErrorKind::NotFound | ErrorKind::Load | ErrorKind::Processing => "Processing failed",
    };
    warn!(kind = %kind, "Request failed: {}", err);
    BoundaryResponse::error(kind.status_code(), error, Some(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_index::IndexError;
    use docqa_llm::LlmError;

    #[test]
    fn error_body_shape() {
        let r = error_response(&PipelineError::from(IndexError::Empty));
        assert_eq!(r.status, 500);
        assert_eq!(r.body["error"], "Processing failed");
        assert!(r.body["details"].as_str().unwrap().contains("zero chunks"));
        assert!(!r.is_success());
    }

    #[test]
    fn generation_errors_map_to_500() {
        let r = error_response(&PipelineError::from(LlmError::ParseError("bad".into())));
        assert_eq!(r.status, 500);
        assert_eq!(r.body["error"], "Answer generation failed");
    }

    #[test]
    fn invalid_question_maps_to_400() {
        let r = error_response(&PipelineError::InvalidInput("empty".into()));
        assert_eq!(r.status, 400);
        assert_eq!(r.body["error"], "Invalid question");
    }

    #[test]
    fn request_body_ignores_unknown_fields() {
        let req = AskRequest::deserialize(&json!({"question": "q", "lang": "en"})).unwrap();
        assert_eq!(req.question.as_deref(), Some("q"));
        assert!(req.generation.is_none());

        let req = AskRequest::deserialize(&json!({})).unwrap();
        assert!(req.question.is_none());
    }
}
