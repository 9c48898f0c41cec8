use serde::Serialize;

/// Coarse failure categories shared by every crate in the workspace.
///
/// Crate-level error enums stay specific; `ErrorKind` is what the pipeline
/// and the request boundary branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The source document does not exist.
    NotFound,
    /// The source document exists but text extraction failed.
    Load,
    /// Empty text, empty question, invalid chunking parameters.
    InvalidInput,
    /// The generation service failed or returned unusable output.
    Generation,
    /// Embedding or search failed while serving a query.
    Processing,
    /// The pipeline never became ready.
    NotReady,
}

impl ErrorKind {
    /// HTTP status a request boundary should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotReady => 503,
            ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound
            | ErrorKind::Load
            | ErrorKind::Generation
            | ErrorKind::Processing => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Load => "load",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Generation => "generation",
            ErrorKind::Processing => "processing",
            ErrorKind::NotReady => "not_ready",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every crate error so callers can map it to an [`ErrorKind`].
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ErrorKind::NotReady.status_code(), 503);
        assert_eq!(ErrorKind::InvalidInput.status_code(), 400);
        assert_eq!(ErrorKind::Generation.status_code(), 500);
        assert_eq!(ErrorKind::Processing.status_code(), 500);
    }

    #[test]
    fn serializes_snake_case() {
        let v = serde_json::to_value(ErrorKind::InvalidInput).unwrap();
        assert_eq!(v, serde_json::json!("invalid_input"));
        assert_eq!(ErrorKind::NotReady.to_string(), "not_ready");
    }
}
