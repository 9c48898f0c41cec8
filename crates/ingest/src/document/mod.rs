mod md;
mod pdf;
mod txt;

use std::path::{Path, PathBuf};

use docqa_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Document not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load PDF: {0}")]
    Pdf(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Extracted text is empty - check document content")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for LoadError {
    fn kind(&self) -> ErrorKind {
        match self {
            LoadError::NotFound(_) => ErrorKind::NotFound,
            LoadError::Empty => ErrorKind::InvalidInput,
            LoadError::Pdf(_) | LoadError::UnsupportedType(_) | LoadError::Io(_) => ErrorKind::Load,
        }
    }
}

/// A page of extracted text with metadata.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number (for PDFs). For TXT/MD, always 1.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
    /// Headings found on this page (for MD files).
    pub headings: Vec<String>,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    /// File type: "pdf", "txt", "md"
    pub file_type: String,
    /// Extracted pages with text and metadata, in page order.
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// All page texts joined by single spaces, in page order.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.len()).sum()
    }

    /// Full text, or [`LoadError::Empty`] when nothing but whitespace was extracted.
    pub fn require_text(&self) -> Result<String, LoadError> {
        let text = self.full_text();
        if text.trim().is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(text)
    }
}

/// Extract text from file bytes based on file type.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, LoadError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    let file_type = ext.as_str();

    let pages = match file_type {
        "pdf" => pdf::extract_pdf(bytes)?,
        "txt" | "text" => txt::extract_txt(bytes),
        "md" | "markdown" => md::extract_md(bytes),
        other => return Err(LoadError::UnsupportedType(other.to_string())),
    };

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        file_type: file_type.to_string(),
        pages,
    })
}

/// Read a document from disk and extract its text, dispatching on extension.
pub fn load_path(path: &Path) -> Result<ExtractedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let doc = extract_text(&bytes, filename)?;
    tracing::info!(
        "Extracted '{}' (type={}): {} pages, {} chars",
        doc.filename,
        doc.file_type,
        doc.pages.len(),
        doc.total_chars()
    );
    Ok(doc)
}

/// Read a PDF from disk regardless of its extension.
///
/// Any failure after the existence check, including I/O, is reported as
/// [`LoadError::Pdf`].
pub fn load_pdf(path: &Path) -> Result<ExtractedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| LoadError::Pdf(e.to_string()))?;
    let pages = pdf::extract_pdf(&bytes)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let doc = ExtractedDocument {
        filename,
        file_type: "pdf".to_string(),
        pages,
    };
    tracing::info!(
        "Extracted '{}': {} pages, {} chars",
        doc.filename,
        doc.pages.len(),
        doc.total_chars()
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn doc(pages: &[&str]) -> ExtractedDocument {
        ExtractedDocument {
            filename: "test.pdf".to_string(),
            file_type: "pdf".to_string(),
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, text)| PageContent {
                    page_number: i + 1,
                    text: text.to_string(),
                    headings: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn full_text_joins_pages_with_single_space() {
        let d = doc(&["first page", "second page", "third"]);
        assert_eq!(d.full_text(), "first page second page third");
        assert_eq!(d.total_chars(), 10 + 11 + 5);
    }

    #[test]
    fn require_text_rejects_whitespace_only() {
        let d = doc(&["  ", "\n\t"]);
        assert!(matches!(d.require_text(), Err(LoadError::Empty)));
        assert_eq!(LoadError::Empty.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_pdf_is_not_found() {
        let err = load_pdf(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn garbage_pdf_is_wrapped_as_load_error() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is not a pdf at all").unwrap();
        let err = load_pdf(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Pdf(_)), "got {err:?}");
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn load_path_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"  hello from a text file \n").unwrap();
        let d = load_path(file.path()).unwrap();
        assert_eq!(d.file_type, "txt");
        assert_eq!(d.require_text().unwrap(), "hello from a text file");
    }

    #[test]
    fn unsupported_extension() {
        let err = extract_text(b"x", "data.docx").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedType(ref t) if t == "docx"));
    }
}
