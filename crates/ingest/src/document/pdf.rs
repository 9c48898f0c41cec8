use std::panic::{catch_unwind, AssertUnwindSafe};

use super::{LoadError, PageContent};

pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, LoadError> {
    // pdf-extract panics on some malformed inputs; surface those as load errors.
    let text = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| LoadError::Pdf("PDF parser panicked on malformed input".to_string()))?
        .map_err(|e| LoadError::Pdf(e.to_string()))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        tracing::warn!("PDF contained no extractable text (scanned or image-only?)");
        return Ok(vec![PageContent {
            page_number: 1,
            text: String::new(),
            headings: Vec::new(),
        }]);
    }

    // pdf-extract returns all text as one string; form feeds separate pages.
    let pages: Vec<PageContent> = if text.contains('\x0C') {
        text.split('\x0C')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| PageContent {
                page_number: i + 1,
                text: page_text.trim().to_string(),
                headings: Vec::new(),
            })
            .collect()
    } else {
        vec![PageContent {
            page_number: 1,
            text: trimmed.to_string(),
            headings: Vec::new(),
        }]
    };

    tracing::debug!("PDF split into {} non-empty pages", pages.len());
    Ok(pages)
}
