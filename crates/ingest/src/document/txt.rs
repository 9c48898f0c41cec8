use super::PageContent;

/// Decode plain text as a single page, replacing invalid UTF-8 sequences.
pub fn extract_txt(bytes: &[u8]) -> Vec<PageContent> {
    let text = String::from_utf8_lossy(bytes);

    vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
        headings: Vec::new(),
    }]
}
