use super::PageContent;

/// Markdown is kept verbatim as one page; heading lines are recorded separately.
pub fn extract_md(bytes: &[u8]) -> Vec<PageContent> {
    let text = String::from_utf8_lossy(bytes);

    let headings: Vec<String> = text
        .lines()
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .collect();

    vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
        headings,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_headings() {
        let content = b"# Visa rules\n\nSome text.\n\n## Fees\n\nMore text.\n\n### Exemptions\n";
        let pages = extract_md(content);
        assert_eq!(pages[0].headings, vec!["Visa rules", "Fees", "Exemptions"]);
        assert!(pages[0].text.contains("More text."));
    }

    #[test]
    fn empty_markdown() {
        let pages = extract_md(b"");
        assert_eq!(pages[0].text, "");
        assert!(pages[0].headings.is_empty());
    }
}
