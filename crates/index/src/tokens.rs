/// Counts tokens in a chunk for budgeted retrieval.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// One token per whitespace-delimited word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counter() {
        assert_eq!(WhitespaceTokenCounter.count("a  b\nc"), 3);
        assert_eq!(WhitespaceTokenCounter.count("   "), 0);
    }

    #[test]
    fn closures_are_counters() {
        let chars = |t: &str| t.chars().count();
        assert_eq!(chars.count("abc d"), 5);
    }
}
