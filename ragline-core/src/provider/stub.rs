//! Offline provider that answers by quoting its sources.

use super::types::{GenerationProvider, Result};
use crate::rag::Citation;
use async_trait::async_trait;

/// Maximum characters of joined source text included in an answer or prompt.
pub const CONTEXT_CHAR_LIMIT: usize = 600;

/// Deterministic provider with no external dependency. Always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubProvider;

impl StubProvider {
    pub fn new() -> Self {
        Self
    }

    /// Builds the answer: header, one bullet per source, then a summary.
    pub fn answer(contexts: &[Citation]) -> String {
        let mut lines = vec!["Answer (stub): Based on the following sources:".to_string()];
        for context in contexts {
            let section = context
                .section
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("Section");
            lines.push(format!("- {} — {}", context.title, section));
        }
        lines.push("Summary:".to_string());

        let joined = contexts
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(truncate_chars(&joined, CONTEXT_CHAR_LIMIT, "..."));

        lines.join("\n")
    }
}

#[async_trait]
impl GenerationProvider for StubProvider {
    async fn generate(&self, _query: &str, contexts: &[Citation]) -> Result<String> {
        Ok(Self::answer(contexts))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// First `limit` characters of `text`, with `marker` appended if anything was cut.
pub(crate) fn truncate_chars(text: &str, limit: usize, marker: &str) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], marker),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::{Chunk, ChunkMetadata, ContentHash};

    fn citation(title: &str, section: Option<&str>, text: &str) -> Citation {
        let mut chunk = Chunk::new(title, text);
        chunk.section = section.map(str::to_string);
        ChunkMetadata::from_chunk(&chunk, &ContentHash::of(text))
    }

    #[test]
    fn test_answer_structure() {
        let contexts = vec![
            citation("Return Policy", Some("Timeframe"), "Returns accepted within 14 days of purchase."),
            citation("Shipping Policy", None, "East Malaysia delivery within 7 business days."),
            citation("Warranty", Some(""), "One year parts and labour."),
        ];
        let answer = StubProvider::answer(&contexts);
        let lines: Vec<_> = answer.lines().collect();

        assert_eq!(lines[0], "Answer (stub): Based on the following sources:");
        assert_eq!(lines[1], "- Return Policy — Timeframe");
        assert_eq!(lines[2], "- Shipping Policy — Section");
        assert_eq!(lines[3], "- Warranty — Section");
        assert_eq!(lines[4], "Summary:");
        assert_eq!(
            lines[5],
            "Returns accepted within 14 days of purchase. East Malaysia delivery within 7 business days. One year parts and labour."
        );
    }

    #[test]
    fn test_summary_is_truncated() {
        let long = "x".repeat(700);
        let answer = StubProvider::answer(&[citation("Doc", None, &long)]);
        let summary = answer.lines().last().unwrap();
        assert_eq!(summary.len(), CONTEXT_CHAR_LIMIT + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_at_limit_has_no_marker() {
        let exact = "y".repeat(CONTEXT_CHAR_LIMIT);
        let answer = StubProvider::answer(&[citation("Doc", None, &exact)]);
        assert_eq!(answer.lines().last().unwrap(), exact);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééé", 2, "…"), "éé…");
        assert_eq!(truncate_chars("abc", 5, "..."), "abc");
    }

    #[tokio::test]
    async fn test_no_contexts() {
        let answer = StubProvider.generate("anything?", &[]).await.unwrap();
        assert!(answer.starts_with("Answer (stub)"));
        assert!(answer.ends_with("Summary:\n"));
    }
}
