//! Text chunking helpers for feeding documents into the engine.
//!
//! The engine itself only consumes [`Chunk`]s; these helpers are the default
//! way to produce them from whole documents.

use super::types::Chunk;
use serde::{Deserialize, Serialize};

/// A whole document before chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub title: String,
    #[serde(default)]
    pub section: Option<String>,
    pub text: String,
}

/// Splits text into overlapping windows of at most `chunk_size` bytes.
///
/// # UTF-8 Safety
///
/// Window edges are moved to the nearest character boundary, so multi-byte
/// characters are never split. Each window advances by at least one
/// character even when `overlap >= chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return vec![];
    }

    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());

        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        // a single character wider than chunk_size still has to go somewhere
        if end == start {
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
        }

        chunks.push(text[start..end].to_string());

        if end == text.len() {
            break;
        }

        let step = chunk_size.saturating_sub(overlap).max(1);
        let mut next = (start + step).min(end);
        while next < text.len() && !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    chunks
}

/// Chunks every document, carrying its title and section onto each piece.
pub fn build_chunks_from_docs(
    docs: &[SourceDocument],
    chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    docs.iter()
        .flat_map(|doc| {
            chunk_text(&doc.text, chunk_size, overlap)
                .into_iter()
                .map(move |text| Chunk {
                    title: doc.title.clone(),
                    section: doc.section.clone(),
                    text,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 10, 2), vec!["hello"]);
        assert!(chunk_text("", 10, 2).is_empty());
    }

    #[test]
    fn test_chunks_overlap() {
        let chunks = chunk_text("abcdefghij", 4, 1);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_chunks_cover_whole_text() {
        let text = "The quick brown fox jumps over the lazy dog";
        let chunks = chunk_text(text, 10, 0);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_utf8_boundaries() {
        let text = "héllo wörld ünïcode";
        for chunk in chunk_text(text, 4, 1) {
            assert!(!chunk.is_empty());
            assert!(text.contains(&chunk));
        }
    }

    #[test]
    fn test_overlap_not_smaller_than_size_terminates() {
        let chunks = chunk_text("abcdef", 2, 5);
        assert_eq!(chunks.first().map(String::as_str), Some("ab"));
        assert_eq!(chunks.last().map(String::as_str), Some("ef"));
    }

    #[test]
    fn test_build_chunks_from_docs() {
        let docs = vec![
            SourceDocument {
                title: "Return Policy".to_string(),
                section: Some("Timeframe".to_string()),
                text: "Returns accepted within 14 days of purchase.".to_string(),
            },
            SourceDocument {
                title: "Shipping Policy".to_string(),
                section: None,
                text: "abcdefghij".to_string(),
            },
        ];

        let chunks = build_chunks_from_docs(&docs, 200, 0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section.as_deref(), Some("Timeframe"));

        let small = build_chunks_from_docs(&docs[1..], 4, 1);
        assert_eq!(small.len(), 3);
        assert!(small.iter().all(|c| c.title == "Shipping Policy"));
    }
}
