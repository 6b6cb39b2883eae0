use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A unit of ingestible text produced by a chunking collaborator.
///
/// # Example
///
/// ```
/// use ragline_core::rag::Chunk;
///
/// let chunk = Chunk::new("Return Policy", "Returns accepted within 14 days of purchase.")
///     .with_section("Timeframe");
/// assert_eq!(chunk.section.as_deref(), Some("Timeframe"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub title: String,
    #[serde(default)]
    pub section: Option<String>,
    pub text: String,
}

impl Chunk {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            section: None,
            text: text.into(),
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// SHA-256 digest of a chunk's exact text, as lowercase hex.
///
/// Used both as the deduplication key and as the stable point identifier.
/// Title and section do not participate, so identical text under two
/// documents hashes to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of(text: &str) -> Self {
        Self(hex::encode(Sha256::digest(text.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata stored alongside every vector and surfaced to callers as a citation.
///
/// `id` and `hash` carry the same value; both are kept because the remote
/// payload is addressed by `id` while dedup looks at `hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub id: String,
    pub hash: String,
    pub title: String,
    #[serde(default)]
    pub section: Option<String>,
    pub text: String,
}

impl ChunkMetadata {
    pub fn from_chunk(chunk: &Chunk, hash: &ContentHash) -> Self {
        Self {
            id: hash.to_string(),
            hash: hash.to_string(),
            title: chunk.title.clone(),
            section: chunk.section.clone(),
            text: chunk.text.clone(),
        }
    }
}

/// Retrieved passage metadata handed to the generator and shown for attribution.
pub type Citation = ChunkMetadata;

/// A vector plus its metadata, owned by the store after upsert.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl VectorRecord {
    pub fn new(vector: Vec<f32>, metadata: ChunkMetadata) -> Self {
        Self {
            id: metadata.id.clone(),
            vector,
            metadata,
        }
    }
}

/// A search hit, ordered by descending cosine similarity.
///
/// Scores range from -1.0 (opposite) through 0.0 (orthogonal) to 1.0 (identical).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub score: f32,
    pub metadata: ChunkMetadata,
}

/// Snapshot returned by [`crate::RagEngine::stats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_docs: usize,
    pub total_chunks: usize,
    pub embedding_model: String,
    pub llm_model: String,
    pub avg_retrieval_latency_ms: f64,
    pub avg_generation_latency_ms: f64,
}
