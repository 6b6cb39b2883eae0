//! Retrieval Augmented Generation (RAG) core.
//!
//! # Architecture
//!
//! - [`RagEngine`]: orchestrates ingestion, retrieval and generation
//! - [`Embedder`]: deterministic content-hash embeddings
//! - [`VectorStore`]: in-memory or Qdrant storage with similarity search
//! - [`Metrics`]: retrieval and generation latency samples
//! - [`chunker`]: helpers that turn documents into chunks
//!
//! # How It Works
//!
//! 1. **Ingestion**: each chunk is hashed, embedded and sent to the store in
//!    one batch. The store drops (or overwrites) content it already holds.
//! 2. **Retrieval**: the query is embedded and the store returns the top-k
//!    chunks by cosine similarity.
//! 3. **Generation**: the query and retrieved chunks go to the provider,
//!    which writes an answer citing them.

pub mod chunker;
mod embedder;
mod memory_store;
mod metrics;
mod qdrant_store;
mod store;
mod types;

pub use chunker::{build_chunks_from_docs, chunk_text, SourceDocument};
pub use embedder::{Embedder, EMBEDDING_DIM};
pub use memory_store::InMemoryStore;
pub use metrics::{Metrics, MetricsSummary};
pub use qdrant_store::{point_id_for, QdrantStore};
pub use store::{create_vector_store, DedupPolicy, VectorStore};
pub use types::{
    Chunk, ChunkMetadata, Citation, ContentHash, EngineStats, SearchResult, VectorRecord,
};

use crate::config::Config;
use crate::provider::{create_provider, GenerationProvider, ProviderError};
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Failed to ingest chunks: {0}")]
    Ingest(String),

    #[error("Failed to retrieve context: {0}")]
    Retrieval(String),

    #[error("Failed to generate answer: {0}")]
    Generation(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, RagError>;

/// The retrieval engine tying embedder, store, provider and metrics together.
///
/// # Concurrency
///
/// Every operation runs to completion when awaited and spawns nothing.
/// Operations that change state take `&mut self`; to share one engine between
/// request handlers, put it behind a `tokio::sync::Mutex`.
///
/// # Example
///
/// ```no_run
/// # use ragline_core::{Config, RagEngine, rag::Chunk};
/// # async fn example() -> ragline_core::rag::Result<()> {
/// let mut engine = RagEngine::new(&Config::load_or_default()).await;
/// engine
///     .ingest_chunks(&[Chunk::new("Return Policy", "Returns accepted within 14 days.")])
///     .await?;
/// let contexts = engine.retrieve("return window", 4).await?;
/// let answer = engine.generate("What is the return window?", &contexts).await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
pub struct RagEngine {
    embedder: Embedder,
    store: Box<dyn VectorStore>,
    provider: Box<dyn GenerationProvider>,
    metrics: Metrics,
    embedding_model: String,
    doc_titles: HashSet<String>,
    chunk_count: usize,
}

impl RagEngine {
    /// Builds the engine from configuration.
    ///
    /// Never fails: an unreachable Qdrant falls back to the in-memory store and
    /// a misconfigured remote provider falls back to the stub.
    pub async fn new(config: &Config) -> Self {
        let store = create_vector_store(&config.storage, EMBEDDING_DIM).await;
        let provider = create_provider(&config.llm);
        Self::with_parts(
            Embedder::default(),
            store,
            provider,
            config.rag.embedding_model.clone(),
        )
    }

    /// Builds the engine around an explicit store and provider.
    pub fn with_parts(
        embedder: Embedder,
        store: Box<dyn VectorStore>,
        provider: Box<dyn GenerationProvider>,
        embedding_model: impl Into<String>,
    ) -> Self {
        info!(
            store = store.name(),
            dedup = ?store.dedup_policy(),
            provider = provider.name(),
            dim = embedder.dim(),
            "RAG engine ready"
        );
        Self {
            embedder,
            store,
            provider,
            metrics: Metrics::new(),
            embedding_model: embedding_model.into(),
            doc_titles: HashSet::new(),
            chunk_count: 0,
        }
    }

    /// Embeds and stores a batch of chunks.
    ///
    /// # Returns
    ///
    /// `(new_titles, submitted)`: how many document titles this call saw for
    /// the first time, and how many chunks it submitted. Chunks whose content
    /// the store already holds still count as submitted.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Ingest`] if the store rejects the batch. The title
    /// set and chunk counter are then left exactly as they were.
    pub async fn ingest_chunks(&mut self, chunks: &[Chunk]) -> Result<(usize, usize)> {
        let mut new_titles = HashSet::new();
        let records: Vec<VectorRecord> = chunks
            .iter()
            .map(|chunk| {
                let hash = ContentHash::of(&chunk.text);
                if !self.doc_titles.contains(&chunk.title) {
                    new_titles.insert(chunk.title.clone());
                }
                VectorRecord::new(
                    self.embedder.embed(&chunk.text),
                    ChunkMetadata::from_chunk(chunk, &hash),
                )
            })
            .collect();

        let submitted = records.len();
        if submitted > 0 {
            debug!(chunks = submitted, store = self.store.name(), "Upserting batch");
            self.store
                .upsert(records)
                .await
                .map_err(|e| RagError::Ingest(format!("{e:#}")))?;
        }

        let added = new_titles.len();
        self.doc_titles.extend(new_titles);
        self.chunk_count += submitted;

        info!(new_titles = added, chunks = submitted, "Ingested batch");
        Ok((added, submitted))
    }

    /// Returns the metadata of the `k` chunks most similar to `query`, best first.
    pub async fn retrieve(&mut self, query: &str, k: usize) -> Result<Vec<Citation>> {
        let started = Instant::now();
        let query_vector = self.embedder.embed(query);
        let results = self
            .store
            .search(&query_vector, k)
            .await
            .map_err(|e| RagError::Retrieval(format!("{e:#}")))?;
        self.metrics.add_retrieval(started.elapsed());

        debug!(hits = results.len(), k, "Retrieved context");
        Ok(results.into_iter().map(|r| r.metadata).collect())
    }

    /// Asks the provider for an answer grounded in `contexts`.
    pub async fn generate(&mut self, query: &str, contexts: &[Citation]) -> Result<String> {
        let started = Instant::now();
        let answer = self.provider.generate(query, contexts).await?;
        self.metrics.add_generation(started.elapsed());
        Ok(answer)
    }

    pub fn stats(&self) -> EngineStats {
        let summary = self.metrics.summary();
        EngineStats {
            total_docs: self.doc_titles.len(),
            total_chunks: self.chunk_count,
            embedding_model: self.embedding_model.clone(),
            llm_model: self.provider.name().to_string(),
            avg_retrieval_latency_ms: summary.avg_retrieval_latency_ms,
            avg_generation_latency_ms: summary.avg_generation_latency_ms,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
