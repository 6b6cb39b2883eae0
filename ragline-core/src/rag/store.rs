//! Vector store abstraction and factory.
//!
//! This module provides a unified interface for the in-process index and the
//! remote Qdrant backend, and the startup step that picks between them.

use super::memory_store::InMemoryStore;
use super::qdrant_store::QdrantStore;
use super::types::{SearchResult, VectorRecord};
use crate::config::{StorageConfig, VectorStoreKind};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// How a store treats a record whose hash it already holds.
///
/// Either way the store ends up with one record per content hash. The policies
/// only differ in which title/section survives when identical text is sent
/// again under a different document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// The first record wins; later ones are dropped.
    SkipExisting,
    /// The latest record replaces the stored point with the same id.
    Overwrite,
}

/// Unified interface for vector database operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Stores a batch of records, deduplicating by content hash.
    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<()>;

    /// Searches for the most similar records using cosine similarity.
    ///
    /// # Returns
    ///
    /// At most `k` results, sorted by descending similarity score. An empty
    /// store yields an empty vector.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    fn dedup_policy(&self) -> DedupPolicy;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Creates the vector store selected by `storage_config`.
///
/// A Qdrant backend that cannot be reached or set up at construction time is
/// replaced by an [`InMemoryStore`], so this never fails.
pub async fn create_vector_store(
    storage_config: &StorageConfig,
    vector_size: usize,
) -> Box<dyn VectorStore> {
    match storage_config.vector_store {
        VectorStoreKind::Memory => Box::new(InMemoryStore::new(vector_size)),
        VectorStoreKind::Qdrant => {
            match QdrantStore::new(storage_config, vector_size as u64).await {
                Ok(store) => {
                    info!(
                        url = %storage_config.url,
                        collection = %store.collection_name(),
                        "Using Qdrant vector store"
                    );
                    Box::new(store)
                }
                Err(e) => {
                    warn!(
                        url = %storage_config.url,
                        error = %format!("{e:#}"),
                        "Qdrant unavailable, falling back to in-memory store"
                    );
                    Box::new(InMemoryStore::new(vector_size))
                }
            }
        }
    }
}
