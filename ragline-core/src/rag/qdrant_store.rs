//! Qdrant vector database storage implementation.
//!
//! Points are addressed by a UUID derived from the chunk's content hash, so
//! re-sending the same content overwrites the same point instead of adding a
//! duplicate.

use super::store::{DedupPolicy, VectorStore};
use super::types::{ChunkMetadata, SearchResult, VectorRecord};
use crate::config::StorageConfig;
use anyhow::{bail, ensure, Context, Result};
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        vectors_config::Config, CreateCollectionBuilder, Distance, PointStruct,
        SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder, VectorsConfig,
    },
    Payload, Qdrant,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Qdrant-based vector store for chunk embeddings.
///
/// Concurrency is left to the server; the client handle is cheap to clone.
#[derive(Clone)]
pub struct QdrantStore {
    client: Arc<Qdrant>,
    collection_name: String,
    vector_size: u64,
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points = records
            .into_iter()
            .map(|record| -> Result<PointStruct> {
                let raw_id = if record.metadata.id.is_empty() {
                    &record.metadata.hash
                } else {
                    &record.metadata.id
                };
                let point_id = point_id_for(raw_id);
                let payload = Payload::try_from(serde_json::to_value(&record.metadata)?)
                    .context("Chunk metadata is not a JSON object")?;
                Ok(PointStruct::new(point_id, record.vector, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(collection = %self.collection_name, points = points.len(), "Upserting points");
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points).wait(true))
            .await
            .context("Failed to upsert points")?;

        Ok(())
    }

    /// Forwards the query to Qdrant and keeps the server's ranking.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection_name, query.to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .context("Failed to search points")?;

        Ok(response
            .result
            .into_iter()
            .map(|point| SearchResult {
                score: point.score,
                metadata: metadata_from_payload(&point.payload),
            })
            .collect())
    }

    fn dedup_policy(&self) -> DedupPolicy {
        DedupPolicy::Overwrite
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

impl QdrantStore {
    /// Connects to Qdrant and ensures the collection exists.
    ///
    /// Fails if the server cannot be reached within the configured timeout, or
    /// if an existing collection was created with a different vector size or
    /// distance.
    pub async fn new(storage_config: &StorageConfig, vector_size: u64) -> Result<Self> {
        let client = Qdrant::from_url(&storage_config.url)
            .timeout(Duration::from_secs(storage_config.timeout_secs))
            .build()
            .context("Failed to build Qdrant client")?;

        let store = Self {
            client: Arc::new(client),
            collection_name: storage_config.collection_name.clone(),
            vector_size,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn ensure_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection_name)
            .await
            .context("Failed to check collection")?;

        if exists {
            let info = self
                .client
                .collection_info(&self.collection_name)
                .await
                .context("Failed to get collection info")?;
            let existing = info
                .result
                .and_then(|r| r.config)
                .and_then(|c| c.params)
                .and_then(|p| p.vectors_config);
            return check_vectors_config(existing.as_ref(), self.vector_size)
                .with_context(|| format!("Collection {} is incompatible", self.collection_name));
        }

        debug!(collection = %self.collection_name, size = self.vector_size, "Creating collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name)
                    .vectors_config(cosine_vectors(self.vector_size)),
            )
            .await
            .context("Failed to create collection")?;

        Ok(())
    }
}

fn cosine_vectors(size: u64) -> VectorsConfig {
    VectorsConfig {
        config: Some(Config::Params(
            VectorParamsBuilder::new(size, Distance::Cosine).build(),
        )),
    }
}

/// An existing collection must hold one unnamed vector of `size` with cosine distance.
fn check_vectors_config(existing: Option<&VectorsConfig>, size: u64) -> Result<()> {
    let Some(Config::Params(params)) = existing.and_then(|c| c.config.as_ref()) else {
        bail!("expected a single unnamed vector per point");
    };
    ensure!(
        params.size == size,
        "vector size is {}, expected {}",
        params.size,
        size
    );
    ensure!(
        params.distance() == Distance::Cosine,
        "distance is {:?}, expected Cosine",
        params.distance()
    );
    Ok(())
}

/// Maps an arbitrary identifier onto a Qdrant point id.
///
/// Strings that already parse as a UUID are used as-is (in canonical form);
/// anything else becomes a UUIDv5 in the DNS namespace. The mapping is pure,
/// so the same content hash always lands on the same point.
pub fn point_id_for(raw: &str) -> String {
    match Uuid::parse_str(raw) {
        Ok(uuid) => uuid.to_string(),
        Err(_) => Uuid::new_v5(&Uuid::NAMESPACE_DNS, raw.as_bytes()).to_string(),
    }
}

fn metadata_from_payload(payload: &HashMap<String, Value>) -> ChunkMetadata {
    let field = |key: &str| payload.get(key).and_then(|v| v.as_str()).cloned();

    ChunkMetadata {
        id: field("id").unwrap_or_default(),
        hash: field("hash").unwrap_or_default(),
        title: field("title").unwrap_or_default(),
        section: field("section"),
        text: field("text").unwrap_or_default(),
    }
}
