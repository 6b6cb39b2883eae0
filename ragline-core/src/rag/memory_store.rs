//! In-memory vector storage and search.
//!
//! A brute-force index: every query scans every stored vector. Suitable for
//! the small, process-lifetime corpora this engine falls back to; data is lost
//! when the process ends.

use super::embedder::{l2_norm, NORM_EPSILON};
use super::store::{DedupPolicy, VectorStore};
use super::types::{SearchResult, VectorRecord};
use anyhow::{ensure, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashSet;

/// An in-memory vector store keyed by content hash.
///
/// Records are kept in insertion order. Not internally synchronized: callers
/// sharing one instance across tasks must serialize writes themselves, which
/// `&mut self` on [`VectorStore::upsert`] already enforces.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    dim: usize,
    records: Vec<VectorRecord>,
    seen: HashSet<String>,
}

impl InMemoryStore {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends records whose hash has not been seen; the rest are dropped.
    pub fn insert(&mut self, records: Vec<VectorRecord>) {
        for record in records {
            let hash = &record.metadata.hash;
            if !hash.is_empty() && !self.seen.insert(hash.clone()) {
                continue;
            }
            self.records.push(record);
        }
    }

    /// Top-k by cosine similarity. Ties keep insertion order.
    ///
    /// Time complexity: O(n * d) to score, O(n + k log k) to rank.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        if self.records.is_empty() || k == 0 {
            return Vec::new();
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(f32, usize)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (cosine_similarity(query, query_norm, &record.vector), i))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank_order);

        scored
            .into_iter()
            .map(|(score, i)| SearchResult {
                score,
                metadata: self.records[i].metadata.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    /// Rejects the whole batch if any vector does not match the store's dimension.
    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<()> {
        for record in &records {
            ensure!(
                record.vector.len() == self.dim,
                "Vector dimension mismatch: expected {}, got {}",
                self.dim,
                record.vector.len()
            );
        }
        self.insert(records);
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        Ok(self.top_k(query, k))
    }

    fn dedup_policy(&self) -> DedupPolicy {
        DedupPolicy::SkipExisting
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Higher score first; equal scores by insertion index.
fn rank_order(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
}

/// `dot(a, b) / (|a| * |b| + eps)`; zero vectors score 0.0 instead of NaN.
fn cosine_similarity(query: &[f32], query_norm: f32, vector: &[f32]) -> f32 {
    let dot: f32 = query.iter().zip(vector).map(|(x, y)| x * y).sum();
    dot / (query_norm * l2_norm(vector) + NORM_EPSILON)
}
