//! ragline-core - Retrieval core for grounded question answering
//!
//! Provides the building blocks behind an ingest/ask API:
//! - Deterministic text embedding
//! - Vector storage (in-memory or Qdrant) with content-hash deduplication
//! - Generation provider abstraction (offline stub, OpenAI-compatible)
//! - Latency metrics
//! - Configuration management
//!
//! ## Primary API
//!
//! Callers interact with the core through [`RagEngine`]: `ingest_chunks`,
//! `retrieve`, `generate` and `stats`.

pub mod config;
pub mod provider;
pub mod rag;

pub use config::{Config, LlmProviderKind, VectorStoreKind};
pub use provider::{GenerationProvider, OpenAiProvider, ProviderError, StubProvider};
pub use rag::{Chunk, Citation, EngineStats, RagEngine, RagError};
