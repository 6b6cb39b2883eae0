//! ragline - Retrieval-augmented question answering
//!
//! Convenience wrapper crate that re-exports the ragline core.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! ragline = "0.1"
//! ```

pub use ragline_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use ragline_core::rag::{build_chunks_from_docs, SourceDocument};
    pub use ragline_core::{Chunk, Citation, Config, EngineStats, RagEngine, RagError};
}
