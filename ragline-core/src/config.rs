use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the retrieval engine.
///
/// Selects the vector store and generation backends and carries the labels
/// reported through [`crate::RagEngine::stats`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Which generation backend answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Offline, deterministic answers built from the retrieved sources.
    #[default]
    Stub,
    /// OpenAI-compatible chat completions endpoint.
    OpenAi,
}

/// Which vector store holds the embedded chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    /// In-process brute-force index (default)
    #[default]
    Memory,
    /// Remote Qdrant collection over gRPC
    Qdrant,
}

/// Configuration for the generation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,
    pub model: String,
    pub base_url: String,
    /// Credential for the remote provider. Never written back to disk.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f64,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Configuration for embedding and chunking.
///
/// The vector dimension is not configurable; every backend uses
/// [`crate::rag::EMBEDDING_DIM`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Label reported in stats; the embedder itself is content-hash based.
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

/// Vector database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub vector_store: VectorStoreKind,
    /// Qdrant gRPC endpoint, only used when `vector_store` is `qdrant`
    pub url: String,
    pub collection_name: String,
    /// Number of results to return from similarity searches
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    4
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_storage_timeout() -> u64 {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            temperature: 0.1,
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: "local-hash-384".to_string(),
            chunk_size: 800,
            chunk_overlap: 120,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            vector_store: VectorStoreKind::default(),
            url: "http://localhost:6334".to_string(),
            collection_name: "ragline_kb".to_string(),
            top_k: default_top_k(),
            timeout_secs: default_storage_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use defaults.
    ///
    /// Environment overrides are applied in both cases.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default().apply_env()
    }

    /// Overlays backend selection and the provider credential from the environment.
    ///
    /// Recognized variables: `RAGLINE_VECTOR_STORE`, `RAGLINE_COLLECTION`,
    /// `RAGLINE_LLM_PROVIDER` and `OPENAI_API_KEY`. Unrecognized values are ignored.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(kind) = lookup("RAGLINE_VECTOR_STORE").and_then(|v| parse_kind(&v)) {
            self.storage.vector_store = kind;
        }
        if let Some(name) = lookup("RAGLINE_COLLECTION").filter(|v| !v.is_empty()) {
            self.storage.collection_name = name;
        }
        if let Some(kind) = lookup("RAGLINE_LLM_PROVIDER").and_then(|v| parse_kind(&v)) {
            self.llm.provider = kind;
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.llm.api_key = Some(key);
        }
        self
    }
}

fn parse_kind<T: serde::de::DeserializeOwned>(value: &str) -> Option<T> {
    serde_yaml::from_str(&value.trim().to_lowercase()).ok()
}
