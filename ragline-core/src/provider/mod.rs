//! Generation provider abstraction layer.
//!
//! This module defines a common interface for answer generation backends
//! (offline stub, OpenAI-compatible HTTP) and the startup step that selects
//! one of them.

mod types;
pub mod openai;
pub mod stub;

// Re-export common types
pub use types::{
    ChatRequest, ChatResponse, Choice, GenerationProvider, Message, ProviderError, Result,
};

// Re-export provider implementations
pub use openai::OpenAiProvider;
pub use stub::StubProvider;

use crate::config::{LlmConfig, LlmProviderKind};
use tracing::{info, warn};

/// Creates the provider selected by `config`.
///
/// A remote provider that cannot be constructed (most commonly: no API key)
/// is replaced by [`StubProvider`], so this never fails.
pub fn create_provider(config: &LlmConfig) -> Box<dyn GenerationProvider> {
    match config.provider {
        LlmProviderKind::Stub => Box::new(StubProvider::new()),
        LlmProviderKind::OpenAi => match OpenAiProvider::new(config) {
            Ok(provider) => {
                info!(model = %config.model, "Using OpenAI generation provider");
                Box::new(provider)
            }
            Err(e) => {
                warn!(error = %e, "OpenAI provider unavailable, falling back to stub");
                Box::new(StubProvider::new())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_by_default() {
        assert_eq!(create_provider(&LlmConfig::default()).name(), "stub");
    }

    #[test]
    fn test_openai_without_key_falls_back() {
        let config = LlmConfig {
            provider: LlmProviderKind::OpenAi,
            api_key: None,
            ..LlmConfig::default()
        };
        assert_eq!(create_provider(&config).name(), "stub");
    }

    #[test]
    fn test_openai_with_key() {
        let config = LlmConfig {
            provider: LlmProviderKind::OpenAi,
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(create_provider(&config).name(), "openai:gpt-4o-mini");
    }
}
