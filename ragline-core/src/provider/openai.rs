//! OpenAI-compatible chat completions provider.
//!
//! Sends one single-turn request per question with a low sampling
//! temperature. Works against any server exposing `/chat/completions`.

use super::stub::{truncate_chars, CONTEXT_CHAR_LIMIT};
use super::types::*;
use crate::config::LlmConfig;
use crate::rag::Citation;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Remote LLM provider speaking the OpenAI chat completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    label: String,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates the provider from config.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingCredential`] when no API key is set, and
    /// [`ProviderError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::MissingCredential("openai".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            label: format!("openai:{}", config.model),
            http_client,
        })
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn generate(&self, query: &str, contexts: &[Citation]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest::new(&self.model, vec![Message::user(build_prompt(query, contexts))])
            .with_temperature(self.temperature);

        debug!(model = %self.model, sources = contexts.len(), "Requesting completion");
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let completion: ChatResponse = serde_json::from_str(&body)?;
        completion.into_text().ok_or(ProviderError::EmptyCompletion)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Builds the single grounded prompt sent to the model.
pub fn build_prompt(query: &str, contexts: &[Citation]) -> String {
    let mut prompt = String::from(
        "You are a helpful company policy assistant. \
         Cite sources by title and section when relevant.\n",
    );
    prompt.push_str(&format!("Question: {query}\nSources:\n"));
    for context in contexts {
        let section = context.section.as_deref().unwrap_or("");
        prompt.push_str(&format!(
            "- {} | {}\n{}\n---\n",
            context.title,
            section,
            truncate_chars(&context.text, CONTEXT_CHAR_LIMIT, "")
        ));
    }
    prompt.push_str(
        "Write a concise, accurate answer grounded in the sources. \
         If unsure, say so rather than guessing.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::{Chunk, ChunkMetadata, ContentHash};

    #[test]
    fn test_requires_api_key() {
        let err = OpenAiProvider::new(&LlmConfig::default()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));

        let config = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        assert!(OpenAiProvider::new(&config).is_err());
    }

    #[test]
    fn test_label_includes_model() {
        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        let provider = OpenAiProvider::new(&config).unwrap();
        assert_eq!(provider.name(), "openai:gpt-4o-mini");
    }

    #[test]
    fn test_prompt_contains_sources() {
        let chunk = Chunk::new("Return Policy", "Returns accepted within 14 days of purchase.")
            .with_section("Timeframe");
        let contexts = vec![ChunkMetadata::from_chunk(&chunk, &ContentHash::of(&chunk.text))];

        let prompt = build_prompt("Can I return a blender?", &contexts);
        assert!(prompt.contains("Question: Can I return a blender?"));
        assert!(prompt.contains("- Return Policy | Timeframe\nReturns accepted within 14 days"));
        assert!(prompt.contains("If unsure, say so"));
    }

    #[test]
    fn test_prompt_truncates_each_source() {
        let text = "z".repeat(1000);
        let chunk = Chunk::new("Long", text.as_str());
        let contexts = vec![ChunkMetadata::from_chunk(&chunk, &ContentHash::of(&text))];

        let prompt = build_prompt("q", &contexts);
        assert!(prompt.contains(&"z".repeat(CONTEXT_CHAR_LIMIT)));
        assert!(!prompt.contains(&"z".repeat(CONTEXT_CHAR_LIMIT + 1)));
    }

    #[test]
    fn test_response_text_extraction() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Within 14 days."}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Within 14 days."));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.into_text().is_none());
    }
}
