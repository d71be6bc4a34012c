//! `edgequake-llm` adapter.
//!
//! Lets the same pipeline run against OpenAI, Anthropic, Gemini, Azure or
//! any OpenAI-compatible server when a local Ollama is not available. The
//! provider handles authentication from its usual environment variables
//! (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).

use crate::client::ModelClient;
use crate::error::{ModelError, NotesError};
use crate::prompts::CONNECTION_PROBE_PROMPT;
use edgequake_llm::{ChatMessage, LLMProvider, ProviderFactory};
use std::sync::Arc;

pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    name: String,
    model: String,
}

impl ProviderClient {
    /// Instantiate a named provider with the given model.
    pub fn new(provider_name: &str, model: &str) -> Result<Self, NotesError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            NotesError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::from_provider(provider, provider_name, model))
    }

    /// Wrap a pre-built provider (custom middleware, tests).
    pub fn from_provider(
        provider: Arc<dyn LLMProvider>,
        name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            name: name.into(),
            model: model.into(),
        }
    }
}

impl ModelClient for ProviderClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let messages = vec![ChatMessage::user(prompt)];
        let response = self
            .provider
            .chat(&messages, None)
            .await
            .map_err(|e| ModelError::Provider(e.to_string()))?;
        Ok(response.content.trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ModelError> {
        self.generate(CONNECTION_PROBE_PROMPT).await.map(|_| ())
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.name, self.model)
    }
}
