//! Model clients: prompt in, generated text out.
//!
//! The pipeline only needs two operations from a language model, captured by
//! [`ModelClient`]. Streaming, framing and provider quirks stay behind it:
//!
//! - [`OllamaClient`] — native Ollama `/api/chat` with NDJSON streaming (default)
//! - [`ProviderClient`] — any provider supported by `edgequake-llm`
//! - [`Backend`] — the closed choice between the two, picked from config
//!
//! Tests implement the trait with scripted in-memory clients.

pub mod ollama;
pub mod provider;

pub use ollama::{OllamaClient, StreamAccumulator};
pub use provider::ProviderClient;

use crate::config::NotesConfig;
use crate::error::{ModelError, NotesError};
use std::future::Future;

/// A language model reachable by a single prompt/response call.
///
/// `generate` resolves once the whole response is available; streamed
/// responses are accumulated by the implementation. Calls are awaited one at
/// a time by the pipeline.
pub trait ModelClient: Send + Sync {
    /// Send one user-role prompt and return the trimmed response text.
    ///
    /// An empty string is a successful call with no content; callers decide
    /// whether that counts as a failure.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, ModelError>> + Send;

    /// Check that the server answers. Called once before any processing.
    fn test_connection(&self) -> impl Future<Output = Result<(), ModelError>> + Send;

    /// Human-readable target for log and error messages.
    fn endpoint(&self) -> String;
}

/// The model backend selected by [`NotesConfig`].
pub enum Backend {
    Ollama(OllamaClient),
    Provider(ProviderClient),
}

impl Backend {
    /// `provider_name` set → edgequake-llm provider, otherwise native Ollama.
    pub fn from_config(config: &NotesConfig) -> Result<Self, NotesError> {
        match config.provider_name.as_deref() {
            Some(name) => Ok(Backend::Provider(ProviderClient::new(name, &config.model)?)),
            None => Ok(Backend::Ollama(OllamaClient::from_config(config)?)),
        }
    }
}

impl ModelClient for Backend {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        match self {
            Backend::Ollama(c) => c.generate(prompt).await,
            Backend::Provider(c) => c.generate(prompt).await,
        }
    }

    async fn test_connection(&self) -> Result<(), ModelError> {
        match self {
            Backend::Ollama(c) => c.test_connection().await,
            Backend::Provider(c) => c.test_connection().await,
        }
    }

    fn endpoint(&self) -> String {
        match self {
            Backend::Ollama(c) => c.endpoint(),
            Backend::Provider(c) => c.endpoint(),
        }
    }
}
