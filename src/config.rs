//! Configuration for a papernotes run.
//!
//! All behaviour is controlled through [`NotesConfig`], built via its
//! [`NotesConfigBuilder`]. The config is read-only once built and is the only
//! state shared between documents.

use crate::error::NotesError;
use crate::paper_type::PaperType;
use crate::pipeline::chunk::ChunkingConfig;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model tag.
pub const DEFAULT_MODEL: &str = "llama2:latest";

/// Configuration for processing folders of papers.
///
/// # Example
/// ```rust
/// use papernotes::{NotesConfig, ProcessingMode};
///
/// let config = NotesConfig::builder()
///     .input_root("papers")
///     .output_root("vault/notes")
///     .model("llama3.1:8b")
///     .max_chunk_size(600)
///     .overlap_size(80)
///     .mode(ProcessingMode::Chunked)
///     .build()
///     .unwrap();
/// assert_eq!(config.chunking.max_chunk_size, 600);
/// ```
#[derive(Clone)]
pub struct NotesConfig {
    /// Root holding one sub-folder of PDFs per category. Default: `pdfs_input`.
    pub input_root: PathBuf,

    /// Root receiving one sub-folder of notes per category. Default: `notes_output`.
    pub output_root: PathBuf,

    /// Base URL of the Ollama server. Default: `http://localhost:11434`.
    pub ollama_url: String,

    /// Model identifier sent with every request. Default: `llama2:latest`.
    pub model: String,

    /// Route calls through an edgequake-llm provider (e.g. "openai")
    /// instead of the native Ollama client. Default: None.
    pub provider_name: Option<String>,

    /// Chunk size and overlap, in words.
    pub chunking: ChunkingConfig,

    /// Chunked (summarise then synthesise) or direct (one call). Default: Chunked.
    pub mode: ProcessingMode,

    /// Extra attempts per chunk summary after a failure. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-request timeout in seconds. Default: None (wait for the server).
    ///
    /// A local model can take minutes on a long prompt, so there is no
    /// timeout unless one is asked for.
    pub request_timeout_secs: Option<u64>,

    /// Write `<stem>_chunks_debug.txt` next to each chunked note. Default: true.
    pub write_debug: bool,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("pdfs_input"),
            output_root: PathBuf::from("notes_output"),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            chunking: ChunkingConfig::default(),
            mode: ProcessingMode::default(),
            max_retries: 0,
            retry_backoff_ms: 500,
            request_timeout_secs: None,
            write_debug: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for NotesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotesConfig")
            .field("input_root", &self.input_root)
            .field("output_root", &self.output_root)
            .field("ollama_url", &self.ollama_url)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("chunking", &self.chunking)
            .field("mode", &self.mode)
            .field("max_retries", &self.max_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("write_debug", &self.write_debug)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn NotesProgressCallback>"),
            )
            .finish()
    }
}

impl NotesConfig {
    /// Create a new builder for `NotesConfig`.
    pub fn builder() -> NotesConfigBuilder {
        NotesConfigBuilder {
            config: Self::default(),
        }
    }

    /// `<input_root>/<category>`.
    pub fn input_dir(&self, category: &str) -> PathBuf {
        self.input_root.join(category)
    }

    /// `<output_root>/<category>`.
    pub fn output_dir(&self, category: &str) -> PathBuf {
        self.output_root.join(category)
    }

    /// Categories processed when none are named: the four built-in ones.
    pub fn default_categories() -> Vec<String> {
        PaperType::ALL
            .iter()
            .map(|t| t.folder_name().to_string())
            .collect()
    }
}

/// Builder for [`NotesConfig`].
pub struct NotesConfigBuilder {
    config: NotesConfig,
}

impl fmt::Debug for NotesConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotesConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl NotesConfigBuilder {
    pub fn input_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_root = path.into();
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_root = path.into();
        self
    }

    pub fn ollama_url(mut self, url: impl Into<String>) -> Self {
        self.config.ollama_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn max_chunk_size(mut self, words: usize) -> Self {
        self.config.chunking.max_chunk_size = words;
        self
    }

    pub fn overlap_size(mut self, words: usize) -> Self {
        self.config.chunking.overlap_size = words;
        self
    }

    pub fn chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.config.chunking = chunking;
        self
    }

    pub fn mode(mut self, mode: ProcessingMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(10);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms.min(60_000);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn write_debug(mut self, v: bool) -> Self {
        self.config.write_debug = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NotesConfig, NotesError> {
        let c = &self.config;
        ChunkingConfig::new(c.chunking.max_chunk_size, c.chunking.overlap_size)?;
        if c.model.trim().is_empty() {
            return Err(NotesError::InvalidConfig("model must not be empty".into()));
        }
        if c.provider_name.is_none()
            && !(c.ollama_url.starts_with("http://") || c.ollama_url.starts_with("https://"))
        {
            return Err(NotesError::InvalidConfig(format!(
                "Ollama URL must start with http:// or https://, got '{}'",
                c.ollama_url
            )));
        }
        if c.input_root == c.output_root {
            return Err(NotesError::InvalidConfig(
                "input and output roots must differ".into(),
            ));
        }
        Ok(self.config)
    }
}

/// How a document is turned into a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Chunk, summarise each chunk, synthesise. Writes `<stem>_chunked.md`. (default)
    #[default]
    Chunked,
    /// One call with the paper type's analysis prompt. Writes `<stem>.md`.
    ///
    /// Only suitable for papers that fit in the model's context window.
    Direct,
}
