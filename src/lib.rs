//! # papernotes
//!
//! Turn folders of academic PDFs into structured Markdown notes with a local
//! language model.
//!
//! ## Why chunk?
//!
//! A full paper rarely fits in the context window of a small local model.
//! Sending it whole gets the tail silently truncated. Instead the text is cut
//! into section-aware, overlapping chunks of a few hundred words, each chunk
//! is summarised on its own, and a final call synthesises the summaries into
//! one note with a fixed set of sections.
//!
//! ## Pipeline Overview
//!
//! ```text
//! <input_root>/<category>/*.pdf
//!  │
//!  ├─ 1. Extract   page text via pdfium (spawn_blocking)
//!  ├─ 2. Chunk     header detection → sections → ≤ 800-word windows
//!  ├─ 3. Summarise one model call per chunk, failures recorded
//!  ├─ 4. Synthesise one call over the successful summaries
//!  ├─ 5. Polish    strip fences, normalise whitespace
//!  └─ 6. Write     <output_root>/<category>/<stem>_chunked.md (+ debug file)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use papernotes::{NoteProcessor, NotesConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NotesConfig::builder().model("llama3.1:8b").build()?;
//!     let processor = NoteProcessor::from_config(config)?;
//!     processor.test_connection().await?;
//!     let report = processor.process_folder_type("theory").await?;
//!     eprintln!("{} notes, {} failures", report.processed.len(), report.failed.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `papernotes` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! papernotes = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod paper_type;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{Backend, ModelClient, OllamaClient, ProviderClient};
pub use config::{NotesConfig, NotesConfigBuilder, ProcessingMode};
pub use error::{ChunkError, ModelError, NotesError};
pub use output::{
    ChunkOutcome, DocumentFailure, DocumentReport, FinalNote, FolderOverview, FolderReport,
};
pub use paper_type::PaperType;
pub use pipeline::chunk::{Chunk, Chunker, ChunkingConfig};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use process::NoteProcessor;
pub use progress::{NoopProgressCallback, NotesProgressCallback, ProgressCallback};
