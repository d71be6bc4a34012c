//! Progress-callback trait for folder, document and chunk events.
//!
//! Inject an [`Arc<dyn NotesProgressCallback>`] via
//! [`crate::config::NotesConfigBuilder::progress_callback`] to follow a run as
//! it walks folders, documents and chunks. The library never prints; the CLI
//! turns these events into a progress bar.
//!
//! # Example
//!
//! ```rust
//! use papernotes::{NotesConfig, NotesProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     summarised: AtomicUsize,
//! }
//!
//! impl NotesProgressCallback for CountingCallback {
//!     fn on_chunk_complete(&self, chunk: usize, total: usize, summary_len: usize) {
//!         self.summarised.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("chunk {}/{} → {} chars", chunk, total, summary_len);
//!     }
//! }
//!
//! let config = NotesConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { summarised: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Events emitted while processing. Every method defaults to a no-op.
///
/// Processing is sequential, so events for one document arrive in order:
/// `on_document_start`, `on_chunking_complete`, then per chunk
/// `on_chunk_start` followed by `on_chunk_complete` or `on_chunk_error`,
/// then `on_synthesis_start`, and finally `on_document_complete` or
/// `on_document_failed`.
pub trait NotesProgressCallback: Send + Sync {
    /// A category folder is about to be processed.
    fn on_folder_start(&self, category: &str, pdf_count: usize) {
        let _ = (category, pdf_count);
    }

    /// A PDF is about to be extracted.
    fn on_document_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// The chunker finished.
    ///
    /// # Arguments
    /// * `total_words`  — words in the extracted text
    /// * `total_chunks` — chunks that will be summarised
    fn on_chunking_complete(&self, total_words: usize, total_chunks: usize) {
        let _ = (total_words, total_chunks);
    }

    /// A chunk summary request is about to be sent. `chunk` is 1-indexed.
    fn on_chunk_start(&self, chunk: usize, total_chunks: usize, header: &str) {
        let _ = (chunk, total_chunks, header);
    }

    /// A chunk was summarised.
    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, summary_len: usize) {
        let _ = (chunk, total_chunks, summary_len);
    }

    /// A chunk failed; the document continues.
    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: &str) {
        let _ = (chunk, total_chunks, error);
    }

    /// The final reduction call is about to be sent.
    fn on_synthesis_start(&self, summaries: usize) {
        let _ = summaries;
    }

    /// A note was written.
    fn on_document_complete(&self, file_name: &str, successful: usize, total_chunks: usize) {
        let _ = (file_name, successful, total_chunks);
    }

    /// The document was skipped.
    fn on_document_failed(&self, file_name: &str, error: &str) {
        let _ = (file_name, error);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl NotesProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::NotesConfig`].
pub type ProgressCallback = Arc<dyn NotesProgressCallback>;
