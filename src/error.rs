//! Error types for the papernotes library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`NotesError`] — **Document-fatal**: this PDF (or this run's
//!   configuration) cannot produce a note. Returned from the `process_pdf*`
//!   entry points. The folder loop logs it and moves on to the next PDF.
//!
//! * [`ChunkError`] — **Non-fatal**: one chunk could not be summarised. The
//!   document continues with the remaining chunks and only fails once every
//!   chunk has failed.
//!
//! * [`ModelError`] — a single model call failed. Callers wrap it into one of
//!   the two types above depending on which stage issued the call.

use std::path::PathBuf;
use thiserror::Error;

/// All document-level errors returned by the papernotes library.
#[derive(Debug, Error)]
pub enum NotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A category input folder could not be listed.
    #[error("Failed to read folder '{path}': {source}")]
    FolderReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// pdfium could not open or parse the document.
    #[error("Failed to extract text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// The PDF opened fine but carries no text layer (scanned document).
    #[error("No extractable text in '{path}' (scanned PDFs need OCR, which is not supported)")]
    NoExtractableText { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library in the working\n\
directory, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Reduction errors ──────────────────────────────────────────────────
    /// The chunker produced nothing to summarise.
    #[error("Document '{title}' produced no chunks")]
    EmptyDocument { title: String },

    /// Every chunk failed to summarise; there is nothing to synthesise.
    #[error("All {total} chunks of '{title}' failed to summarise.\nFirst error: {first_error}")]
    AllChunksFailed {
        title: String,
        total: usize,
        first_error: String,
    },

    /// The final synthesis (or the single direct-mode call) failed.
    #[error("Synthesis failed for '{title}': {source}")]
    SynthesisFailed {
        title: String,
        #[source]
        source: ModelError,
    },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The connectivity probe failed. The only process-fatal error.
    #[error("Cannot reach the model server at '{endpoint}': {detail}\nMake sure it is running and the model is pulled.")]
    ModelUnreachable { endpoint: String, detail: String },

    /// A named edgequake-llm provider could not be constructed.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single chunk.
///
/// Recorded next to the chunk in the debug artifact; the document keeps going.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkError {
    /// The summarisation call failed after all retries.
    #[error("Chunk {chunk} ({header}): summary failed after {retries} retries: {detail}")]
    SummaryFailed {
        chunk: usize,
        header: String,
        retries: u32,
        detail: String,
    },
}

/// Failure of one model call.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Connection refused, reset, DNS failure, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The server sent an `{"error": ...}` frame.
    #[error("server error: {0}")]
    Server(String),

    /// A streamed line was not valid JSON.
    #[error("malformed response frame: {detail}")]
    MalformedFrame { detail: String },

    /// An edgequake-llm provider returned an error.
    #[error("provider error: {0}")]
    Provider(String),

    /// The call completed but produced no text.
    #[error("model returned an empty response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_chunks_failed_display() {
        let e = NotesError::AllChunksFailed {
            title: "Paper1".into(),
            total: 4,
            first_error: "connection refused".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 4 chunks"), "got: {msg}");
        assert!(msg.contains("Paper1"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn synthesis_failed_carries_source() {
        let e = NotesError::SynthesisFailed {
            title: "Paper1".into(),
            source: ModelError::Status {
                status: 404,
                body: "model not found".into(),
            },
        };
        assert!(e.to_string().contains("HTTP 404"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn chunk_error_display() {
        let e = ChunkError::SummaryFailed {
            chunk: 3,
            header: "Results (Part 2)".into(),
            retries: 0,
            detail: "model returned an empty response".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Chunk 3"));
        assert!(msg.contains("Results (Part 2)"));
    }

    #[test]
    fn model_unreachable_display() {
        let e = NotesError::ModelUnreachable {
            endpoint: "http://localhost:11434".into(),
            detail: "connection refused".into(),
        };
        assert!(e.to_string().contains("localhost:11434"));
    }
}
