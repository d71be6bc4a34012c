//! Values returned by the processing entry points.

use crate::config::ProcessingMode;
use crate::error::ChunkError;
use crate::paper_type::PaperType;
use crate::pipeline::chunk::Chunk;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of summarising one chunk, kept by chunk position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    pub chunk: Chunk,
    pub summary: Result<String, ChunkError>,
}

impl ChunkOutcome {
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref().ok()
    }
}

/// The synthesised note and the metadata rendered around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalNote {
    pub title: String,
    /// File name of the source PDF.
    pub source: String,
    /// `%Y-%m-%d %H:%M:%S`, local time.
    pub processed_at: String,
    pub paper_type: PaperType,
    pub content: String,
}

/// A successfully processed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub title: String,
    pub source: String,
    pub mode: ProcessingMode,
    pub total_words: usize,
    /// Chunks produced (1 in direct mode).
    pub chunks_processed: usize,
    pub successful_summaries: usize,
    pub note_path: PathBuf,
    pub debug_path: Option<PathBuf>,
    pub final_content: String,
    pub duration_ms: u64,
}

/// A document that produced no note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub source: String,
    pub error: String,
}

/// Roll-up for one category folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderReport {
    pub category: String,
    pub paper_type: PaperType,
    pub pdfs_found: usize,
    pub processed: Vec<DocumentReport>,
    pub failed: Vec<DocumentFailure>,
}

/// PDF and note counts for one category, for `--show-folders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderOverview {
    pub category: String,
    pub input_dir: PathBuf,
    pub pdf_count: usize,
    pub output_dir: PathBuf,
    pub note_count: usize,
}
