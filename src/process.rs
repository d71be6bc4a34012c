//! Processing entry points: one PDF, one category folder, or all of them.
//!
//! [`NoteProcessor`] owns the configuration, the model client and the text
//! extractor. Everything runs strictly in sequence: one document, one chunk,
//! one model call at a time.
//!
//! ## Failure scopes
//!
//! A failed chunk is recorded and the document continues. A failed document
//! is logged, recorded in the [`FolderReport`] and the folder continues.
//! Nothing is written for a document unless its note is complete.

use crate::client::{Backend, ModelClient};
use crate::config::{NotesConfig, ProcessingMode};
use crate::error::NotesError;
use crate::output::{
    ChunkOutcome, DocumentFailure, DocumentReport, FinalNote, FolderOverview, FolderReport,
};
use crate::paper_type::PaperType;
use crate::pipeline::chunk::Chunker;
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use crate::pipeline::{input, postprocess, summarize, write};
use crate::progress::{NoopProgressCallback, NotesProgressCallback};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

static NOOP_PROGRESS: NoopProgressCallback = NoopProgressCallback;

/// Turns category folders of PDFs into markdown notes.
pub struct NoteProcessor<C, E = PdfiumExtractor> {
    config: NotesConfig,
    client: C,
    extractor: E,
    chunker: Chunker,
}

impl NoteProcessor<Backend, PdfiumExtractor> {
    /// Build the client selected by `config` and the pdfium extractor.
    pub fn from_config(config: NotesConfig) -> Result<Self, NotesError> {
        let client = Backend::from_config(&config)?;
        Ok(Self::new(config, client, PdfiumExtractor::new()))
    }
}

impl<C: ModelClient, E: TextExtractor> NoteProcessor<C, E> {
    pub fn new(config: NotesConfig, client: C, extractor: E) -> Self {
        let chunker = Chunker::new(config.chunking);
        Self {
            config,
            client,
            extractor,
            chunker,
        }
    }

    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn progress(&self) -> &dyn NotesProgressCallback {
        match self.config.progress_callback {
            Some(ref cb) => cb.as_ref(),
            None => &NOOP_PROGRESS,
        }
    }

    /// Probe the model server once. Failure here should stop the run.
    pub async fn test_connection(&self) -> Result<(), NotesError> {
        let endpoint = self.client.endpoint();
        info!("Testing connection to {}", endpoint);
        self.client
            .test_connection()
            .await
            .map_err(|e| NotesError::ModelUnreachable {
                endpoint,
                detail: e.to_string(),
            })
    }

    /// Process one PDF in the configured [`ProcessingMode`].
    ///
    /// Emits `on_document_start` and then `on_document_complete` or
    /// `on_document_failed`.
    pub async fn process_pdf(
        &self,
        pdf: &Path,
        category: &str,
        output_dir: &Path,
    ) -> Result<DocumentReport, NotesError> {
        let file_name = input::file_name_of(pdf);
        let progress = self.progress();
        progress.on_document_start(&file_name);

        let result = match self.config.mode {
            ProcessingMode::Chunked => self.process_pdf_chunked(pdf, category, output_dir).await,
            ProcessingMode::Direct => self.process_pdf_direct(pdf, category, output_dir).await,
        };

        match &result {
            Ok(report) => progress.on_document_complete(
                &file_name,
                report.successful_summaries,
                report.chunks_processed,
            ),
            Err(e) => progress.on_document_failed(&file_name, &e.to_string()),
        }
        result
    }

    /// Extract, chunk, summarise each chunk, synthesise, write.
    ///
    /// Writes `<stem>_chunked.md` and, when enabled, `<stem>_chunks_debug.txt`
    /// into `output_dir`.
    ///
    /// # Errors
    /// Extraction failures, [`NotesError::AllChunksFailed`] when no chunk
    /// produced a summary, [`NotesError::SynthesisFailed`] and write errors.
    /// No file is written in any of these cases.
    pub async fn process_pdf_chunked(
        &self,
        pdf: &Path,
        category: &str,
        output_dir: &Path,
    ) -> Result<DocumentReport, NotesError> {
        let start = Instant::now();
        let paper_type = PaperType::from_category(category);
        let title = input::title_of(pdf);
        let source = input::file_name_of(pdf);
        let progress = self.progress();
        info!("Processing [{}]: {}", category, source);

        let text = self.extractor.extract(pdf).await?;
        let total_words = text.split_whitespace().count();
        info!("Extracted {} words of text", total_words);

        let chunks = self.chunker.split_into_chunks(&text);
        if chunks.is_empty() {
            return Err(NotesError::EmptyDocument { title });
        }
        let total = chunks.len();
        info!("Split into {} chunks", total);
        progress.on_chunking_complete(total_words, total);

        let mut outcomes = Vec::with_capacity(total);
        for (i, chunk) in chunks.into_iter().enumerate() {
            progress.on_chunk_start(i + 1, total, &chunk.header);
            debug!("Summarising chunk {}/{}: {}", i + 1, total, chunk.header);

            let summary =
                summarize::summarize_chunk(&self.client, &chunk, paper_type, &self.config).await;
            match &summary {
                Ok(s) => progress.on_chunk_complete(i + 1, total, s.len()),
                Err(e) => {
                    warn!("Failed to summarise chunk {} of {}: {}", i + 1, source, e);
                    progress.on_chunk_error(i + 1, total, &e.to_string());
                }
            }
            outcomes.push(ChunkOutcome { chunk, summary });
        }

        let summaries: Vec<String> = outcomes
            .iter()
            .filter_map(|o| o.summary().map(str::to_string))
            .collect();
        if summaries.is_empty() {
            let first_error = outcomes
                .iter()
                .find_map(|o| o.summary.as_ref().err())
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(NotesError::AllChunksFailed {
                title,
                total,
                first_error,
            });
        }
        info!("Summarised {}/{} chunks", summaries.len(), total);

        progress.on_synthesis_start(summaries.len());
        let content = summarize::synthesize(&self.client, &summaries, paper_type, &title).await?;
        let content = postprocess::clean_note(&content);

        let note = FinalNote {
            title: title.clone(),
            source: source.clone(),
            processed_at: write::timestamp_now(),
            paper_type,
            content,
        };
        let note_path = write::chunked_note_path(output_dir, &title);
        let rendered = write::render_note(&note);

        // Debug file first: the note only lands once everything else has.
        let debug_path = if self.config.write_debug {
            let path = write::debug_path(output_dir, &title);
            write::write_atomic(&path, &write::render_debug(&source, total_words, &outcomes))
                .await?;
            Some(path)
        } else {
            None
        };

        if let Err(e) = write::write_atomic(&note_path, &rendered).await {
            if let Some(ref path) = debug_path {
                let _ = tokio::fs::remove_file(path).await;
            }
            return Err(e);
        }
        info!("Chunked notes saved to: {}", note_path.display());

        Ok(DocumentReport {
            title,
            source,
            mode: ProcessingMode::Chunked,
            total_words,
            chunks_processed: total,
            successful_summaries: summaries.len(),
            note_path,
            debug_path,
            final_content: note.content,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Send the whole text in one prompt built from the paper type's
    /// analysis template. Writes `<stem>.md`.
    pub async fn process_pdf_direct(
        &self,
        pdf: &Path,
        category: &str,
        output_dir: &Path,
    ) -> Result<DocumentReport, NotesError> {
        let start = Instant::now();
        let paper_type = PaperType::from_category(category);
        let title = input::title_of(pdf);
        let source = input::file_name_of(pdf);
        info!("Processing [{}]: {} (direct)", category, source);

        let text = self.extractor.extract(pdf).await?;
        let total_words = text.split_whitespace().count();
        info!("Extracted {} characters of text", text.chars().count());

        let content = summarize::analyze_direct(&self.client, &text, paper_type, &title).await?;
        let content = postprocess::clean_note(&content);

        let note = FinalNote {
            title: title.clone(),
            source: source.clone(),
            processed_at: write::timestamp_now(),
            paper_type,
            content,
        };
        let note_path = write::direct_note_path(output_dir, &title);
        write::write_atomic(&note_path, &write::render_note(&note)).await?;
        info!("Notes saved to: {}", note_path.display());

        Ok(DocumentReport {
            title,
            source,
            mode: ProcessingMode::Direct,
            total_words,
            chunks_processed: 1,
            successful_summaries: 1,
            note_path,
            debug_path: None,
            final_content: note.content,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Process every PDF in `<input_root>/<category>`.
    ///
    /// Both category folders are created if missing. A failing document is
    /// logged and recorded; it never stops the folder.
    ///
    /// # Errors
    /// Only when a folder cannot be created or listed.
    pub async fn process_folder_type(&self, category: &str) -> Result<FolderReport, NotesError> {
        let input_dir = self.config.input_dir(category);
        let output_dir = self.config.output_dir(category);
        input::ensure_dir(&input_dir)?;
        input::ensure_dir(&output_dir)?;

        let pdfs = input::list_pdfs(&input_dir)?;
        self.progress().on_folder_start(category, pdfs.len());

        let mut report = FolderReport {
            category: category.to_string(),
            paper_type: PaperType::from_category(category),
            pdfs_found: pdfs.len(),
            ..Default::default()
        };

        if pdfs.is_empty() {
            info!("No PDF files found in {}", input_dir.display());
            return Ok(report);
        }
        info!("Found {} PDF files in {} folder", pdfs.len(), category);

        for pdf in &pdfs {
            match self.process_pdf(pdf, category, &output_dir).await {
                Ok(doc) => {
                    info!(
                        "Processed {} with {}/{} chunks",
                        doc.source, doc.successful_summaries, doc.chunks_processed
                    );
                    report.processed.push(doc);
                }
                Err(e) => {
                    let source = input::file_name_of(pdf);
                    warn!("Error processing {}: {}", source, e);
                    report.failed.push(DocumentFailure {
                        source,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Run [`process_folder_type`](Self::process_folder_type) for each
    /// category in order.
    pub async fn process_all_folders(
        &self,
        categories: &[String],
    ) -> Result<Vec<FolderReport>, NotesError> {
        let mut reports = Vec::with_capacity(categories.len());
        for category in categories {
            info!("Processing {} papers", category.to_uppercase());
            reports.push(self.process_folder_type(category).await?);
        }
        Ok(reports)
    }

    /// PDF and note counts per category. Reads only; creates nothing.
    pub fn folder_overview(
        &self,
        categories: &[String],
    ) -> Result<Vec<FolderOverview>, NotesError> {
        categories
            .iter()
            .map(|category| {
                let input_dir = self.config.input_dir(category);
                let output_dir = self.config.output_dir(category);
                Ok(FolderOverview {
                    category: category.clone(),
                    pdf_count: input::list_pdfs(&input_dir)?.len(),
                    note_count: input::list_notes(&output_dir)?.len(),
                    input_dir: absolute(input_dir),
                    output_dir: absolute(output_dir),
                })
            })
            .collect()
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
