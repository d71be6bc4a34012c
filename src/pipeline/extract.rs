//! Plain-text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is synchronous and
//! keeps thread-local state. `tokio::task::spawn_blocking` moves the work onto
//! the blocking pool so the runtime's worker threads never stall on a large
//! document.
//!
//! Only the text layer is read. Scanned PDFs without one come back empty and
//! fail with [`NotesError::NoExtractableText`].

use crate::error::NotesError;
use crate::pipeline::input::validate_pdf;
use pdfium_render::prelude::*;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Turns a document into one plain-text string.
pub trait TextExtractor: Send + Sync {
    /// Page texts joined by a blank line, trimmed, never empty.
    fn extract(&self, path: &Path) -> impl Future<Output = Result<String, NotesError>> + Send;
}

/// Production extractor backed by pdfium.
///
/// Library resolution order: the explicit path given to
/// [`PdfiumExtractor::with_library`], `PDFIUM_LIB_PATH`, a pdfium library in
/// the working directory, then the system library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(path.into()),
        }
    }

    fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(ref p) = self.library {
            paths.push(p.clone());
        }
        if let Ok(p) = std::env::var("PDFIUM_LIB_PATH") {
            if !p.is_empty() {
                paths.push(PathBuf::from(p));
            }
        }
        paths.push(PathBuf::from(format!(
            "./{}pdfium{}",
            std::env::consts::DLL_PREFIX,
            std::env::consts::DLL_SUFFIX
        )));
        paths
    }

    fn bind(&self) -> Result<Pdfium, NotesError> {
        let mut last_err = None;
        for path in self.candidate_paths() {
            if !path.exists() {
                continue;
            }
            match Pdfium::bind_to_library(&path) {
                Ok(bindings) => {
                    debug!("Bound pdfium from {}", path.display());
                    return Ok(Pdfium::new(bindings));
                }
                Err(e) => last_err = Some(format!("{}: {}", path.display(), e)),
            }
        }
        Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| {
                NotesError::PdfiumBindingFailed(match last_err {
                    Some(prev) => format!("{prev}; system library: {e}"),
                    None => format!("system library: {e}"),
                })
            })
    }
}

impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, path: &Path) -> Result<String, NotesError> {
        validate_pdf(path)?;
        let extractor = self.clone();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || extractor.extract_blocking(&path))
            .await
            .map_err(|e| NotesError::Internal(format!("Extraction task panicked: {e}")))?
    }
}

impl PdfiumExtractor {
    fn extract_blocking(&self, path: &Path) -> Result<String, NotesError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| NotesError::ExtractionFailed {
                path: path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

        let mut pages = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| NotesError::ExtractionFailed {
                    path: path.to_path_buf(),
                    detail: format!("page {}: {e:?}", idx + 1),
                })?
                .all();
            pages.push(text);
        }
        info!("Read {} pages from {}", pages.len(), path.display());

        join_pages(pages).ok_or_else(|| NotesError::NoExtractableText {
            path: path.to_path_buf(),
        })
    }
}

/// Join page texts with a blank line, skipping empty pages.
///
/// pdfium ends lines with `\r\n`; they are normalised to `\n`. Returns
/// `None` when nothing but whitespace remains.
pub fn join_pages<I, S>(pages: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = pages
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| p.as_ref().replace("\r\n", "\n").replace('\r', "\n"))
        .collect::<Vec<_>>()
        .join("\n\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_joined_by_blank_line() {
        let text = join_pages(["Title\r\nAbstract", "", "Body text\r\n"]).unwrap();
        assert_eq!(text, "Title\nAbstract\n\nBody text");
    }

    #[test]
    fn whitespace_only_document_is_none() {
        assert!(join_pages(["", "  \n", "\t"]).is_none());
        assert!(join_pages(Vec::<String>::new()).is_none());
    }

    #[tokio::test]
    async fn non_pdf_is_rejected_before_pdfium() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake.pdf");
        std::fs::write(&fake, b"GIF89a").unwrap();
        let err = PdfiumExtractor::new().extract(&fake).await.unwrap_err();
        assert!(matches!(err, NotesError::NotAPdf { .. }));
    }
}
