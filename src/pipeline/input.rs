//! Input discovery: category folders and the PDFs inside them.
//!
//! PDFs are validated by their `%PDF` magic bytes before pdfium sees them, so
//! a stray `.pdf` that is really an HTML error page fails with a readable
//! message instead of a pdfium parse error.

use crate::error::NotesError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create `dir` (and parents) if it does not exist.
pub fn ensure_dir(dir: &Path) -> Result<(), NotesError> {
    std::fs::create_dir_all(dir).map_err(|e| NotesError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// `*.pdf` files directly inside `dir`, sorted by file name.
///
/// The extension match ignores ASCII case. A missing directory yields an
/// empty list.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, NotesError> {
    list_with_extension(dir, "pdf")
}

/// `*.md` files directly inside `dir`.
pub fn list_notes(dir: &Path) -> Result<Vec<PathBuf>, NotesError> {
    list_with_extension(dir, "md")
}

fn list_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, NotesError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let read_err = |e| NotesError::FolderReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!("{} *.{} files in {}", files.len(), ext, dir.display());
    Ok(files)
}

/// Check the file exists, is readable and starts with `%PDF`.
pub fn validate_pdf(path: &Path) -> Result<(), NotesError> {
    if !path.exists() {
        return Err(NotesError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(NotesError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(NotesError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(NotesError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Note title: the file stem.
pub fn title_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Display name of the source file.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
