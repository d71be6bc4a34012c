//! Output stage: render the note header and write files atomically.
//!
//! Every file is written to a `.tmp` sibling first and renamed into place,
//! so an interrupted run never leaves a half-written note behind.

use crate::error::NotesError;
use crate::output::{ChunkOutcome, FinalNote};
use crate::prompts::fill_template;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp format for the `**Date Processed:**` line.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DEBUG_RULE_WIDTH: usize = 80;

/// Current local time in [`DATE_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// Fill the paper type's note template.
pub fn render_note(note: &FinalNote) -> String {
    fill_template(
        note.paper_type.output_template(),
        &[
            ("title", &note.title),
            ("source", &note.source),
            ("date", &note.processed_at),
            ("content", &note.content),
        ],
    )
}

/// `<stem>_chunked.md`
pub fn chunked_note_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{title}_chunked.md"))
}

/// `<stem>_chunks_debug.txt`
pub fn debug_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{title}_chunks_debug.txt"))
}

/// `<stem>.md`
pub fn direct_note_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{title}.md"))
}

/// Per-chunk record of what was sent and what came back.
///
/// Each chunk reports its own summary, or `FAILED`, by position.
pub fn render_debug(source: &str, total_words: usize, outcomes: &[ChunkOutcome]) -> String {
    let rule = "-".repeat(DEBUG_RULE_WIDTH);
    let mut out = String::new();
    let _ = write!(
        out,
        "Processing Summary for {source}\nTotal words: {total_words}\nNumber of chunks: {}\n\n",
        outcomes.len()
    );
    for (i, outcome) in outcomes.iter().enumerate() {
        let _ = write!(
            out,
            "CHUNK {}: {}\nWords: {}\nSummary: {}\n{rule}\n\n",
            i + 1,
            outcome.chunk.header,
            outcome.chunk.word_count,
            outcome.summary().unwrap_or("FAILED"),
        );
    }
    out
}

/// Write `contents` to `path` via a temp file and rename.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), NotesError> {
    let write_err = |e| NotesError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;
    use crate::paper_type::PaperType;
    use crate::pipeline::chunk::Chunk;

    fn outcome(id: usize, header: &str, summary: Result<&str, ()>) -> ChunkOutcome {
        ChunkOutcome {
            chunk: Chunk {
                id,
                header: header.into(),
                content: "text".into(),
                word_count: 10 * id,
            },
            summary: summary.map(str::to_string).map_err(|_| ChunkError::SummaryFailed {
                chunk: id,
                header: header.into(),
                retries: 0,
                detail: "transport error: reset".into(),
            }),
        }
    }

    #[test]
    fn note_header_layout() {
        let note = FinalNote {
            title: "Paper1".into(),
            source: "Paper1.pdf".into(),
            processed_at: "2024-05-01 09:30:00".into(),
            paper_type: PaperType::Method,
            content: "## Summary\nBody\n".into(),
        };
        assert_eq!(
            render_note(&note),
            "# Paper1\n\n**Source:** Paper1.pdf\n**Type:** Methodology Paper\n\
             **Date Processed:** 2024-05-01 09:30:00\n\n## Summary\nBody\n"
        );
    }

    #[test]
    fn debug_records_failures_in_place() {
        let outcomes = vec![
            outcome(1, "Intro", Ok("First.")),
            outcome(2, "Methods", Err(())),
            outcome(3, "Results", Ok("Third.")),
        ];
        let text = render_debug("Paper1.pdf", 60, &outcomes);
        let rule = "-".repeat(80);
        let expected = format!(
            "Processing Summary for Paper1.pdf\nTotal words: 60\nNumber of chunks: 3\n\n\
             CHUNK 1: Intro\nWords: 10\nSummary: First.\n{rule}\n\n\
             CHUNK 2: Methods\nWords: 20\nSummary: FAILED\n{rule}\n\n\
             CHUNK 3: Results\nWords: 30\nSummary: Third.\n{rule}\n\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn output_file_names() {
        let dir = Path::new("notes_output/topic");
        assert_eq!(
            chunked_note_path(dir, "Smith 2021"),
            dir.join("Smith 2021_chunked.md")
        );
        assert_eq!(debug_path(dir, "Smith 2021"), dir.join("Smith 2021_chunks_debug.txt"));
        assert_eq!(direct_note_path(dir, "Smith 2021"), dir.join("Smith 2021.md"));
    }

    #[tokio::test]
    async fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("note.md");
        write_atomic(&path, "# Note\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Note\n");
        assert!(!dir.path().join("nested").join("note.md.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::create_dir_all(path.join("blocker")).unwrap();
        let err = write_atomic(&path, "# Note\n").await.unwrap_err();
        assert!(matches!(err, NotesError::OutputWriteFailed { .. }));
        assert!(!dir.path().join("note.md.tmp").exists());
    }

    #[test]
    fn timestamp_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, DATE_FORMAT).is_ok());
    }
}
