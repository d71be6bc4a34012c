//! Structure-aware chunking of extracted paper text.
//!
//! Local models have a bounded context window, so a 30-page paper cannot be
//! summarised in one call. The chunker cuts the text into pieces of at most
//! `max_chunk_size` words, preferring cuts at detected section headers and
//! falling back to blank-line paragraphs when no structure is found.
//!
//! ## Phases
//!
//! ```text
//! text ──▶ classify lines ──▶ fold into sections ──▶ (fallback: paragraphs)
//!                                   │
//!                                   └──▶ size enforcement ──▶ Vec<Chunk>
//! ```
//!
//! Header detection is a heuristic; classification ([`classify_lines`]) is
//! kept apart from accumulation ([`fold_sections`]) so the heuristic can be
//! tuned without touching the section bookkeeping.
//!
//! Sections longer than the limit are split into overlapping windows. The
//! overlap repeats the tail of one window at the head of the next so a
//! sentence cut at the boundary is still seen whole by one of the two calls.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::NotesError;

/// Label of the section holding whatever follows the last detected header.
pub const FINAL_SECTION_LABEL: &str = "Final Section";

/// Minimum words a section must hold before a header may close it.
const MIN_SECTION_WORDS: usize = 50;

/// Header lines are short.
const MAX_HEADER_WORDS: usize = 8;
const MAX_HEADER_CHARS: usize = 100;

/// Size limits for the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum words per chunk. Default: 800.
    pub max_chunk_size: usize,
    /// Words repeated between consecutive windows of an oversized section.
    /// Default: 100.
    pub overlap_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 800,
            overlap_size: 100,
        }
    }
}

impl ChunkingConfig {
    /// Validated constructor.
    ///
    /// An overlap at or above the chunk size is accepted: the window cursor
    /// then advances one word at a time.
    pub fn new(max_chunk_size: usize, overlap_size: usize) -> Result<Self, NotesError> {
        if max_chunk_size == 0 {
            return Err(NotesError::InvalidConfig(
                "max_chunk_size must be ≥ 1".into(),
            ));
        }
        Ok(Self {
            max_chunk_size,
            overlap_size,
        })
    }

    /// Words the cursor moves between two windows, never less than one.
    pub fn stride(&self) -> usize {
        self.max_chunk_size.saturating_sub(self.overlap_size).max(1)
    }
}

/// One unit of work for the summariser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the document's chunk sequence, starting at 0.
    pub id: usize,
    /// Section label, suffixed with ` (Part k)` for split sections.
    pub header: String,
    pub content: String,
    /// `content.split_whitespace().count()`, cached.
    pub word_count: usize,
}

impl Chunk {
    fn new(id: usize, header: String, content: String) -> Self {
        let word_count = content.split_whitespace().count();
        Self {
            id,
            header,
            content,
            word_count,
        }
    }
}

/// A header label plus its body, alive only while chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: String,
    pub content: String,
}

/// A non-blank, trimmed line and how the heuristic sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedLine<'a> {
    Header(&'a str),
    Body(&'a str),
}

impl<'a> ClassifiedLine<'a> {
    fn text(&self) -> &'a str {
        match self {
            ClassifiedLine::Header(s) | ClassifiedLine::Body(s) => s,
        }
    }
}

/// Splits text into chunks according to a [`ChunkingConfig`].
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split `text` into an ordered chunk sequence.
    ///
    /// Returns an empty vector for empty or whitespace-only input; callers
    /// must treat that as a failed document, not an empty note.
    pub fn split_into_chunks(&self, text: &str) -> Vec<Chunk> {
        let mut sections = fold_sections(classify_lines(text));
        if sections.len() <= 1 {
            sections = paragraph_sections(text);
        }

        let mut chunks = Vec::new();
        for section in sections {
            let words = section.content.split_whitespace().count();
            if words <= self.config.max_chunk_size {
                chunks.push(Chunk::new(chunks.len(), section.header, section.content));
            } else {
                self.split_long_section(&section, &mut chunks);
            }
        }
        chunks
    }

    /// Overlapping windows over an oversized section, appended to `out`.
    fn split_long_section(&self, section: &Section, out: &mut Vec<Chunk>) {
        let words: Vec<&str> = section.content.split_whitespace().collect();
        let max = self.config.max_chunk_size;
        let stride = self.config.stride();

        let mut start = 0;
        let mut part = 1;
        while start < words.len() {
            let end = (start + max).min(words.len());
            out.push(Chunk::new(
                out.len(),
                format!("{} (Part {})", section.header, part),
                words[start..end].join(" "),
            ));
            if end >= words.len() {
                break;
            }
            start += stride;
            part += 1;
        }
    }
}

/// Whether a trimmed, non-blank line looks like a section header.
pub fn is_potential_header(line: &str) -> bool {
    line.split_whitespace().count() <= MAX_HEADER_WORDS
        && line.chars().count() < MAX_HEADER_CHARS
        && !line.ends_with('.')
        && !line.ends_with(',')
        && line.to_uppercase() != line
        && line.chars().any(char::is_uppercase)
}

/// Phase 1: lazily classify every non-blank line.
pub fn classify_lines(text: &str) -> impl Iterator<Item = ClassifiedLine<'_>> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if is_potential_header(line) {
                ClassifiedLine::Header(line)
            } else {
                ClassifiedLine::Body(line)
            }
        })
}

/// Phase 2: fold classified lines into sections.
///
/// A header closes the running section only once that section holds more
/// than 50 words; the header line then becomes the *closed* section's label
/// and is not kept as content. Everything left at the end is labelled
/// [`FINAL_SECTION_LABEL`].
pub fn fold_sections<'a>(lines: impl IntoIterator<Item = ClassifiedLine<'a>>) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0;

    for line in lines {
        match line {
            ClassifiedLine::Header(header) if current_words > MIN_SECTION_WORDS => {
                sections.push(Section {
                    header: header.to_string(),
                    content: current.join(" "),
                });
                current.clear();
                current_words = 0;
            }
            other => {
                let text = other.text();
                current_words += text.split_whitespace().count();
                current.push(text);
            }
        }
    }

    if !current.is_empty() {
        sections.push(Section {
            header: FINAL_SECTION_LABEL.to_string(),
            content: current.join(" "),
        });
    }
    sections
}

static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Fallback: blank-line paragraphs labelled `Section 1`, `Section 2`, …
///
/// Numbering counts every paragraph, including dropped empty ones, so labels
/// stay tied to the paragraph's position in the source.
pub fn paragraph_sections(text: &str) -> Vec<Section> {
    RE_PARAGRAPH_BREAK
        .split(text)
        .enumerate()
        .filter_map(|(i, p)| {
            let p = p.trim();
            (!p.is_empty()).then(|| Section {
                header: format!("Section {}", i + 1),
                content: p.to_string(),
            })
        })
        .collect()
}
