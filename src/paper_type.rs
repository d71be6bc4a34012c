//! Paper categories and their template sets.
//!
//! Each input folder is named after a category. The category picks the
//! analysis prompt used in direct mode and the note header written in both
//! modes. Unknown categories are accepted and processed with the
//! [`PaperType::Topic`] templates; the folder name itself is left untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prompts;

/// Closed set of paper categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperType {
    Editorial,
    Theory,
    Method,
    /// Research paper on a specific topic. Also the fallback.
    #[default]
    Topic,
}

impl PaperType {
    /// All categories, in the order folders are processed.
    pub const ALL: [PaperType; 4] = [
        PaperType::Editorial,
        PaperType::Theory,
        PaperType::Method,
        PaperType::Topic,
    ];

    /// Map a folder/category name to its template set.
    ///
    /// Matching is exact on the lowercase names; anything else falls back to
    /// [`PaperType::Topic`].
    pub fn from_category(category: &str) -> Self {
        match category {
            "editorial" => PaperType::Editorial,
            "theory" => PaperType::Theory,
            "method" => PaperType::Method,
            _ => PaperType::Topic,
        }
    }

    /// Folder name under the input and output roots.
    pub fn folder_name(self) -> &'static str {
        match self {
            PaperType::Editorial => "editorial",
            PaperType::Theory => "theory",
            PaperType::Method => "method",
            PaperType::Topic => "topic",
        }
    }

    /// Value of the `**Type:**` line in a rendered note.
    pub fn label(self) -> &'static str {
        match self {
            PaperType::Editorial => "Editorial",
            PaperType::Theory => "Theory Paper",
            PaperType::Method => "Methodology Paper",
            PaperType::Topic => "Research Paper",
        }
    }

    /// How prompts refer to the document.
    pub fn description(self) -> &'static str {
        match self {
            PaperType::Editorial => "editorial or opinion paper",
            PaperType::Theory => "theoretical paper",
            PaperType::Method => "methodology paper",
            PaperType::Topic => "research paper",
        }
    }

    /// Single-call analysis prompt with a `{text}` placeholder.
    pub fn prompt_template(self) -> &'static str {
        match self {
            PaperType::Editorial => prompts::EDITORIAL_PROMPT,
            PaperType::Theory => prompts::THEORY_PROMPT,
            PaperType::Method => prompts::METHOD_PROMPT,
            PaperType::Topic => prompts::TOPIC_PROMPT,
        }
    }

    /// Note template with `{title}`, `{source}`, `{date}` and `{content}`.
    pub fn output_template(self) -> &'static str {
        match self {
            PaperType::Editorial => prompts::EDITORIAL_NOTE,
            PaperType::Theory => prompts::THEORY_NOTE,
            PaperType::Method => prompts::METHOD_NOTE,
            PaperType::Topic => prompts::TOPIC_NOTE,
        }
    }
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}
