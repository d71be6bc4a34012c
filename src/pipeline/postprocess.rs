//! Post-processing: deterministic cleanup of model-generated notes.
//!
//! Local models often wrap their answer in a ` ```markdown ` fence even when
//! asked not to, and streamed output picks up stray `\r` and trailing spaces.
//! These rules fix that without touching content.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the fence pattern only has to match
//! `\n`. The final-newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip an outer ` ```markdown ` / ` ``` ` fence
/// 3. Trim trailing whitespace per line
/// 4. Collapse runs of blank lines to a single blank line
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 6. Ensure the text ends with exactly one newline
pub fn clean_note(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_markdown_fences(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?[ \t]*\n(.*)\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse blank-line runs ─────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 6: Single final newline ─────────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        let raw = "```markdown\n## Summary\n- Point\n```\n";
        assert_eq!(clean_note(raw), "## Summary\n- Point\n");
    }

    #[test]
    fn strips_bare_fence_with_crlf() {
        let raw = "```\r\n## Tags\r\n#ml\r\n```";
        assert_eq!(clean_note(raw), "## Tags\n#ml\n");
    }

    #[test]
    fn inner_code_blocks_survive() {
        let raw = "## Methodology\n```python\nfit(x)\n```\n\n## Tags\n#code";
        assert_eq!(clean_note(raw), format!("{raw}\n"));
    }

    #[test]
    fn trailing_whitespace_and_blank_runs() {
        let raw = "## Summary   \nText.\t\n\n\n\n\n## Key Findings\n- A  \n\n\n";
        assert_eq!(clean_note(raw), "## Summary\nText.\n\n## Key Findings\n- A\n");
    }

    #[test]
    fn invisible_characters_removed() {
        assert_eq!(clean_note("\u{FEFF}Zero\u{200B}width"), "Zerowidth\n");
    }

    #[test]
    fn empty_input_is_single_newline() {
        assert_eq!(clean_note("   \n\n"), "\n");
    }
}
