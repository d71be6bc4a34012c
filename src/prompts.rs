//! Prompt and note templates.
//!
//! Centralising every prompt here keeps the wording in one place and lets
//! unit tests inspect prompts without a running model.
//!
//! Templates use `{name}` placeholders filled by [`fill_template`]. Filling is
//! a single left-to-right pass: substituted values are never scanned again, so
//! a paper that literally contains `{title}` cannot corrupt its own note.

use crate::paper_type::PaperType;
use crate::pipeline::chunk::Chunk;

// ── Chunked mode ─────────────────────────────────────────────────────────

/// Build the per-chunk summarisation prompt.
pub fn chunk_summary_prompt(chunk: &Chunk, paper_type: PaperType) -> String {
    format!(
        "Summarize this section from an academic {kind}. Be specific and focus on key information.

Section: {header}

Content:
{content}

Provide a concise summary (3-5 sentences) focusing on:
- Main points or findings
- Key concepts or methods
- Important data or conclusions

Summary:",
        kind = paper_type.description(),
        header = chunk.header,
        content = chunk.content,
    )
}

/// Join summaries as `Section i: <summary>` blocks, 1-based.
pub fn section_summaries(summaries: &[String]) -> String {
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Section {}: {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the second-stage prompt that merges chunk summaries into one note.
pub fn synthesis_prompt(summaries: &[String], paper_type: PaperType, title: &str) -> String {
    format!(
        "You have summaries from different sections of an academic {kind} titled \"{title}\".
Create a comprehensive structured note by synthesizing these section summaries.

Section Summaries:
{combined}

Based on these summaries, create structured notes following this format:

## Summary
- Overall summary of the paper (2-3 sentences)

## Key Findings
- Main findings across all sections (bullet points)

## Main Concepts
- Important concepts, theories, or methods mentioned

## Methodology (if mentioned)
- Research methods or approaches used

## Implications
- Practical or theoretical implications
- Future research directions if mentioned

## Tags
- Relevant tags using #tag format

Generate the structured note:",
        kind = paper_type.description(),
        combined = section_summaries(summaries),
    )
}

/// Prompt sent once at startup to check the server and model respond.
pub const CONNECTION_PROBE_PROMPT: &str = "Hello";

// ── Direct mode ──────────────────────────────────────────────────────────

/// Build the whole-document prompt for direct mode.
pub fn direct_prompt(text: &str, paper_type: PaperType) -> String {
    fill_template(paper_type.prompt_template(), &[("text", text)])
}

pub const EDITORIAL_PROMPT: &str = r#"You are analyzing an editorial or opinion paper. Create structured notes for Obsidian.

Create notes with these sections:

## Summary
- Brief overview of the editorial's main argument or position

## Key Arguments
- Main points the author makes
- Supporting evidence or examples

## Editorial Position
- What stance does the author take?
- What recommendations are made?

## Context
- What issue or debate is being addressed?
- Background information provided

## Tags
- Add relevant tags using #tag format

Text to analyze:
{text}

Generate the structured notes:"#;

pub const THEORY_PROMPT: &str = r#"You are analyzing a theoretical paper. Create structured notes for Obsidian.

Create notes with these sections:

## Summary
- Brief overview of the theoretical contribution

## Theory/Framework
- Main theoretical framework presented
- Key concepts and definitions

## Propositions/Hypotheses
- Theoretical propositions made
- Relationships between concepts

## Literature Integration
- How this builds on existing theory
- Key citations and connections

## Implications
- Theoretical implications
- Future research directions

## Tags
- Add relevant tags using #tag format

Text to analyze:
{text}

Generate the structured notes:"#;

pub const METHOD_PROMPT: &str = r#"You are analyzing a methodology paper. Create structured notes for Obsidian.

Create notes with these sections:

## Summary
- Brief overview of the methodological contribution

## Method/Approach
- New method or approach presented
- Technical details and procedures

## Validation
- How the method was tested or validated
- Performance metrics or results

## Advantages/Limitations
- Benefits of this approach
- Limitations or constraints

## Applications
- Where this method can be used
- Example applications shown

## Tags
- Add relevant tags using #tag format

Text to analyze:
{text}

Generate the structured notes:"#;

pub const TOPIC_PROMPT: &str = r#"You are analyzing a research paper on a specific topic. Create structured notes for Obsidian.

Create notes with these sections:

## Summary
- Brief overview of the research

## Research Question/Problem
- What problem is being addressed?
- Research questions or objectives

## Key Findings
- Main results or findings
- Important data or statistics

## Methods Used
- Research approach and methods
- Data sources

## Conclusions
- Main conclusions drawn
- Practical implications

## Future Work
- Suggested future research
- Open questions

## Tags
- Add relevant tags using #tag format

Text to analyze:
{text}

Generate the structured notes:"#;

// ── Note headers ─────────────────────────────────────────────────────────

pub const EDITORIAL_NOTE: &str =
    "# {title}\n\n**Source:** {source}\n**Type:** Editorial\n**Date Processed:** {date}\n\n{content}";
pub const THEORY_NOTE: &str =
    "# {title}\n\n**Source:** {source}\n**Type:** Theory Paper\n**Date Processed:** {date}\n\n{content}";
pub const METHOD_NOTE: &str =
    "# {title}\n\n**Source:** {source}\n**Type:** Methodology Paper\n**Date Processed:** {date}\n\n{content}";
pub const TOPIC_NOTE: &str =
    "# {title}\n\n**Source:** {source}\n**Type:** Research Paper\n**Date Processed:** {date}\n\n{content}";

/// Replace `{key}` placeholders in one pass.
///
/// Unknown placeholders and stray braces are copied through unchanged.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
