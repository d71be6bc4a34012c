//! Pipeline stages for PDF-to-note processing.
//!
//! Each submodule implements exactly one step, so each is tested on its own
//! and the orchestrator in [`crate::process`] only wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ chunk ──▶ summarize ──▶ postprocess ──▶ write
//! (folders)  (pdfium)   (words)   (model)       (cleanup)       (files)
//! ```
//!
//! 1. [`input`]   — list category folders and validate PDF magic bytes
//! 2. [`extract`] — page text via pdfium, inside `spawn_blocking`
//! 3. [`chunk`]   — header detection, section folding, overlapping windows
//! 4. [`summarize`] — per-chunk summaries with retry, then one synthesis call;
//!    the only stage with network I/O
//! 5. [`postprocess`] — strip fences and normalise whitespace in model output
//! 6. [`write`]   — note header, debug artifact, atomic file writes

pub mod chunk;
pub mod extract;
pub mod input;
pub mod postprocess;
pub mod summarize;
pub mod write;
