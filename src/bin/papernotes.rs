//! CLI binary for papernotes.
//!
//! A thin shim over the library crate that maps CLI flags to `NotesConfig`,
//! probes the model server and prints a per-folder summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use papernotes::{
    FolderOverview, FolderReport, NoteProcessor, NotesConfig, NotesProgressCallback,
    ProcessingMode, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn truncate(msg: &str, max: usize) -> String {
    if msg.chars().count() > max {
        let head: String = msg.chars().take(max - 1).collect();
        format!("{head}\u{2026}")
    } else {
        msg.to_string()
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar per document, counting chunks, with a log
/// line for every finished document.
struct CliProgressCallback {
    bar: ProgressBar,
    doc_started: std::sync::Mutex<Option<Instant>>,
    chunk_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(Self::spinner_style());
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            doc_started: std::sync::Mutex::new(None),
            chunk_errors: AtomicUsize::new(0),
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS)
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS)
    }

    fn elapsed_secs(&self) -> f64 {
        self.doc_started
            .lock()
            .ok()
            .and_then(|g| g.map(|t| t.elapsed().as_secs_f64()))
            .unwrap_or(0.0)
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl NotesProgressCallback for CliProgressCallback {
    fn on_folder_start(&self, category: &str, pdf_count: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{} — {pdf_count} PDFs", category.to_uppercase()))
        ));
    }

    fn on_document_start(&self, file_name: &str) {
        if let Ok(mut g) = self.doc_started.lock() {
            *g = Some(Instant::now());
        }
        self.chunk_errors.store(0, Ordering::SeqCst);
        self.bar.set_style(Self::spinner_style());
        self.bar.set_prefix(truncate(file_name, 40));
        self.bar.set_message("extracting text…");
    }

    fn on_chunking_complete(&self, total_words: usize, total_chunks: usize) {
        self.bar.set_length(total_chunks as u64);
        self.bar.set_position(0);
        self.bar.set_style(Self::bar_style());
        self.bar.set_message(dim(&format!("{total_words} words")));
        self.bar.reset_eta();
    }

    fn on_chunk_start(&self, _chunk: usize, _total: usize, header: &str) {
        self.bar.set_message(truncate(header, 50));
    }

    fn on_chunk_complete(&self, _chunk: usize, _total: usize, _summary_len: usize) {
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk: usize, total: usize, error: &str) {
        self.chunk_errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "    {} chunk {chunk:>3}/{total:<3}  {}",
            red("✗"),
            red(&truncate(error, 80)),
        ));
        self.bar.inc(1);
    }

    fn on_synthesis_start(&self, summaries: usize) {
        self.bar
            .set_message(format!("synthesising {summaries} summaries…"));
    }

    fn on_document_complete(&self, file_name: &str, successful: usize, total_chunks: usize) {
        let marker = if successful == total_chunks {
            green("✓")
        } else {
            cyan("⚠")
        };
        self.bar.println(format!(
            "  {marker} {file_name}  {}  {}",
            dim(&format!("{successful}/{total_chunks} chunks")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
    }

    fn on_document_failed(&self, file_name: &str, error: &str) {
        self.bar.println(format!(
            "  {} {file_name}  {}  {}",
            red("✗"),
            red(&truncate(error, 80)),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process every category folder under ./pdfs_input
  papernotes

  # Only theory and method papers, with a bigger model
  papernotes --type theory --type method --model llama3.1:8b

  # One prompt per paper instead of chunk summaries
  papernotes --mode direct

  # Show what is waiting to be processed
  papernotes --show-folders

  # Use a hosted provider instead of Ollama
  papernotes --provider openai --model gpt-4.1-mini

FOLDER LAYOUT:
  pdfs_input/
    editorial/  theory/  method/  topic/     ← drop PDFs here
  notes_output/
    editorial/  theory/  method/  topic/     ← notes appear here

  Chunked mode writes <name>_chunked.md and <name>_chunks_debug.txt.
  Direct mode writes <name>.md.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise ./ or the system library)
  OPENAI_API_KEY          API key when --provider openai
  ANTHROPIC_API_KEY       API key when --provider anthropic
  RUST_LOG                Override log filter (e.g. papernotes=debug)
"#;

/// Turn folders of academic PDFs into structured Markdown notes.
#[derive(Parser, Debug)]
#[command(
    name = "papernotes",
    version,
    about = "Turn folders of academic PDFs into structured Markdown notes with a local LLM",
    long_about = "Extracts the text of every PDF under <input-root>/<type>/, summarises it \
section by section with a language model (Ollama by default) and writes one structured \
Markdown note per paper under <output-root>/<type>/.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder holding one sub-folder of PDFs per paper type.
    #[arg(long, env = "PAPERNOTES_INPUT_ROOT", default_value = "pdfs_input")]
    input_root: PathBuf,

    /// Folder receiving one sub-folder of notes per paper type.
    #[arg(long, env = "PAPERNOTES_OUTPUT_ROOT", default_value = "notes_output")]
    output_root: PathBuf,

    /// Paper type folder to process (repeatable). Default: all four.
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// chunked: summarise sections then synthesise. direct: one prompt per paper.
    #[arg(long, env = "PAPERNOTES_MODE", value_enum, default_value = "chunked")]
    mode: ModeArg,

    /// Model name passed to the server.
    #[arg(long, env = "PAPERNOTES_MODEL", default_value = papernotes::config::DEFAULT_MODEL)]
    model: String,

    /// Base URL of the Ollama server.
    #[arg(
        long,
        env = "PAPERNOTES_OLLAMA_URL",
        default_value = papernotes::config::DEFAULT_OLLAMA_URL
    )]
    ollama_url: String,

    /// Use an edgequake-llm provider (openai, anthropic, gemini, …) instead of Ollama.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Maximum words per chunk.
    #[arg(long, env = "PAPERNOTES_MAX_CHUNK_SIZE", default_value_t = 800)]
    max_chunk_size: usize,

    /// Words shared between consecutive windows of a long section.
    #[arg(long, env = "PAPERNOTES_OVERLAP", default_value_t = 100)]
    overlap: usize,

    /// Retries per chunk summary on failure.
    #[arg(long, env = "PAPERNOTES_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-request timeout in seconds. Default: wait indefinitely.
    #[arg(long, env = "PAPERNOTES_TIMEOUT")]
    timeout: Option<u64>,

    /// Do not write <name>_chunks_debug.txt.
    #[arg(long, env = "PAPERNOTES_NO_DEBUG")]
    no_debug: bool,

    /// Print PDF and note counts per folder, then exit.
    #[arg(long)]
    show_folders: bool,

    /// Print the run report (or folder overview) as JSON on stdout.
    #[arg(long, env = "PAPERNOTES_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PAPERNOTES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAPERNOTES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAPERNOTES_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Chunked,
    Direct,
}

impl From<ModeArg> for ProcessingMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Chunked => ProcessingMode::Chunked,
            ModeArg::Direct => ProcessingMode::Direct,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.show_folders;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let categories = if cli.types.is_empty() {
        NotesConfig::default_categories()
    } else {
        cli.types.clone()
    };

    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        progress.clone().map(|cb| cb as ProgressCallback),
    )?;
    let processor = NoteProcessor::from_config(config).context("Failed to set up model client")?;

    // ── Folder overview ──────────────────────────────────────────────────
    if cli.show_folders {
        let overview = processor
            .folder_overview(&categories)
            .context("Failed to read folders")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&overview).context("Failed to serialise overview")?
            );
        } else {
            print_overview(&overview);
        }
        return Ok(());
    }

    // ── Connection probe ─────────────────────────────────────────────────
    if let Err(e) = processor.test_connection().await {
        if let Some(ref cb) = progress {
            cb.finish();
        }
        eprintln!("{} {}", red("✘"), e);
        anyhow::bail!("Cannot connect to the model server. Make sure it is running.");
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let started = Instant::now();
    let result = processor.process_all_folders(&categories).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let reports = result.context("Processing failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&reports, started.elapsed());
    }

    Ok(())
}

/// Map CLI args to `NotesConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<NotesConfig> {
    let mut builder = NotesConfig::builder()
        .input_root(&cli.input_root)
        .output_root(&cli.output_root)
        .ollama_url(&cli.ollama_url)
        .model(&cli.model)
        .mode(cli.mode.into())
        .max_chunk_size(cli.max_chunk_size)
        .overlap_size(cli.overlap)
        .max_retries(cli.max_retries)
        .write_debug(!cli.no_debug);

    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_overview(overview: &[FolderOverview]) {
    if let Some(first) = overview.first() {
        let root = first.input_dir.parent().unwrap_or(&first.input_dir);
        println!("Input: {}", root.display());
    }
    for o in overview {
        println!("  ├── {}/ ({} PDFs)", o.category, o.pdf_count);
    }
    if let Some(first) = overview.first() {
        let root = first.output_dir.parent().unwrap_or(&first.output_dir);
        println!("\nOutput: {}", root.display());
    }
    for o in overview {
        println!("  ├── {}/ ({} notes)", o.category, o.note_count);
    }
}

fn print_summary(reports: &[FolderReport], elapsed: Duration) {
    let processed: usize = reports.iter().map(|r| r.processed.len()).sum();
    let failed: usize = reports.iter().map(|r| r.failed.len()).sum();

    for r in reports {
        eprintln!(
            "{:<10} {} found  {} written  {} failed",
            bold(&r.category),
            r.pdfs_found,
            green(&r.processed.len().to_string()),
            if r.failed.is_empty() {
                dim("0")
            } else {
                red(&r.failed.len().to_string())
            },
        );
        for f in &r.failed {
            eprintln!("    {} {}: {}", red("✗"), f.source, truncate(&f.error, 100));
        }
    }
    eprintln!(
        "{}  {} notes written, {} failed  {:.1}s",
        if failed == 0 { green("✔") } else { cyan("⚠") },
        processed,
        failed,
        elapsed.as_secs_f64(),
    );
}
