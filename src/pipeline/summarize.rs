//! Model interaction: per-chunk summaries and the final synthesis.
//!
//! All prompt text lives in [`crate::prompts`]; this module owns the calling
//! convention and failure mapping only.
//!
//! ## Retry Strategy
//!
//! Chunk summaries are retried with exponential backoff
//! (`retry_backoff_ms * 2^(attempt-1)`) when `max_retries > 0`. The default
//! of zero keeps one attempt per chunk. An empty response counts as a failed
//! attempt. Synthesis and direct-mode calls are issued once.

use crate::client::ModelClient;
use crate::config::NotesConfig;
use crate::error::{ChunkError, ModelError, NotesError};
use crate::paper_type::PaperType;
use crate::pipeline::chunk::Chunk;
use crate::prompts::{chunk_summary_prompt, direct_prompt, synthesis_prompt};
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Summarise one chunk. Failures are returned, never raised past the chunk.
pub async fn summarize_chunk<C: ModelClient>(
    client: &C,
    chunk: &Chunk,
    paper_type: PaperType,
    config: &NotesConfig,
) -> Result<String, ChunkError> {
    let start = Instant::now();
    let prompt = chunk_summary_prompt(chunk, paper_type);
    let mut last_err: Option<ModelError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Chunk {}: retry {}/{} after {}ms",
                chunk.id, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match non_empty(client.generate(&prompt).await) {
            Ok(summary) => {
                debug!(
                    "Chunk {}: {} chars in {:?}",
                    chunk.id,
                    summary.len(),
                    start.elapsed()
                );
                return Ok(summary);
            }
            Err(e) => {
                warn!("Chunk {}: attempt {} failed: {}", chunk.id, attempt + 1, e);
                last_err = Some(e);
            }
        }
    }

    Err(ChunkError::SummaryFailed {
        chunk: chunk.id,
        header: chunk.header.clone(),
        retries: config.max_retries,
        detail: last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Combine the successful chunk summaries into the final note body.
pub async fn synthesize<C: ModelClient>(
    client: &C,
    summaries: &[String],
    paper_type: PaperType,
    title: &str,
) -> Result<String, NotesError> {
    let prompt = synthesis_prompt(summaries, paper_type, title);
    debug!(
        "Synthesising '{}' from {} summaries ({} prompt chars)",
        title,
        summaries.len(),
        prompt.len()
    );
    non_empty(client.generate(&prompt).await).map_err(|source| NotesError::SynthesisFailed {
        title: title.to_string(),
        source,
    })
}

/// Single-call analysis of the whole document text (direct mode).
pub async fn analyze_direct<C: ModelClient>(
    client: &C,
    text: &str,
    paper_type: PaperType,
    title: &str,
) -> Result<String, NotesError> {
    let prompt = direct_prompt(text, paper_type);
    non_empty(client.generate(&prompt).await).map_err(|source| NotesError::SynthesisFailed {
        title: title.to_string(),
        source,
    })
}

/// Delay before retry `attempt` (1-based), saturating instead of overflowing.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

fn non_empty(result: Result<String, ModelError>) -> Result<String, ModelError> {
    match result {
        Ok(text) if text.trim().is_empty() => Err(ModelError::EmptyResponse),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records every prompt it receives.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, ModelError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, ModelError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelClient for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ModelError::Transport("script exhausted".into())))
        }

        async fn test_connection(&self) -> Result<(), ModelError> {
            Ok(())
        }

        fn endpoint(&self) -> String {
            "scripted".into()
        }
    }

    fn chunk() -> Chunk {
        Chunk {
            id: 2,
            header: "Methods".into(),
            content: "We sampled 40 participants.".into(),
            word_count: 4,
        }
    }

    fn config(max_retries: u32) -> NotesConfig {
        NotesConfig::builder()
            .max_retries(max_retries)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn chunk_prompt_carries_header_and_content() {
        let client = Scripted::new(vec![Ok("A short summary.".into())]);
        let summary = summarize_chunk(&client, &chunk(), PaperType::Method, &config(0))
            .await
            .unwrap();
        assert_eq!(summary, "A short summary.");
        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Methods"));
        assert!(prompts[0].contains("We sampled 40 participants."));
    }

    #[tokio::test]
    async fn empty_reply_is_a_chunk_failure() {
        let client = Scripted::new(vec![Ok("   ".into())]);
        let err = summarize_chunk(&client, &chunk(), PaperType::Topic, &config(0))
            .await
            .unwrap_err();
        let ChunkError::SummaryFailed { chunk, detail, .. } = err;
        assert_eq!(chunk, 2);
        assert!(detail.contains("empty"));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let client = Scripted::new(vec![
            Err(ModelError::Transport("reset".into())),
            Ok("Recovered.".into()),
        ]);
        let summary = tokio_test::assert_ok!(
            summarize_chunk(&client, &chunk(), PaperType::Topic, &config(2)).await
        );
        assert_eq!(summary, "Recovered.");
        assert_eq!(client.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn single_attempt_by_default() {
        let client = Scripted::new(vec![
            Err(ModelError::Status {
                status: 500,
                body: "boom".into(),
            }),
            Ok("never used".into()),
        ]);
        tokio_test::assert_err!(
            summarize_chunk(&client, &chunk(), PaperType::Topic, &config(0)).await
        );
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        assert_eq!(backoff_ms(500, 1), 500);
        assert_eq!(backoff_ms(500, 3), 2000);
        assert_eq!(backoff_ms(u64::MAX, 2), u64::MAX);
        assert_eq!(backoff_ms(1, 80), u64::MAX);
    }

    #[tokio::test]
    async fn synthesis_numbers_sections() {
        let client = Scripted::new(vec![Ok("## Summary\nDone".into())]);
        let summaries = vec!["A".to_string(), "B".to_string()];
        let note = synthesize(&client, &summaries, PaperType::Topic, "Paper1")
            .await
            .unwrap();
        assert_eq!(note, "## Summary\nDone");
        let prompt = client.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("Section 1: A"));
        assert!(prompt.contains("Section 2: B"));
        assert!(prompt.contains("Paper1"));
    }

    #[tokio::test]
    async fn synthesis_failure_names_the_title() {
        let client = Scripted::new(vec![Err(ModelError::Server("out of memory".into()))]);
        let err = synthesize(&client, &["A".to_string()], PaperType::Theory, "Paper1")
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::SynthesisFailed { ref title, .. } if title == "Paper1"));
    }
}
