//! Native Ollama chat client.
//!
//! `POST /api/chat` with `"stream": true` answers with newline-delimited JSON
//! frames:
//!
//! ```text
//! {"message":{"role":"assistant","content":"The "},"done":false}
//! {"message":{"role":"assistant","content":"paper"},"done":false}
//! {"done":true,"total_duration":...}
//! ```
//!
//! [`StreamAccumulator`] turns the raw byte stream into one string. It is
//! independent of the HTTP layer so framing edge cases (frames split across
//! network reads, CRLF endings, a final frame without newline) are unit
//! tested without a server.

use crate::client::ModelClient;
use crate::config::NotesConfig;
use crate::error::{ModelError, NotesError};
use crate::prompts::CONNECTION_PROBE_PROMPT;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for an Ollama server's streaming chat endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client for `base_url` (e.g. `http://localhost:11434`).
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, NotesError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| NotesError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &NotesConfig) -> Result<Self, NotesError> {
        Self::new(
            config.ollama_url.clone(),
            config.model.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .http
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let mut acc = StreamAccumulator::default();
        let mut stream = response.bytes_stream();
        while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| ModelError::Transport(e.to_string()))?;
            if acc.push(&bytes)? {
                break;
            }
        }
        let text = acc.finish()?;
        debug!("Ollama response: {} chars", text.len());
        Ok(text)
    }

    async fn test_connection(&self) -> Result<(), ModelError> {
        self.generate(CONNECTION_PROBE_PROMPT).await.map(|_| ())
    }

    fn endpoint(&self) -> String {
        self.chat_url()
    }
}

// ── NDJSON accumulation ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct StreamFrame {
    #[serde(default)]
    message: Option<FrameMessage>,
    /// `/api/generate`-style frames carry text here instead.
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FrameMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Collects streamed frames into the final response text.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    pending: Vec<u8>,
    text: String,
    done: bool,
}

impl StreamAccumulator {
    /// Feed raw bytes. Returns `true` once a `"done": true` frame was seen;
    /// anything after it is ignored.
    pub fn push(&mut self, bytes: &[u8]) -> Result<bool, ModelError> {
        if self.done {
            return Ok(true);
        }
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.feed_line(&line)?;
            if self.done {
                self.pending.clear();
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Flush a trailing frame that had no newline and return the trimmed text.
    pub fn finish(mut self) -> Result<String, ModelError> {
        if !self.done && !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.feed_line(&rest)?;
        }
        Ok(self.text.trim().to_string())
    }

    fn feed_line(&mut self, line: &[u8]) -> Result<(), ModelError> {
        let line = line.trim_ascii();
        if line.is_empty() {
            return Ok(());
        }
        let frame: StreamFrame =
            serde_json::from_slice(line).map_err(|e| ModelError::MalformedFrame {
                detail: format!("{e}: {}", String::from_utf8_lossy(line)),
            })?;

        if let Some(err) = frame.error {
            return Err(ModelError::Server(err));
        }
        match (frame.message, frame.response) {
            (Some(FrameMessage { content: Some(c) }), _) => self.text.push_str(&c),
            (_, Some(r)) => self.text.push_str(&r),
            _ => {}
        }
        if frame.done {
            self.done = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_chat_frames_until_done() {
        let mut acc = StreamAccumulator::default();
        let body = concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\" The \"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"paper \"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"argues\"},\"done\":true}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"IGNORED\"},\"done\":false}\n",
        );
        assert!(acc.push(body.as_bytes()).unwrap());
        assert!(acc.is_done());
        assert_eq!(acc.finish().unwrap(), "The paper argues");
    }

    #[test]
    fn frames_split_across_reads() {
        let mut acc = StreamAccumulator::default();
        assert!(!acc.push(b"{\"message\":{\"content\":\"Hel").unwrap());
        assert!(!acc.push(b"lo\"},\"done\":false}\r\n{\"resp").unwrap());
        assert!(acc.push(b"onse\":\" world\",\"done\":true}\n").unwrap());
        assert_eq!(acc.finish().unwrap(), "Hello world");
    }

    #[test]
    fn trailing_frame_without_newline() {
        let mut acc = StreamAccumulator::default();
        acc.push(b"\n\n{\"response\":\"abc\",\"done\":true}").unwrap();
        assert!(!acc.is_done());
        assert_eq!(acc.finish().unwrap(), "abc");
    }

    #[test]
    fn stream_ending_without_done_keeps_text() {
        let mut acc = StreamAccumulator::default();
        acc.push(b"{\"message\":{\"content\":\"partial\"}}\n").unwrap();
        assert_eq!(acc.finish().unwrap(), "partial");
    }

    #[test]
    fn malformed_frame_is_an_error() {
        let mut acc = StreamAccumulator::default();
        let err = acc.push(b"not json\n").unwrap_err();
        assert!(matches!(err, ModelError::MalformedFrame { .. }));
    }

    #[test]
    fn error_frame_is_an_error() {
        let mut acc = StreamAccumulator::default();
        let err = acc
            .push(b"{\"error\":\"model 'llama9' not found\"}\n")
            .unwrap_err();
        match err {
            ModelError::Server(msg) => assert!(msg.contains("llama9")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn request_body_shape() {
        let request = ChatRequest {
            model: "llama2:latest",
            messages: [ChatMessage {
                role: "user",
                content: "Hello",
            }],
            stream: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama2:latest",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": true
            })
        );
    }
}
