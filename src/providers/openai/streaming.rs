//! OpenAI streaming decoder
//!
//! One `data: {json}` record per line. Lines that are not `data:` lines or do
//! not parse are skipped; `data: [DONE]` ends the stream immediately.

use serde::Deserialize;

use super::OpenAiErrorBody;
use crate::error::{NormalizedError, normalize_vendor_signal};
use crate::providers::sample;
use crate::streaming::{DecodeEvent, FrameDecoder, LineFramer, sse_data};

/// End-of-stream sentinel payload.
pub const DONE_SENTINEL: &str = "[DONE]";

/// OpenAI stream chunk structure
#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    #[serde(default)]
    error: Option<OpenAiErrorBody>,
}

/// OpenAI stream choice
#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    #[serde(default)]
    delta: Option<OpenAiStreamDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// OpenAI stream delta
#[derive(Debug, Deserialize)]
struct OpenAiStreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Line-based decoder for OpenAI chat-completion streams.
#[derive(Debug, Default)]
pub struct OpenAiStreamDecoder {
    lines: LineFramer,
    finished: bool,
}

impl OpenAiStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_line(&mut self, line: &str, out: &mut Vec<DecodeEvent>) {
        let Some(data) = sse_data(line) else {
            return;
        };
        if data.is_empty() {
            return;
        }
        if data == DONE_SENTINEL {
            self.finish_with(DecodeEvent::Finished, out);
            return;
        }

        let chunk: OpenAiStreamChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(provider = "openai", error = %e, sample = %sample(data), "skipping malformed stream record");
                return;
            }
        };

        if let Some(error) = chunk.error {
            let error = normalize_vendor_signal(None, &error.into_signal());
            self.finish_with(DecodeEvent::Failed(error), out);
            return;
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return;
        };
        if let Some(content) = choice.delta.and_then(|d| d.content) {
            if !content.is_empty() {
                out.push(DecodeEvent::Delta(content));
            }
        }
        if choice.finish_reason.as_deref() == Some("content_filter") {
            let error =
                NormalizedError::content_blocked("The response was blocked by OpenAI's content filter");
            self.finish_with(DecodeEvent::Failed(error), out);
        }
    }

    fn finish_with(&mut self, event: DecodeEvent, out: &mut Vec<DecodeEvent>) {
        self.finished = true;
        out.push(event);
    }
}

impl FrameDecoder for OpenAiStreamDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        for line in self.lines.push(chunk) {
            self.handle_line(&line, &mut out);
            if self.finished {
                break;
            }
        }
        out
    }

    fn finish(&mut self) -> Vec<DecodeEvent> {
        let mut out = Vec::new();
        if !self.finished {
            if let Some(line) = self.lines.take_remainder() {
                self.handle_line(&line, &mut out);
            }
        }
        self.finished = true;
        out
    }
}
