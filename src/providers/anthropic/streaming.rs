//! Anthropic streaming decoder
//!
//! Same `data:` line framing as OpenAI, but every payload carries a `type`
//! discriminator. Only `content_block_delta` events with a `text_delta` carry
//! text; `message_stop` ends the stream even if the transport stays open.

use serde::Deserialize;

use super::errors::AnthropicErrorBody;
use crate::error::{NormalizedError, normalize_vendor_signal};
use crate::providers::sample;
use crate::streaming::{DecodeEvent, FrameDecoder, LineFramer, sse_data};

/// Anthropic stream event structure
///
/// Only the fields the bridge consumes are modelled; serde ignores the rest
/// (`message`, `usage`, `index`, `content_block`).
#[derive(Debug, Deserialize)]
struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: Option<AnthropicDelta>,
    #[serde(default)]
    error: Option<AnthropicErrorBody>,
}

/// Delta payload of `content_block_delta` and `message_delta` events.
#[derive(Debug, Deserialize)]
struct AnthropicDelta {
    #[serde(default, rename = "type")]
    delta_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
}

/// Decoder for the Anthropic Messages event stream.
#[derive(Debug, Default)]
pub struct AnthropicStreamDecoder {
    lines: LineFramer,
    finished: bool,
}

impl AnthropicStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_line(&mut self, line: &str, out: &mut Vec<DecodeEvent>) {
        // `event:` lines duplicate the payload's `type` field and are ignored.
        let Some(data) = sse_data(line) else {
            return;
        };
        if data.is_empty() {
            return;
        }
        if data == "[DONE]" {
            self.finish_with(DecodeEvent::Finished, out);
            return;
        }

        let event: AnthropicStreamEvent = match serde_json::from_str(data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(provider = "anthropic", error = %e, sample = %sample(data), "skipping malformed stream record");
                return;
            }
        };

        match event.event_type.as_str() {
            "content_block_delta" => {
                if let Some(delta) = event.delta {
                    let is_text = delta.delta_type.as_deref().is_none_or(|t| t == "text_delta");
                    if let (true, Some(text)) = (is_text, delta.text) {
                        out.push(DecodeEvent::Delta(text));
                    }
                }
            }
            "message_delta" => {
                let stop_reason = event.delta.and_then(|d| d.stop_reason);
                if stop_reason.as_deref() == Some("refusal") {
                    let error = NormalizedError::content_blocked(
                        "Claude declined to continue this response",
                    );
                    self.finish_with(DecodeEvent::Failed(error), out);
                }
            }
            "message_stop" => self.finish_with(DecodeEvent::Finished, out),
            "error" => {
                let signal = event
                    .error
                    .map(AnthropicErrorBody::into_signal)
                    .unwrap_or_default();
                let error = normalize_vendor_signal(None, &signal);
                self.finish_with(DecodeEvent::Failed(error), out);
            }
            // message_start, content_block_start, content_block_stop, ping
            _ => {}
        }
    }

    fn finish_with(&mut self, event: DecodeEvent, out: &mut Vec<DecodeEvent>) {
        self.finished = true;
        out.push(event);
    }
}

impl FrameDecoder for AnthropicStreamDecoder {
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
