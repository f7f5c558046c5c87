//! Gemini streaming decoder
//!
//! `streamGenerateContent` answers with one JSON array whose elements arrive
//! over time, with no line framing to rely on. Objects are cut out of the byte
//! stream by [`JsonObjectScanner`] and parsed one at a time.

use serde::Deserialize;

use super::errors::GeminiErrorBody;
use crate::error::{NormalizedError, normalize_vendor_signal};
use crate::providers::sample;
use crate::streaming::{DecodeEvent, FrameDecoder, JsonObjectScanner};

/// Gemini stream response structure
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
    /// Set on thought summaries of thinking models.
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Finish reasons that end a turn normally.
fn is_normal_finish(reason: &str) -> bool {
    ["STOP", "MAX_TOKENS", "LENGTH", "FINISH_REASON_UNSPECIFIED"]
        .iter()
        .any(|ok| reason.eq_ignore_ascii_case(ok))
}

/// Decoder for the Gemini streamed JSON array.
#[derive(Debug, Default)]
pub struct GeminiStreamDecoder {
    scanner: JsonObjectScanner,
    finished: bool,
}

impl GeminiStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_object(&mut self, raw: &[u8], out: &mut Vec<DecodeEvent>) {
        let response: GeminiStreamResponse = match serde_json::from_slice(raw) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    provider = "google",
                    error = %e,
                    sample = %sample(&String::from_utf8_lossy(raw)),
                    "skipping malformed stream object"
                );
                return;
            }
        };

        if let Some(error) = response.error {
            let status = error.code;
            let error = normalize_vendor_signal(status, &error.into_signal());
            self.finish_with(DecodeEvent::Failed(error), out);
            return;
        }

        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            let error = NormalizedError::content_blocked(format!(
                "Gemini blocked the prompt ({reason})"
            ));
            self.finish_with(DecodeEvent::Failed(error), out);
            return;
        }

        let Some(candidate) = response.candidates.into_iter().next() else {
            return;
        };
        if let Some(reason) = candidate.finish_reason.as_deref() {
            if !is_normal_finish(reason) {
                let error = NormalizedError::content_blocked(format!(
                    "Gemini stopped the response (finish reason: {reason})"
                ));
                self.finish_with(DecodeEvent::Failed(error), out);
                return;
            }
        }
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        for part in parts {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(text) = part.text {
                out.push(DecodeEvent::Delta(text));
            }
        }
    }

    fn finish_with(&mut self, event: DecodeEvent, out: &mut Vec<DecodeEvent>) {
        self.finished = true;
        out.push(event);
    }
}

impl FrameDecoder for GeminiStreamDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        for object in self.scanner.push(chunk) {
            self.handle_object(&object, &mut out);
            if self.finished {
                break;
            }
        }
        out
    }

    fn finish(&mut self) -> Vec<DecodeEvent> {
        if !self.finished && self.scanner.has_partial_object() {
            tracing::debug!(
                provider = "google",
                buffered = self.scanner.buffered().len(),
                "stream ended inside an object; dropping partial data"
            );
        }
        self.finished = true;
        Vec::new()
    }
}
