//! Server adapters: encode a completion stream for the HTTP route layer
//!
//! Every element becomes one server-sent-event frame:
//!
//! ```text
//! data: {"content":"He"}
//!
//! data: {"error":"Incorrect API key provided"}
//!
//! data: [DONE]
//! ```
//!
//! The `[DONE]` sentinel frame is always the last frame, after an error frame too.
//!
//! - **Framework-agnostic helpers**: [`sse_frame`], [`sse_frames`], [`text_stream`]
//! - **Axum integration**: `axum::to_sse_response()` (requires `server-adapters` feature)

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::error::NormalizedError;
use crate::streaming::CompletionStream;
use crate::types::StreamElement;

#[cfg(feature = "server-adapters")]
pub mod axum;

/// Payload of the closing frame.
pub const DONE_PAYLOAD: &str = "[DONE]";

/// Options for SSE encoding.
#[derive(Debug, Clone, Default)]
pub struct SseOptions {
    /// Replace error messages with [`masked_error_message`](Self::masked_error_message).
    pub mask_errors: bool,
    /// Defaults to "internal error".
    pub masked_error_message: Option<String>,
}

impl SseOptions {
    /// Error messages are forwarded verbatim.
    pub fn development() -> Self {
        Self::default()
    }

    /// Error messages are masked.
    pub fn production() -> Self {
        Self {
            mask_errors: true,
            masked_error_message: None,
        }
    }

    fn error_message(&self, error: &NormalizedError) -> String {
        if self.mask_errors {
            self.masked_error_message
                .clone()
                .unwrap_or_else(|| "internal error".to_string())
        } else {
            error.message.clone()
        }
    }
}

/// JSON payload for `element`, or `None` for the terminal `Done` marker.
pub fn frame_payload(element: &StreamElement, opts: &SseOptions) -> Option<String> {
    match element {
        StreamElement::Delta(delta) => Some(serde_json::json!({ "content": delta.text }).to_string()),
        StreamElement::Error(error) => {
            Some(serde_json::json!({ "error": opts.error_message(error) }).to_string())
        }
        StreamElement::Done => None,
    }
}

/// Render one element as a complete SSE frame; `Done` renders as the sentinel frame.
pub fn sse_frame(element: &StreamElement, opts: &SseOptions) -> String {
    let payload = frame_payload(element, opts).unwrap_or_else(|| DONE_PAYLOAD.to_string());
    format!("data: {payload}\n\n")
}

/// Data payloads of every frame, ending with [`DONE_PAYLOAD`].
pub fn sse_payloads(
    mut stream: CompletionStream,
    opts: SseOptions,
) -> Pin<Box<dyn Stream<Item = String> + Send>> {
    let s = async_stream::stream! {
        while let Some(element) = stream.next().await {
            if let Some(payload) = frame_payload(&element, &opts) {
                yield payload;
            }
            if element.is_terminal() {
                break;
            }
        }
        yield DONE_PAYLOAD.to_string();
    };
    Box::pin(s)
}

/// Convert a completion stream into SSE text frames, ready to be written to the response.
pub fn sse_frames(
    stream: CompletionStream,
    opts: SseOptions,
) -> Pin<Box<dyn Stream<Item = String> + Send>> {
    Box::pin(sse_payloads(stream, opts).map(|payload| format!("data: {payload}\n\n")))
}

/// Convert a completion stream into a plain text stream of deltas.
pub fn text_stream(
    mut stream: CompletionStream,
) -> Pin<Box<dyn Stream<Item = Result<String, NormalizedError>> + Send>> {
    let s = async_stream::try_stream! {
        while let Some(element) = stream.next().await {
            match element {
                StreamElement::Delta(delta) => yield delta.text,
                StreamElement::Error(error) => Err::<(), _>(error)?,
                StreamElement::Done => break,
            }
        }
    };
    Box::pin(s)
}
