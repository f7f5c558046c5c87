//! Axum-specific server adapters
//!
//! ```rust,ignore
//! use axum::response::sse::{Event, Sse};
//! use chatbridge::server_adapters::{SseOptions, axum::to_sse_response};
//!
//! async fn chat(State(bridge): State<StreamBridge>, Json(req): Json<ChatBody>)
//!     -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>>
//! {
//!     to_sse_response(bridge.stream_completion(req.into()), SseOptions::production())
//! }
//! ```

use std::convert::Infallible;

use axum::response::sse::{Event, Sse};
use futures::{Stream, StreamExt};

use super::{SseOptions, sse_payloads};
use crate::streaming::CompletionStream;

/// Convert a completion stream into an Axum SSE response with the same frames as
/// [`super::sse_frames`].
pub fn to_sse_response(
    stream: CompletionStream,
    opts: SseOptions,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    Sse::new(sse_payloads(stream, opts).map(|payload| Ok(Event::default().data(payload))))
}
