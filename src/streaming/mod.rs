//! Streaming primitives
//!
//! Wire adapters turn a raw response body into content fragments in two layers:
//! a synchronous [`FrameDecoder`] that is fed byte chunks of arbitrary size and
//! split, and the async driver [`decode_with`] that pulls chunks from the
//! transport and forwards whatever the decoder produced.
//!
//! Decoders never suspend mid-record: a chunk is fully processed before the
//! driver awaits the next one, so a record is either wholly consumed or stays
//! buffered for the next chunk.

pub mod json_scanner;
pub mod lines;

pub use json_scanner::JsonObjectScanner;
pub use lines::{LineFramer, sse_data};

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use tokio::time::Instant;

use crate::error::{NormalizedError, TransportError};
use crate::types::{ContentDelta, StreamElement};

/// Raw response body as delivered by the transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Content fragments decoded by an adapter; an `Err` item is terminal.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<ContentDelta, NormalizedError>> + Send>>;

/// The normalized stream handed to the caller.
pub type CompletionStream = Pin<Box<dyn Stream<Item = StreamElement> + Send>>;

/// Outcome of decoding one logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Delta(String),
    /// Vendor-level failure; ends the stream.
    Failed(NormalizedError),
    /// In-band end-of-stream signal; ends the stream without waiting for EOF.
    Finished,
}

/// Incremental, chunk-boundary agnostic decoder for one vendor wire format.
///
/// Implementations own their buffer exclusively; one decoder serves exactly one response.
pub trait FrameDecoder: Send {
    /// Feed the next chunk and return every event completed by it, in order.
    fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent>;

    /// Flush whatever is still buffered once the transport reached EOF.
    fn finish(&mut self) -> Vec<DecodeEvent>;
}

enum Flow {
    Continue,
    Stop,
}

fn route_events(
    events: Vec<DecodeEvent>,
    out: &mut Vec<Result<ContentDelta, NormalizedError>>,
) -> Flow {
    for event in events {
        match event {
            DecodeEvent::Delta(text) if text.is_empty() => {}
            DecodeEvent::Delta(text) => out.push(Ok(ContentDelta::new(text))),
            DecodeEvent::Failed(error) => {
                out.push(Err(error));
                return Flow::Stop;
            }
            DecodeEvent::Finished => return Flow::Stop,
        }
    }
    Flow::Continue
}

/// Drive `decoder` over `body`, yielding fragments as soon as a chunk completes them.
///
/// The body is dropped as soon as the decoder signals the end of the stream or a
/// failure, or when the returned stream itself is dropped.
pub fn decode_with<D>(mut body: ByteStream, mut decoder: D) -> DeltaStream
where
    D: FrameDecoder + 'static,
{
    let stream = async_stream::stream! {
        let mut ready = Vec::new();
        loop {
            let flow = match body.next().await {
                Some(Ok(chunk)) => route_events(decoder.feed(&chunk), &mut ready),
                Some(Err(error)) => {
                    ready.push(Err(NormalizedError::from(error)));
                    Flow::Stop
                }
                None => {
                    route_events(decoder.finish(), &mut ready);
                    Flow::Stop
                }
            };
            for item in ready.drain(..) {
                yield item;
            }
            if matches!(flow, Flow::Stop) {
                break;
            }
        }
    };
    Box::pin(stream)
}

/// Fail the body with [`TransportError::Timeout`] once `deadline` passes.
pub fn with_deadline(mut body: ByteStream, deadline: Instant) -> ByteStream {
    let stream = async_stream::stream! {
        loop {
            match tokio::time::timeout_at(deadline, body.next()).await {
                Ok(Some(item)) => yield item,
                Ok(None) => break,
                Err(_) => {
                    yield Err(TransportError::Timeout);
                    break;
                }
            }
        }
    };
    Box::pin(stream)
}
