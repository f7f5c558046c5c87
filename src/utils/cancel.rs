//! Cancellation utilities
//!
//! First-class cancellation handles for completion streams. Dropping a stream
//! already releases the upstream connection; a [`CancelHandle`] lets another
//! task do the same without owning the stream.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::streaming::CompletionStream;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. A wrapped stream stops at its next poll, even while
    /// it is waiting on the network, and drops the upstream body.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Wrap `stream` so that it ends as soon as `handle` is cancelled.
///
/// Cancellation ends the stream without a terminal element; the caller asked
/// for it and needs no notice.
pub fn with_cancel_handle(mut stream: CompletionStream, handle: CancelHandle) -> CompletionStream {
    let s = async_stream::stream! {
        loop {
            tokio::select! {
                biased;
                _ = handle.cancelled() => {
                    tracing::debug!("completion stream cancelled by caller");
                    break;
                }
                item = stream.next() => match item {
                    Some(item) => yield item,
                    None => break,
                },
            }
        }
    };
    Box::pin(s)
}

/// Make a completion stream cancellable and return its cancel handle.
pub fn make_cancellable_stream(stream: CompletionStream) -> (CompletionStream, CancelHandle) {
    let handle = CancelHandle::new();
    (with_cancel_handle(stream, handle.clone()), handle)
}
