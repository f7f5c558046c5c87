//! Utility modules

pub mod cancel;

pub use cancel::{CancelHandle, make_cancellable_stream, with_cancel_handle};
