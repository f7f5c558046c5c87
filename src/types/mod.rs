//! Core request and stream element types

pub mod chat;
pub mod stream;

pub use chat::{ChatMessage, Role, StreamRequest};
pub use stream::{ContentDelta, StreamElement};
