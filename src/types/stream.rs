//! Stream element types handed back to the caller

use serde::{Deserialize, Serialize};

use crate::error::NormalizedError;

/// One incremental fragment of assistant text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDelta {
    pub text: String,
}

impl ContentDelta {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<String> for ContentDelta {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Element of the normalized completion stream.
///
/// A well-formed stream is zero or more `Delta`s followed by exactly one
/// terminal element: `Error` or `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamElement {
    Delta(ContentDelta),
    Error(NormalizedError),
    Done,
}

impl StreamElement {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Done)
    }

    pub fn as_delta(&self) -> Option<&str> {
        match self {
            Self::Delta(delta) => Some(delta.as_str()),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&NormalizedError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}
