//! Type Conversions for bridge errors
//!
//! This module contains From trait implementations for converting
//! common error types into the bridge taxonomy.

use super::types::{ErrorKind, NormalizedError, TransportError};

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_builder() {
            Self::Request(err.to_string())
        } else {
            Self::Body(err.to_string())
        }
    }
}

impl From<TransportError> for NormalizedError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => {
                NormalizedError::timeout("The request timed out before the response completed")
            }
            other => NormalizedError::new(ErrorKind::Transport, other.to_string()),
        }
    }
}

impl From<serde_json::Error> for NormalizedError {
    fn from(err: serde_json::Error) -> Self {
        NormalizedError::unknown(format!("Failed to encode request body: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_timeout_kind() {
        let err: NormalizedError = TransportError::Timeout.into();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[test]
    fn other_transport_errors_keep_their_message() {
        let err: NormalizedError = TransportError::Connect("refused".into()).into();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.message, "connection failed: refused");
    }
}
