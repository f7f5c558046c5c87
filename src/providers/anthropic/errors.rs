//! Anthropic error envelope
//!
//! `{"type":"error","error":{"type":"authentication_error","message":"..."}}`,
//! used both for non-2xx bodies and for in-band `error` stream events.

use serde::Deserialize;

use crate::error::VendorErrorSignal;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnthropicErrorBody {
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AnthropicErrorBody {
    pub(crate) fn into_signal(self) -> VendorErrorSignal {
        VendorErrorSignal {
            error_type: self.error_type,
            message: self.message,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorEnvelope {
    error: AnthropicErrorBody,
}

/// Parse an Anthropic error body; `None` if it is not an envelope.
pub(crate) fn parse_error_envelope(body: &str) -> Option<VendorErrorSignal> {
    serde_json::from_str::<AnthropicErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.into_signal())
}
