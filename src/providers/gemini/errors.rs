//! Google error envelope
//!
//! `{"error":{"code":429,"message":"...","status":"RESOURCE_EXHAUSTED","details":[...]}}`,
//! sometimes wrapped in a one-element array when the failure happens on a
//! streaming endpoint.

use serde::Deserialize;

use crate::error::{VendorErrorSignal, parse_retry_delay};

const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<GeminiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiErrorDetail {
    #[serde(default, rename = "@type")]
    pub type_url: Option<String>,
    #[serde(default, rename = "retryDelay")]
    pub retry_delay: Option<String>,
    /// `ErrorInfo.reason`, e.g. `API_KEY_INVALID`.
    #[serde(default)]
    pub reason: Option<String>,
}

impl GeminiErrorBody {
    /// Seconds from the first `RetryInfo` detail, if any.
    fn retry_delay(&self) -> Option<u64> {
        self.details
            .iter()
            .filter(|d| d.type_url.as_deref() == Some(RETRY_INFO_TYPE))
            .find_map(|d| d.retry_delay.as_deref().and_then(parse_retry_delay))
    }

    pub(crate) fn into_signal(self) -> VendorErrorSignal {
        let retry_after_seconds = self.retry_delay();
        // Google reports a bad key as 400 INVALID_ARGUMENT; only the reason tells.
        let error_type = self
            .details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
            .then(|| "invalid_api_key".to_string());
        VendorErrorSignal {
            error_type,
            status: self.status,
            message: self.message,
            retry_after_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

// Derived structs also deserialize from a sequence, so the array form must be tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Wrapped(Vec<GeminiErrorEnvelope>),
    Single(GeminiErrorEnvelope),
}

/// Parse a Google error body, bare or array-wrapped; `None` if it is neither.
pub(crate) fn parse_error_envelope(body: &str) -> Option<VendorErrorSignal> {
    let envelope = match serde_json::from_str::<ErrorPayload>(body).ok()? {
        ErrorPayload::Single(envelope) => envelope,
        ErrorPayload::Wrapped(list) => list.into_iter().next()?,
    };
    Some(envelope.error.into_signal())
}
