//! Wire adapters
//!
//! One [`WireAdapter`] per vendor protocol. An adapter knows how to turn a
//! normalized [`StreamRequest`] into the vendor's HTTP call, how to decode the
//! vendor's streaming body, and how to read the vendor's error envelope. The
//! orchestrator picks an adapter through the registry; it never branches on
//! provider ids itself.

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::SecretString;

use crate::error::NormalizedError;
use crate::streaming::{ByteStream, DeltaStream};
use crate::transport::OutboundRequest;
use crate::types::StreamRequest;

/// Capability set implemented by every vendor protocol.
pub trait WireAdapter: Send + Sync + std::fmt::Debug {
    /// Registry id of the provider this adapter speaks for.
    fn provider_id(&self) -> &'static str;

    /// Describe the streaming chat-completion call for `api_id`.
    fn build_outbound_request(
        &self,
        api_id: &str,
        request: &StreamRequest,
    ) -> Result<OutboundRequest, NormalizedError>;

    /// Decode a successful streaming body into content fragments.
    fn decode(&self, body: ByteStream) -> DeltaStream;

    /// Classify a non-success response from this vendor.
    fn normalize_error(&self, status: u16, headers: &HeaderMap, body: &str) -> NormalizedError;

    /// Describe the cheapest call that proves `credential` is accepted.
    fn build_probe_request(
        &self,
        api_id: &str,
        credential: &SecretString,
    ) -> Result<OutboundRequest, NormalizedError>;
}

/// Header value holding a credential; marked sensitive so `Debug` output hides it.
pub(crate) fn credential_header(value: &str) -> Result<HeaderValue, NormalizedError> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        NormalizedError::auth_failure("The API key contains characters that are not allowed")
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Shorten a raw record for log output.
pub(crate) fn sample(raw: &str) -> String {
    raw.chars().take(120).collect()
}
