//! Anthropic Messages protocol
//!
//! `POST {base}/messages` authenticated with `x-api-key`. System turns travel
//! in the top-level `system` field and `max_tokens` is mandatory.

mod errors;
pub mod streaming;

pub use streaming::AnthropicStreamDecoder;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{WireAdapter, credential_header};
use crate::config::BridgeConfig;
use crate::error::{NormalizedError, VendorErrorSignal, normalize_http_error};
use crate::streaming::{ByteStream, DeltaStream, decode_with};
use crate::transport::OutboundRequest;
use crate::types::StreamRequest;

pub const PROVIDER_ID: &str = "anthropic";

const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");
const ANTHROPIC_VERSION: HeaderName = HeaderName::from_static("anthropic-version");

#[derive(Debug, Serialize)]
struct AnthropicMessagesRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Wire adapter for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    base_url: String,
    version: String,
    default_max_tokens: u32,
}

impl AnthropicAdapter {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            base_url: config.anthropic_base_url.clone(),
            version: config.anthropic_version.clone(),
            default_max_tokens: config.default_max_output_tokens.max(1),
        }
    }

    /// The caller's cap when positive, the configured default otherwise.
    fn max_tokens(&self, requested: Option<i64>) -> u32 {
        requested
            .filter(|n| *n > 0)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(self.default_max_tokens)
    }

    fn messages_request(
        &self,
        body: &AnthropicMessagesRequest<'_>,
        credential: &SecretString,
    ) -> Result<OutboundRequest, NormalizedError> {
        let version = HeaderValue::from_str(&self.version)
            .map_err(|_| NormalizedError::unknown("Invalid anthropic-version header value"))?;
        Ok(OutboundRequest::post_json(
            format!("{}/messages", self.base_url),
            serde_json::to_value(body)?,
        )
        .with_header(X_API_KEY, credential_header(credential.expose_secret())?)
        .with_header(ANTHROPIC_VERSION, version))
    }
}

impl WireAdapter for AnthropicAdapter {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn build_outbound_request(
        &self,
        api_id: &str,
        request: &StreamRequest,
    ) -> Result<OutboundRequest, NormalizedError> {
        let system: Vec<&str> = request.system_texts().collect();
        let body = AnthropicMessagesRequest {
            model: api_id,
            messages: request
                .conversation()
                .map(|m| AnthropicMessage {
                    role: m.role.as_str(),
                    content: &m.text,
                })
                .collect(),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            max_tokens: self.max_tokens(request.max_output_tokens),
            temperature: request.temperature,
            stream: true,
        };
        self.messages_request(&body, &request.credential)
    }

    fn decode(&self, body: ByteStream) -> DeltaStream {
        decode_with(body, AnthropicStreamDecoder::new())
    }

    fn normalize_error(&self, status: u16, headers: &HeaderMap, body: &str) -> NormalizedError {
        let signal = errors::parse_error_envelope(body)
            .unwrap_or_else(|| VendorErrorSignal::from_message(body));
        normalize_http_error(status, headers, signal)
    }

    fn build_probe_request(
        &self,
        api_id: &str,
        credential: &SecretString,
    ) -> Result<OutboundRequest, NormalizedError> {
        let body = AnthropicMessagesRequest {
            model: api_id,
            messages: vec![AnthropicMessage {
                role: "user",
                content: "test",
            }],
            system: None,
            max_tokens: 1,
            temperature: None,
            stream: false,
        };
        self.messages_request(&body, credential)
    }
}
