//! OpenAI chat-completions protocol
//!
//! `POST {base}/chat/completions` with a bearer token; the streamed body is a
//! sequence of `data: {json}` lines closed by `data: [DONE]`.

pub mod streaming;

pub use streaming::OpenAiStreamDecoder;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{WireAdapter, credential_header};
use crate::config::BridgeConfig;
use crate::error::{NormalizedError, VendorErrorSignal, normalize_http_error};
use crate::streaming::{ByteStream, DeltaStream, decode_with};
use crate::transport::OutboundRequest;
use crate::types::StreamRequest;

pub const PROVIDER_ID: &str = "openai";

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<i64>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI error envelope: `{"error": {"message", "type", "code"}}`.
#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OpenAiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl OpenAiErrorBody {
    /// `code` is the more specific field (`invalid_api_key`, `model_not_found`), so it wins.
    pub(crate) fn into_signal(self) -> VendorErrorSignal {
        let code = self
            .code
            .as_ref()
            .and_then(|c| c.as_str())
            .map(str::to_string);
        VendorErrorSignal {
            error_type: code.or(self.error_type),
            message: self.message,
            ..Default::default()
        }
    }
}

/// Wire adapter for the OpenAI chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    base_url: String,
}

impl OpenAiAdapter {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            base_url: config.openai_base_url.clone(),
        }
    }

    fn bearer(credential: &SecretString) -> Result<reqwest::header::HeaderValue, NormalizedError> {
        credential_header(&format!("Bearer {}", credential.expose_secret()))
    }
}

impl WireAdapter for OpenAiAdapter {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn build_outbound_request(
        &self,
        api_id: &str,
        request: &StreamRequest,
    ) -> Result<OutboundRequest, NormalizedError> {
        let body = OpenAiChatRequest {
            model: api_id,
            messages: request
                .messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.as_str(),
                    content: &m.text,
                })
                .collect(),
            stream: true,
            temperature: request.temperature,
            max_completion_tokens: request.max_output_tokens.filter(|n| *n > 0),
        };
        let url = format!("{}/chat/completions", self.base_url);
        Ok(OutboundRequest::post_json(url, serde_json::to_value(&body)?)
            .with_header(AUTHORIZATION, Self::bearer(&request.credential)?))
    }

    fn decode(&self, body: ByteStream) -> DeltaStream {
        decode_with(body, OpenAiStreamDecoder::new())
    }

    fn normalize_error(&self, status: u16, headers: &HeaderMap, body: &str) -> NormalizedError {
        let signal = serde_json::from_str::<OpenAiErrorEnvelope>(body)
            .map(|envelope| envelope.error.into_signal())
            .unwrap_or_else(|_| VendorErrorSignal::from_message(body));
        normalize_http_error(status, headers, signal)
    }

    fn build_probe_request(
        &self,
        _api_id: &str,
        credential: &SecretString,
    ) -> Result<OutboundRequest, NormalizedError> {
        Ok(OutboundRequest::get(format!("{}/models", self.base_url))
            .with_header(AUTHORIZATION, Self::bearer(credential)?))
    }
}
