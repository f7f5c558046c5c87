//! Google Gemini protocol
//!
//! `POST {base}/models/{model}:streamGenerateContent?key=...`. The key travels
//! in the query string, assistant turns use the role `model`, and system turns
//! go to `systemInstruction`.

mod errors;
pub mod streaming;

pub use streaming::GeminiStreamDecoder;

use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::WireAdapter;
use crate::config::BridgeConfig;
use crate::error::{NormalizedError, VendorErrorSignal, normalize_http_error};
use crate::streaming::{ByteStream, DeltaStream, decode_with};
use crate::transport::OutboundRequest;
use crate::types::{Role, StreamRequest};

pub const PROVIDER_ID: &str = "google";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i64>,
}

impl GenerationConfig {
    fn into_option(self) -> Option<Self> {
        (self.temperature.is_some() || self.max_output_tokens.is_some()).then_some(self)
    }
}

/// Wire adapter for the Gemini `generateContent` family.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            base_url: config.google_base_url.clone(),
        }
    }

    fn model_url(&self, api_id: &str, method: &str, credential: &SecretString) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url,
            urlencoding::encode(api_id),
            method,
            urlencoding::encode(credential.expose_secret())
        )
    }
}

impl WireAdapter for GeminiAdapter {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn build_outbound_request(
        &self,
        api_id: &str,
        request: &StreamRequest,
    ) -> Result<OutboundRequest, NormalizedError> {
        let contents = request
            .conversation()
            .map(|m| Content {
                role: Some(if m.role == Role::Assistant { "model" } else { "user" }),
                parts: vec![Part { text: &m.text }],
            })
            .collect();
        let system_parts: Vec<Part<'_>> = request.system_texts().map(|text| Part { text }).collect();
        let body = GenerateContentRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then_some(Content {
                role: None,
                parts: system_parts,
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens.filter(|n| *n > 0),
            }
            .into_option(),
        };
        let url = self.model_url(api_id, "streamGenerateContent", &request.credential);
        Ok(OutboundRequest::post_json(url, serde_json::to_value(&body)?))
    }

    fn decode(&self, body: ByteStream) -> DeltaStream {
        decode_with(body, GeminiStreamDecoder::new())
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
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part { text: "test" }],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: None,
                max_output_tokens: Some(1),
            }),
        };
        let url = self.model_url(api_id, "generateContent", credential);
        Ok(OutboundRequest::post_json(url, serde_json::to_value(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::ChatMessage;
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    fn adapter() -> GeminiAdapter {
        GeminiAdapter::new(&BridgeConfig::default().with_google_base_url("https://google.test/v1beta"))
    }

    #[test]
    fn builds_stream_request_with_query_key() {
        let request = StreamRequest::new("google", "Gemini 1.5 Flash", "AIza/key+1")
            .with_messages([
                ChatMessage::system("Be brief."),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("bye"),
            ])
            .with_temperature(0.2)
            .with_max_output_tokens(100);
        let outbound = adapter()
            .build_outbound_request("gemini-1.5-flash", &request)
            .unwrap();

        assert_eq!(
            outbound.url,
            "https://google.test/v1beta/models/gemini-1.5-flash:streamGenerateContent?key=AIza%2Fkey%2B1"
        );
        assert!(outbound.headers.get("authorization").is_none());
        assert!(!outbound.redacted_url().contains("AIza"));

        let body = outbound.body.unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert!(body["systemInstruction"].get("role").is_none());
        let roles: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn generation_config_is_omitted_when_empty() {
        let request = StreamRequest::new("google", "gemini-pro", "k")
            .with_message(ChatMessage::user("hi"))
            .with_max_output_tokens(0);
        let body = adapter()
            .build_outbound_request("gemini-pro", &request)
            .unwrap()
            .body
            .unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn retry_info_wins_over_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED","details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"30s"}]}}"#;
        let err = adapter().normalize_error(429, &headers, body);
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
        assert_eq!(err.retry_after_seconds, Some(30));
    }

    #[test]
    fn invalid_key_is_an_auth_failure() {
        let body = r#"[{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}]"#;
        let err = adapter().normalize_error(400, &HeaderMap::new(), body);
        assert_eq!(err.kind, ErrorKind::AuthFailure);
    }

    #[test]
    fn unknown_model_message_maps_to_model_not_found() {
        let body = r#"{"error":{"code":404,"message":"models/gemini-9 is not found for API version v1beta","status":"NOT_FOUND"}}"#;
        let err = adapter().normalize_error(404, &HeaderMap::new(), body);
        assert_eq!(err.kind, ErrorKind::ModelNotFound);
        assert!(err.message.starts_with("models/gemini-9"));
    }

    #[test]
    fn probe_requests_a_single_token() {
        let probe = adapter()
            .build_probe_request("gemini-1.5-pro", &SecretString::from("k".to_string()))
            .unwrap();
        assert!(probe.url.ends_with("/models/gemini-1.5-pro:generateContent?key=k"));
        let body = probe.body.unwrap();
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "test");
    }
}
