//! Gemini streamGenerateContent, end to end

use chatbridge::{ChatMessage, ErrorKind, StreamElement, StreamRequest};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{bridge_for, collect, fixture, texts};

fn request(model: &str) -> StreamRequest {
    StreamRequest::new("google", model, "AIza-test").with_messages([
        ChatMessage::system("Answer briefly."),
        ChatMessage::user("hi"),
    ])
}

#[tokio::test]
async fn streams_array_elements() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:streamGenerateContent"))
        .and(query_param("key", "AIza-test"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
            "systemInstruction": {"parts": [{"text": "Answer briefly."}]}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("gemini/array_stream.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("Gemini 1.5 Flash"))).await;
    assert_eq!(texts(&elements), vec!["Hello", " world, \"quoted {braces}\""]);
    assert_eq!(elements.last(), Some(&StreamElement::Done));
}

#[tokio::test]
async fn quota_error_uses_retry_info_delay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!([{
            "error": {
                "code": 429,
                "message": "You exceeded your current quota, please check your plan and billing details.",
                "status": "RESOURCE_EXHAUSTED",
                "details": [
                    {"@type": "type.googleapis.com/google.rpc.QuotaFailure", "violations": []},
                    {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "30s"}
                ]
            }
        }])))
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gemini-1.5-pro"))).await;
    let err = elements[0].as_error().unwrap();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    assert_eq!(err.retry_after_seconds, Some(30));
}

#[tokio::test]
async fn safety_finish_reason_blocks_after_earlier_text() {
    let server = MockServer::start().await;
    let body = r#"[{"candidates":[{"content":{"parts":[{"text":"Sure, "}],"role":"model"}}]},
{"candidates":[{"content":{"parts":[{"text":"here"}],"role":"model"},"finishReason":"SAFETY"}]}]"#;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gemini-pro"))).await;
    assert_eq!(texts(&elements), vec!["Sure, "]);
    assert_eq!(elements.last().unwrap().as_error().unwrap().kind, ErrorKind::ContentBlocked);
}

#[tokio::test]
async fn empty_array_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("Gemini 3"))).await;
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].as_error().unwrap().kind, ErrorKind::Unknown);
}
