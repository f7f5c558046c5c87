//! OpenAI chat-completions streaming, end to end

use chatbridge::{ChatMessage, ErrorKind, StreamElement, StreamRequest};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{bridge_for, collect, fixture, texts};

fn request(model: &str) -> StreamRequest {
    StreamRequest::new("openai", model, "sk-test").with_message(ChatMessage::user("hi"))
}

#[tokio::test]
async fn streams_fragments_then_done() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": true,
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("openai/hello_two_chunks.sse"), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gpt-4o-mini"))).await;
    assert_eq!(texts(&elements), vec!["He", "llo"]);
    assert_eq!(elements.last(), Some(&StreamElement::Done));
    assert_eq!(elements.len(), 3);
}

#[tokio::test]
async fn display_name_resolves_to_api_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("openai/hello_two_chunks.sse"), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("GPT-4o Mini"))).await;
    assert_eq!(texts(&elements), vec!["He", "llo"]);
}

#[tokio::test]
async fn unknown_model_never_reaches_the_vendor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gpt-9-ultra"))).await;
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].as_error().unwrap().kind, ErrorKind::ModelNotFound);
}

#[tokio::test]
async fn invalid_key_is_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {
                "message": "Incorrect API key provided: sk-test.",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gpt-4o"))).await;
    let err = elements[0].as_error().expect("terminal error");
    assert_eq!(err.kind, ErrorKind::AuthFailure);
    assert_eq!(err.message, "Incorrect API key provided: sk-test.");
    assert_eq!(elements.len(), 1);
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "30")
                .set_body_json(serde_json::json!({
                    "error": {"message": "Rate limit reached for gpt-4o", "type": "requests", "code": "rate_limit_exceeded"}
                })),
        )
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gpt-4o"))).await;
    let err = elements[0].as_error().expect("terminal error");
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    assert_eq!(err.retry_after_seconds, Some(30));
}

#[tokio::test]
async fn sentinel_only_stream_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("data: [DONE]\n\n", "text/event-stream"))
        .mount(&server)
        .await;

    let elements = collect(bridge_for(&server).stream_completion(request("gpt-4o"))).await;
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].as_error().unwrap().kind, ErrorKind::Unknown);
}
