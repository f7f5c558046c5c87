//! Anthropic Messages streaming, end to end

use chatbridge::{ChatMessage, ErrorKind, StreamElement, StreamRequest};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{bridge_for, collect, fixture, texts};

#[tokio::test]
async fn streams_text_deltas_with_system_prompt_lifted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-sonnet-4-20250514",
            "system": "Be kind.",
            "max_tokens": 4096,
            "stream": true,
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("anthropic/text_then_stop.sse"), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = StreamRequest::new("anthropic", "Claude Sonnet 4", "sk-ant-test")
        .with_messages([ChatMessage::system("Be kind."), ChatMessage::user("hi")])
        .with_max_output_tokens(0);
    let elements = collect(bridge_for(&server).stream_completion(request)).await;
    assert_eq!(texts(&elements), vec!["Hello", " world"]);
    assert_eq!(elements.last(), Some(&StreamElement::Done));
}

#[tokio::test]
async fn overloaded_status_is_a_transport_error_with_vendor_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .mount(&server)
        .await;

    let request = StreamRequest::new("anthropic", "claude-opus-4-20250514", "k")
        .with_message(ChatMessage::user("hi"));
    let elements = collect(bridge_for(&server).stream_completion(request)).await;
    let err = elements[0].as_error().unwrap();
    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(err.message, "Overloaded");
}

#[tokio::test]
async fn message_stop_without_text_ends_with_an_empty_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let request =
        StreamRequest::new("anthropic", "Claude Opus 4.1", "k").with_message(ChatMessage::user("hi"));
    let elements = collect(bridge_for(&server).stream_completion(request)).await;
    assert!(texts(&elements).is_empty());
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].as_error().unwrap().kind, ErrorKind::Unknown);
}
