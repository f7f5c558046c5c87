//! Shared helpers: a bridge pointed at a wiremock server, fixture loading and
//! stream collection.

#![allow(dead_code)]

use chatbridge::{BridgeConfig, StreamBridge, StreamElement};
use futures_util::StreamExt;
use wiremock::MockServer;

/// Bridge whose three vendors all live on `server`.
pub fn bridge_for(server: &MockServer) -> StreamBridge {
    let config = BridgeConfig::default()
        .with_openai_base_url(format!("{}/v1", server.uri()))
        .with_anthropic_base_url(format!("{}/v1", server.uri()))
        .with_google_base_url(format!("{}/v1beta", server.uri()));
    StreamBridge::new(config).expect("reqwest client")
}

pub fn fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).expect("fixture exists")
}

pub async fn collect(stream: chatbridge::CompletionStream) -> Vec<StreamElement> {
    stream.collect().await
}

pub fn texts(elements: &[StreamElement]) -> Vec<&str> {
    elements.iter().filter_map(StreamElement::as_delta).collect()
}
