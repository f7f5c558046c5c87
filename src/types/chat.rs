//! Vendor-agnostic chat request types

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

/// A single streamed completion request.
///
/// Built fresh for every call and consumed by [`crate::StreamBridge::stream_completion`].
/// The credential is kept in a [`SecretString`] so it never shows up in `Debug` output.
#[derive(Debug)]
pub struct StreamRequest {
    pub provider_id: String,
    /// Either the model's API id or its display name.
    pub model_ref: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    /// Caller-supplied output cap; adapters decide how to treat absent or non-positive values.
    pub max_output_tokens: Option<i64>,
    pub credential: SecretString,
}

impl StreamRequest {
    pub fn new(
        provider_id: impl Into<String>,
        model_ref: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_ref: model_ref.into(),
            messages: Vec::new(),
            temperature: None,
            max_output_tokens: None,
            credential: SecretString::from(credential.into()),
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: i64) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// System-role texts in request order.
    pub fn system_texts(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
    }

    /// User and assistant turns in request order.
    pub fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}
