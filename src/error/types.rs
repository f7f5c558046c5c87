use serde::{Deserialize, Serialize};

/// Vendor-independent classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The credential was rejected (HTTP 401/403, vendor authentication error).
    AuthFailure,
    /// Rate limit or quota exhausted (HTTP 429, `RESOURCE_EXHAUSTED`).
    QuotaExceeded,
    /// Unknown model, either locally or as reported by the vendor.
    ModelNotFound,
    /// The vendor refused or filtered the generation.
    ContentBlocked,
    /// The request deadline elapsed.
    Timeout,
    /// Any other non-success response or network failure.
    Transport,
    /// Anomalies without a better category (empty response, unknown provider).
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthFailure => "auth_failure",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ModelNotFound => "model_not_found",
            Self::ContentBlocked => "content_blocked",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal failure as seen by the caller of the bridge.
///
/// The message is shown to the end user verbatim, so it carries the vendor's
/// own wording whenever the vendor supplied one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct NormalizedError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl NormalizedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after_seconds = Some(seconds);
        self
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailure, message)
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    pub fn model_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelNotFound, message)
    }

    pub fn content_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ContentBlocked, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// The vendor produced a stream without any content and without saying why.
    pub fn empty_response(provider_id: &str) -> Self {
        Self::unknown(format!(
            "{provider_id} returned an empty response; the output may have been filtered"
        ))
    }

    /// Whether a calling layer may reasonably retry the same request later.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::QuotaExceeded | ErrorKind::Timeout | ErrorKind::Transport
        )
    }
}

/// Failures of the HTTP transport itself (before any vendor semantics apply).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("stream error: {0}")]
    Body(String),
    #[error("invalid request: {0}")]
    Request(String),
}

/// Violations of the provider catalog invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("provider `{0}` is already registered")]
    DuplicateProvider(String),
    #[error("provider `{provider}` lists api id `{api_id}` more than once")]
    DuplicateApiId { provider: String, api_id: String },
    #[error("provider `{provider}` lists display name `{display_name}` more than once")]
    DuplicateDisplayName {
        provider: String,
        display_name: String,
    },
}
