//! Vendor signal classification.
//!
//! Adapters parse their own error envelopes into a [`VendorErrorSignal`];
//! the mapping from that signal (plus the HTTP status, when there is one)
//! to an [`ErrorKind`] is shared so every vendor lands in the same taxonomy.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use super::types::{ErrorKind, NormalizedError};

static MODEL_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\bmodels?\b[^.]*\b(not found|does not exist|unknown|invalid|not supported|unsupported|not available|no access)\b|\b(unknown|invalid|unsupported)\s+model\b)",
    )
    .expect("model mention pattern is valid")
});

static BILLING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(credit balance|billing|insufficient (credits?|funds|balance)|purchase credits|payment required)",
    )
    .expect("billing pattern is valid")
});

/// What a vendor error envelope says, independent of its JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorErrorSignal {
    /// Vendor error type or code, e.g. `authentication_error` or `invalid_api_key`.
    pub error_type: Option<String>,
    /// Canonical RPC status, e.g. `RESOURCE_EXHAUSTED`.
    pub status: Option<String>,
    pub message: Option<String>,
    pub retry_after_seconds: Option<u64>,
}

impl VendorErrorSignal {
    /// A signal carrying only a raw message (used when the body is not a known envelope).
    ///
    /// The message is kept byte for byte; a blank body carries no message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: (!message.trim().is_empty()).then_some(message),
            ..Default::default()
        }
    }
}

/// Map a vendor signal to the normalized taxonomy.
///
/// `http_status` is `None` for errors reported in-band inside a successful stream.
pub fn normalize_vendor_signal(
    http_status: Option<u16>,
    signal: &VendorErrorSignal,
) -> NormalizedError {
    let message = signal
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| match http_status {
            Some(status) => format!("HTTP {status}"),
            None => "The provider reported an unspecified error".to_string(),
        });
    let error_type = signal
        .error_type
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let rpc_status = signal
        .status
        .as_deref()
        .unwrap_or_default()
        .to_ascii_uppercase();

    let kind = if matches!(http_status, Some(401 | 403))
        || error_type.contains("authentication")
        || error_type.contains("permission")
        || error_type == "invalid_api_key"
        || rpc_status == "UNAUTHENTICATED"
        || rpc_status == "PERMISSION_DENIED"
    {
        ErrorKind::AuthFailure
    } else if http_status == Some(429)
        || rpc_status == "RESOURCE_EXHAUSTED"
        || error_type.contains("rate_limit")
        || error_type == "insufficient_quota"
    {
        ErrorKind::QuotaExceeded
    } else if http_status == Some(404)
        || error_type.contains("not_found")
        || error_type == "model_not_found"
        || rpc_status == "NOT_FOUND"
        || MODEL_MENTION.is_match(&message)
    {
        ErrorKind::ModelNotFound
    } else if http_status.is_some() {
        ErrorKind::Transport
    } else {
        ErrorKind::Unknown
    };

    let mut error = NormalizedError::new(kind, message);
    if kind == ErrorKind::QuotaExceeded {
        error.retry_after_seconds = signal.retry_after_seconds;
    }
    error
}

/// Map a non-success HTTP response to the normalized taxonomy.
///
/// A retry delay found in the vendor body wins over the `Retry-After` header.
pub fn normalize_http_error(
    status: u16,
    headers: &HeaderMap,
    mut signal: VendorErrorSignal,
) -> NormalizedError {
    if signal.retry_after_seconds.is_none() {
        signal.retry_after_seconds = retry_after_from_headers(headers);
    }
    let error = normalize_vendor_signal(Some(status), &signal);
    tracing::debug!(
        status,
        kind = %error.kind,
        retry_after = ?error.retry_after_seconds,
        "normalized upstream error"
    );
    error
}

/// Read a delay-seconds `Retry-After` header. HTTP-date values are ignored.
pub fn retry_after_from_headers(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = raw.parse().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| seconds.ceil() as u64)
}

/// Parse a protobuf-JSON duration such as `"30s"` or `"1.5s"` into whole seconds (rounded up).
pub fn parse_retry_delay(raw: &str) -> Option<u64> {
    let number = raw.trim().strip_suffix('s')?;
    let seconds: f64 = number.trim().parse().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| seconds.ceil() as u64)
}

/// Whether a rejected request means "valid key, but the account cannot place requests".
///
/// This is advisory: it does not change the [`ErrorKind`] of the error, it only lets
/// callers tell the user that their key works but their billing needs attention.
pub fn is_billing_condition(status: u16, message: &str) -> bool {
    matches!(status, 400 | 402) && BILLING.is_match(message)
}
