//! Tracing subscriber setup
//!
//! The bridge only emits `tracing` events; installing a subscriber is left to
//! the embedding application. These helpers cover the common cases.
//!
//! ```rust,ignore
//! use chatbridge::telemetry::{LogFormat, init_tracing};
//!
//! init_tracing("chatbridge=info", LogFormat::Json)?;
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse `text` or `json` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Install a global subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Fails if a global subscriber
/// is already installed.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .try_init(),
    }
}

/// [`init_tracing`] with the format taken from `CHATBRIDGE_LOG_FORMAT` (default text)
/// and `chatbridge=info` as the default filter.
pub fn init_from_env() -> Result<(), TryInitError> {
    let format = match std::env::var("CHATBRIDGE_LOG_FORMAT") {
        Ok(value) => LogFormat::parse(&value).unwrap_or_else(|| {
            tracing::warn!(value = %value, "unknown CHATBRIDGE_LOG_FORMAT, using text");
            LogFormat::Text
        }),
        Err(_) => LogFormat::Text,
    };
    init_tracing("chatbridge=info", format)
}
