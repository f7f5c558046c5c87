//! Error Handling Module
//!
//! This module provides the error taxonomy shared by every wire adapter:
//! - Core error types (`NormalizedError`, `ErrorKind`, `TransportError`, `RegistryError`)
//! - Vendor signal classification (`classify`)
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use chatbridge::error::{ErrorKind, NormalizedError};
//!
//! let error = NormalizedError::quota_exceeded("slow down").with_retry_after(30);
//! assert_eq!(error.kind, ErrorKind::QuotaExceeded);
//! assert_eq!(error.retry_after_seconds, Some(30));
//! ```

pub mod classify;
mod conversions;
pub mod types;

pub use classify::{
    VendorErrorSignal, is_billing_condition, normalize_http_error, normalize_vendor_signal,
    parse_retry_delay, retry_after_from_headers,
};
pub use types::*;
