//! Structured transport error taxonomy.
//!
//! Expected failure modes are plain data — the engine classifies them into
//! caller-facing outcomes rather than propagating panics or opaque strings.
//! Variants are `Clone` so an error can travel inside an RSVP outcome.

use gather_core::record::Pricing;
use thiserror::Error;

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by [`crate::ApiClient`] implementations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    /// No response received (DNS, connect, timeout). Never retried
    /// automatically; the caller decides.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 403 — the server rejected the actor.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Server-provided message.
        message: String,
    },

    /// HTTP 402 — attendance requires payment first.
    #[error("payment required")]
    PaymentRequired {
        /// Pricing payload attached to the rejection, when present.
        pricing: Option<Pricing>,
    },

    /// Malformed request detected server-side (other 4xx).
    #[error("validation error: {message}")]
    Validation {
        /// Server-provided message.
        message: String,
    },

    /// Any other non-success status.
    #[error("http {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw body when unparseable.
        message: String,
    },
}

impl ApiError {
    /// Whether this error is an expected, caller-handleable rejection rather
    /// than a transport fault.
    pub fn is_expected_rejection(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::PaymentRequired { .. }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
