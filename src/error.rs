//! Error types for the Tebex SDK
//!
//! Webhook admission failures and REST client failures share one taxonomy so
//! that an integrator can handle both from a single `match`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for Tebex SDK operations
#[derive(Error, Debug)]
pub enum Error {
    /// Inbound webhook was rejected
    #[error("Webhook rejected: {0}")]
    Webhook(#[from] WebhookError),

    /// Upstream API answered with a structured problem document
    #[error("Upstream error: {0}")]
    Upstream(ProblemDetails),

    /// Upstream API answered with a non-2xx status and an unstructured body
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reasons an inbound webhook delivery is refused.
///
/// Every variant is terminal for the request being processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// Source IP is not one of the allow-listed Tebex senders
    #[error("Source IP {ip} is not an allowed webhook sender")]
    OriginRejected {
        /// The rejected source address, as supplied by the caller
        ip: String,
    },

    /// No `X-Signature` header was supplied
    #[error("Missing X-Signature header")]
    SignatureMissing,

    /// The supplied signature does not match the body
    #[error("Invalid webhook signature")]
    SignatureInvalid,

    /// Authenticated body is not a valid webhook envelope
    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),
}

/// Discriminant of [`WebhookError`], usable as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookErrorKind {
    /// See [`WebhookError::OriginRejected`]
    OriginRejected,
    /// See [`WebhookError::SignatureMissing`]
    SignatureMissing,
    /// See [`WebhookError::SignatureInvalid`]
    SignatureInvalid,
    /// See [`WebhookError::MalformedPayload`]
    MalformedPayload,
}

impl WebhookErrorKind {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OriginRejected => "origin_rejected",
            Self::SignatureMissing => "signature_missing",
            Self::SignatureInvalid => "signature_invalid",
            Self::MalformedPayload => "malformed_payload",
        }
    }
}

impl WebhookError {
    /// Get the error kind without matching on the payload
    pub fn kind(&self) -> WebhookErrorKind {
        match self {
            Self::OriginRejected { .. } => WebhookErrorKind::OriginRejected,
            Self::SignatureMissing => WebhookErrorKind::SignatureMissing,
            Self::SignatureInvalid => WebhookErrorKind::SignatureInvalid,
            Self::MalformedPayload(_) => WebhookErrorKind::MalformedPayload,
        }
    }

    /// HTTP status code a receiver should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::OriginRejected { .. } => 403,
            Self::SignatureMissing | Self::SignatureInvalid => 401,
            Self::MalformedPayload(_) => 400,
        }
    }
}

/// Structured error body returned by the Tebex APIs on non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Problem type URI
    #[serde(rename = "type", default)]
    pub problem_type: String,
    /// Short human-readable summary
    pub title: String,
    /// HTTP status code
    pub status: u16,
    /// Human-readable explanation
    #[serde(default)]
    pub detail: String,
    /// URI identifying this occurrence
    #[serde(default)]
    pub instance: String,
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{} ({})", self.title, self.status)
        } else {
            write!(f, "{} ({}): {}", self.title, self.status, self.detail)
        }
    }
}

/// Result type alias for Tebex SDK operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error from a string
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Get the webhook rejection, if this error is one
    pub fn as_webhook(&self) -> Option<&WebhookError> {
        match self {
            Error::Webhook(e) => Some(e),
            _ => None,
        }
    }

    /// Get the upstream problem document, if this error carries one
    pub fn as_upstream(&self) -> Option<&ProblemDetails> {
        match self {
            Error::Upstream(p) => Some(p),
            _ => None,
        }
    }
}
