//! Webhook admission
//!
//! [`WebhookAuthenticator::admit`] decides whether an inbound request is a
//! genuine, unaltered Tebex delivery. Checks run in a fixed order:
//!
//! ```text
//! source IP ──▶ X-Signature present? ──▶ signature matches? ──▶ parse envelope
//!     │                 │                       │                    │
//!     ▼                 ▼                       ▼                    ▼
//! OriginRejected  SignatureMissing       SignatureInvalid     MalformedPayload
//! ```
//!
//! The IP check comes first so spoofed-origin traffic costs one string
//! comparison and no hashing.
//!
//! # Replay
//!
//! No replay cache is kept. The same valid delivery is admitted every time it
//! is presented; deduplicate on [`WebhookDelivery::id`] if that matters.

use tracing::{debug, warn};

use crate::error::{Result, WebhookError};
use crate::webhooks::events::WebhookDelivery;
use crate::webhooks::signature::{SignatureScheme, TebexSignature, WebhookSecret};

/// Addresses Tebex sends webhooks from.
///
/// See <https://docs.tebex.io/developers/webhooks/overview#verifying-webhook-authenticity>.
pub const TEBEX_WEBHOOK_SOURCES: [&str; 2] = ["18.209.80.3", "54.87.231.232"];

/// Header carrying the delivery signature
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Untrusted wire form of a delivery.
///
/// `body` must be the exact request bytes, captured before any JSON parsing.
/// `source_ip` must be the true client address as seen by the network layer,
/// not an unvalidated forwarded-for header.
#[derive(Debug, Clone, Copy)]
pub struct RawDelivery<'a> {
    /// Raw request body
    pub body: &'a [u8],
    /// `X-Signature` header value; `None` when the header is absent
    pub signature: Option<&'a str>,
    /// Client IP address
    pub source_ip: &'a str,
}

impl<'a> RawDelivery<'a> {
    /// Bundle the parts of an inbound request
    pub fn new(body: &'a [u8], signature: Option<&'a str>, source_ip: &'a str) -> Self {
        Self {
            body,
            signature,
            source_ip,
        }
    }
}

/// Validates inbound Tebex webhook deliveries.
///
/// Holds only immutable state, so one instance can be shared across request
/// handlers (`Arc<WebhookAuthenticator>`) without locking.
#[derive(Debug)]
pub struct WebhookAuthenticator<S = TebexSignature> {
    secret: WebhookSecret,
    allowed_sources: Vec<String>,
    scheme: S,
}

impl WebhookAuthenticator<TebexSignature> {
    /// Create an authenticator with the Tebex signature scheme and sender list
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        Ok(Self {
            secret: WebhookSecret::new(secret)?,
            allowed_sources: TEBEX_WEBHOOK_SOURCES.iter().map(|s| s.to_string()).collect(),
            scheme: TebexSignature,
        })
    }
}

impl<S: SignatureScheme> WebhookAuthenticator<S> {
    /// Replace the signature scheme
    pub fn with_scheme<T: SignatureScheme>(self, scheme: T) -> WebhookAuthenticator<T> {
        WebhookAuthenticator {
            secret: self.secret,
            allowed_sources: self.allowed_sources,
            scheme,
        }
    }

    /// Replace the sender allow-list.
    ///
    /// Intended for tests and for wrappers implementing their own policy;
    /// production receivers should keep [`TEBEX_WEBHOOK_SOURCES`].
    pub fn with_allowed_sources<I, T>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.allowed_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Addresses deliveries are accepted from
    pub fn allowed_sources(&self) -> &[String] {
        &self.allowed_sources
    }

    /// Exact string match against the allow-list, no address normalization
    pub fn is_allowed_source(&self, ip: &str) -> bool {
        self.allowed_sources.iter().any(|allowed| allowed == ip)
    }

    /// Compute the signature Tebex would send for `body`
    pub fn sign(&self, body: &[u8]) -> String {
        self.scheme.sign(&self.secret, body)
    }

    /// Check a claimed signature for `body`
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> bool {
        self.scheme.verify(&self.secret, body, signature)
    }

    /// Authenticate and parse a delivery.
    ///
    /// # Errors
    ///
    /// One [`WebhookError`] per rejection reason, in check order.
    pub fn admit(&self, delivery: RawDelivery<'_>) -> std::result::Result<WebhookDelivery, WebhookError> {
        if !self.is_allowed_source(delivery.source_ip) {
            warn!(ip = %delivery.source_ip, "Rejected webhook from non-Tebex address");
            return Err(WebhookError::OriginRejected {
                ip: delivery.source_ip.to_string(),
            });
        }

        let Some(signature) = delivery.signature else {
            warn!(ip = %delivery.source_ip, "Rejected webhook without {}", SIGNATURE_HEADER);
            return Err(WebhookError::SignatureMissing);
        };

        if !self.verify_signature(delivery.body, signature) {
            warn!(ip = %delivery.source_ip, "Rejected webhook with invalid signature");
            return Err(WebhookError::SignatureInvalid);
        }

        let parsed = WebhookDelivery::from_bytes(delivery.body).map_err(|e| {
            warn!(ip = %delivery.source_ip, error = %e, "Authenticated webhook has malformed body");
            e
        })?;

        debug!(
            delivery_id = %parsed.id,
            webhook_type = %parsed.webhook_type,
            "Admitted webhook delivery"
        );
        Ok(parsed)
    }

    /// [`admit`](Self::admit) without building a [`RawDelivery`] first
    pub fn admit_parts(
        &self,
        body: &[u8],
        signature: Option<&str>,
        source_ip: &str,
    ) -> std::result::Result<WebhookDelivery, WebhookError> {
        self.admit(RawDelivery::new(body, signature, source_ip))
    }
}
