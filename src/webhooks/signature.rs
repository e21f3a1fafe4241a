//! Webhook signature schemes
//!
//! Tebex does not HMAC the body directly. It hashes the raw body with SHA-256
//! first and then computes HMAC-SHA256 over the 32 digest bytes, keyed with
//! the webhook secret. The MAC travels as lowercase hex in `X-Signature`.

use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Shared webhook secret configured in the Tebex creator panel.
///
/// The value is never rendered by `Debug` and is only reachable by
/// [`SignatureScheme`] implementations.
pub struct WebhookSecret(SecretString);

impl WebhookSecret {
    /// Wrap a secret, rejecting the empty string
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::config("webhook secret cannot be empty"));
        }
        Ok(Self(SecretString::from(secret)))
    }

    /// Raw secret value, for signature computation only
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}

/// Strategy for computing and checking delivery signatures
pub trait SignatureScheme: Send + Sync {
    /// Compute the signature Tebex would send for `body`
    fn sign(&self, secret: &WebhookSecret, body: &[u8]) -> String;

    /// Check a claimed signature against `body` in constant time
    fn verify(&self, secret: &WebhookSecret, body: &[u8], signature: &str) -> bool {
        let expected = self.sign(secret, body);
        constant_time_eq(expected.as_bytes(), signature.as_bytes())
    }
}

/// The Tebex production scheme: lowercase hex of
/// `HMAC-SHA256(secret, SHA-256(body))`
#[derive(Debug, Clone, Copy, Default)]
pub struct TebexSignature;

impl SignatureScheme for TebexSignature {
    fn sign(&self, secret: &WebhookSecret, body: &[u8]) -> String {
        let body_hash = Sha256::digest(body);

        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any length"));
        mac.update(&body_hash);

        hex::encode(mac.finalize().into_bytes())
    }
}

/// Constant-time byte comparison to prevent timing attacks
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
