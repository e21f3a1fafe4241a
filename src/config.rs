//! Configuration loaded from environment variables
//!
//! | Variable | Used by |
//! |---|---|
//! | `TEBEX_WEBHOOK_SECRET` | [`TebexConfig::webhook_authenticator`] |
//! | `TEBEX_PROJECT_ID`, `TEBEX_PRIVATE_KEY` | [`TebexConfig::checkout_client`] |
//! | `TEBEX_PUBLIC_TOKEN` | [`TebexConfig::headless_client`] |
//! | `TEBEX_CHECKOUT_URL`, `TEBEX_HEADLESS_URL` | base URL overrides |
//! | `TEBEX_HTTP_TIMEOUT_SECS` | request timeout, default 30 |
//!
//! Nothing is required at load time; each builder reports the variables it
//! is missing.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::checkout::{CheckoutClient, DEFAULT_CHECKOUT_URL};
use crate::error::{Error, Result};
use crate::headless::{HeadlessClient, DEFAULT_HEADLESS_URL};
use crate::rest;
use crate::webhooks::WebhookAuthenticator;

/// Environment variable holding the webhook secret
pub const ENV_WEBHOOK_SECRET: &str = "TEBEX_WEBHOOK_SECRET";
/// Environment variable holding the Checkout project id
pub const ENV_PROJECT_ID: &str = "TEBEX_PROJECT_ID";
/// Environment variable holding the Checkout private key
pub const ENV_PRIVATE_KEY: &str = "TEBEX_PRIVATE_KEY";
/// Environment variable holding the Headless public token
pub const ENV_PUBLIC_TOKEN: &str = "TEBEX_PUBLIC_TOKEN";
/// Environment variable overriding the Checkout base URL
pub const ENV_CHECKOUT_URL: &str = "TEBEX_CHECKOUT_URL";
/// Environment variable overriding the Headless base URL
pub const ENV_HEADLESS_URL: &str = "TEBEX_HEADLESS_URL";
/// Environment variable setting the HTTP timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TEBEX_HTTP_TIMEOUT_SECS";

/// Tebex credentials and client settings
#[derive(Clone)]
pub struct TebexConfig {
    webhook_secret: Option<Arc<SecretString>>,
    project_id: Option<String>,
    private_key: Option<Arc<SecretString>>,
    public_token: Option<String>,
    /// Checkout API root
    pub checkout_url: Option<String>,
    /// Headless API root
    pub headless_url: Option<String>,
    /// Request timeout for both API clients
    pub http_timeout: Duration,
}

impl TebexConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup, e.g. a map in tests.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = match get(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::config(format!("{ENV_HTTP_TIMEOUT_SECS} must be an integer, got {raw:?}"))
                })?;
                if secs == 0 {
                    return Err(Error::config(format!(
                        "{ENV_HTTP_TIMEOUT_SECS} must be greater than zero"
                    )));
                }
                Duration::from_secs(secs)
            }
            None => rest::DEFAULT_TIMEOUT,
        };

        let checkout_url = get(ENV_CHECKOUT_URL);
        if let Some(url) = &checkout_url {
            rest::parse_base_url(url)?;
            warn!(url = %url, "Overriding Checkout API URL");
        }
        let headless_url = get(ENV_HEADLESS_URL);
        if let Some(url) = &headless_url {
            rest::parse_base_url(url)?;
            warn!(url = %url, "Overriding Headless API URL");
        }

        let config = Self {
            webhook_secret: get(ENV_WEBHOOK_SECRET)
                .map(|secret| Arc::new(SecretString::from(secret))),
            project_id: get(ENV_PROJECT_ID),
            private_key: get(ENV_PRIVATE_KEY).map(|key| Arc::new(SecretString::from(key))),
            public_token: get(ENV_PUBLIC_TOKEN),
            checkout_url,
            headless_url,
            http_timeout,
        };

        debug!(
            webhook_secret = config.webhook_secret.is_some(),
            checkout_credentials = config.project_id.is_some() && config.private_key.is_some(),
            public_token = config.public_token.is_some(),
            "Loaded Tebex configuration"
        );
        Ok(config)
    }

    /// Set the webhook secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(Arc::new(SecretString::from(secret.into())));
        self
    }

    /// Set the Checkout credentials
    pub fn with_checkout_credentials(
        mut self,
        project_id: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        self.project_id = Some(project_id.into());
        self.private_key = Some(Arc::new(SecretString::from(private_key.into())));
        self
    }

    /// Set the Headless public token
    pub fn with_public_token(mut self, token: impl Into<String>) -> Self {
        self.public_token = Some(token.into());
        self
    }

    /// Whether a webhook secret is configured
    pub fn has_webhook_secret(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Build a webhook authenticator from `TEBEX_WEBHOOK_SECRET`
    pub fn webhook_authenticator(&self) -> Result<WebhookAuthenticator> {
        let secret = self
            .webhook_secret
            .as_ref()
            .ok_or_else(|| Error::config(format!("{ENV_WEBHOOK_SECRET} not set")))?;
        WebhookAuthenticator::new(secret.expose_secret())
    }

    /// Build a Checkout client from `TEBEX_PROJECT_ID` and `TEBEX_PRIVATE_KEY`
    pub fn checkout_client(&self) -> Result<CheckoutClient> {
        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| Error::config(format!("{ENV_PROJECT_ID} not set")))?;
        let private_key = self
            .private_key
            .as_ref()
            .ok_or_else(|| Error::config(format!("{ENV_PRIVATE_KEY} not set")))?;

        let client =
            CheckoutClient::with_timeout(project_id, private_key.expose_secret(), self.http_timeout)?;
        client.with_base_url(self.checkout_url.as_deref().unwrap_or(DEFAULT_CHECKOUT_URL))
    }

    /// Build a Headless client from `TEBEX_PUBLIC_TOKEN`
    pub fn headless_client(&self) -> Result<HeadlessClient> {
        let token = self
            .public_token
            .as_deref()
            .ok_or_else(|| Error::config(format!("{ENV_PUBLIC_TOKEN} not set")))?;

        let client = HeadlessClient::with_timeout(token, self.http_timeout)?;
        client.with_base_url(self.headless_url.as_deref().unwrap_or(DEFAULT_HEADLESS_URL))
    }
}

impl Default for TebexConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            project_id: None,
            private_key: None,
            public_token: None,
            checkout_url: None,
            headless_url: None,
            http_timeout: rest::DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for TebexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |set: bool| if set { "[REDACTED]" } else { "<unset>" };
        f.debug_struct("TebexConfig")
            .field("webhook_secret", &redact(self.webhook_secret.is_some()))
            .field("project_id", &self.project_id)
            .field("private_key", &redact(self.private_key.is_some()))
            .field("public_token", &redact(self.public_token.is_some()))
            .field("checkout_url", &self.checkout_url)
            .field("headless_url", &self.headless_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
