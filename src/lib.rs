//! Tebex SDK - Webhook Authentication and REST Clients
//!
//! This crate lets a game-server or web backend take payments through
//! [Tebex](https://tebex.io) safely.
//!
//! # Features
//!
//! - **Webhook authentication**: sender allow-list plus constant-time
//!   signature verification, then typed parsing of the delivery
//! - **Webhook receiver**: ready-made axum route with a pluggable handler
//! - **Checkout API**: baskets, checkouts, payments, refunds, subscriptions
//! - **Headless API**: store catalogue and customer baskets
//!
//! # Architecture
//!
//! ```text
//! Tebex ──POST──▶ webhook_router ──▶ WebhookAuthenticator::admit ──▶ DeliveryHandler
//!                       │                      │
//!                       ▼                      ▼
//!                WebhookMetrics        WebhookError (403/401/400)
//!
//! Backend ──▶ CheckoutClient ──▶ checkout.tebex.io   (Basic auth)
//!         └─▶ HeadlessClient ──▶ headless.tebex.io   (public token)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use tebex_sdk::webhooks::WebhookAuthenticator;
//!
//! let authenticator = WebhookAuthenticator::new("my-webhook-secret")?;
//! let body = br#"{"id":"1","type":"validation.webhook","date":"2024-01-01T00:00:00+00:00","subject":{}}"#;
//! let signature = authenticator.sign(body);
//!
//! let delivery = authenticator.admit_parts(body, Some(&signature), "18.209.80.3")?;
//! assert!(delivery.is_validation());
//! # Ok::<(), tebex_sdk::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod checkout;
pub mod config;
pub mod error;
pub mod headless;
pub mod metrics;
pub mod types;
pub mod webhooks;

mod rest;

// Re-exports for convenience
pub use checkout::CheckoutClient;
pub use config::TebexConfig;
pub use error::{Error, ProblemDetails, Result, WebhookError};
pub use headless::HeadlessClient;
pub use webhooks::{RawDelivery, WebhookAuthenticator, WebhookDelivery};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
