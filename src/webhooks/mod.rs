//! Tebex webhook authentication and delivery
//!
//! Tebex signs every webhook it sends. A delivery is accepted only when:
//!
//! 1. it comes from one of the Tebex sender addresses,
//! 2. it carries an `X-Signature` header,
//! 3. that header equals `hex(HMAC-SHA256(secret, SHA-256(body)))`,
//! 4. the body parses as a webhook envelope.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use tebex_sdk::webhooks::{
//!     webhook_router, DeliveryHandler, WebhookAuthenticator, WebhookDelivery, WebhookState,
//! };
//!
//! struct FulfilOrders;
//!
//! #[async_trait::async_trait]
//! impl DeliveryHandler for FulfilOrders {
//!     async fn on_delivery(&self, delivery: &WebhookDelivery) -> anyhow::Result<()> {
//!         if let Some(payment) = delivery.as_payment() {
//!             println!("paid: {}", payment.transaction_id);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let authenticator = WebhookAuthenticator::new(std::env::var("TEBEX_WEBHOOK_SECRET")?)?;
//!     let state = Arc::new(WebhookState::new(authenticator, FulfilOrders));
//!     let app = axum::Router::new().nest("/webhooks/tebex", webhook_router(state));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```

pub mod authenticator;
pub mod events;
pub mod receiver;
pub mod signature;

pub use authenticator::{RawDelivery, WebhookAuthenticator, SIGNATURE_HEADER, TEBEX_WEBHOOK_SOURCES};
pub use events::{
    PaymentStatusKind, PaymentSubject, RecurringPaymentSubject, WebhookCategory, WebhookDelivery,
    WebhookSubject, WebhookType,
};
pub use receiver::{webhook_router, ClientIpSource, DeliveryHandler, LoggingHandler, WebhookState};
pub use signature::{SignatureScheme, TebexSignature, WebhookSecret};
