//! axum endpoint for Tebex webhook deliveries
//!
//! The route captures the raw body as [`Bytes`] before any JSON parsing,
//! resolves the client address, and hands everything to
//! [`WebhookAuthenticator::admit`]. Authenticated deliveries are passed to a
//! [`DeliveryHandler`]; validation handshakes are answered directly.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::error::WebhookError;
use crate::metrics::WebhookMetrics;
use crate::webhooks::authenticator::{RawDelivery, WebhookAuthenticator, SIGNATURE_HEADER};
use crate::webhooks::events::{WebhookDelivery, WebhookSubject};
use crate::webhooks::signature::{SignatureScheme, TebexSignature};

/// Handler for authenticated, non-validation deliveries
#[async_trait::async_trait]
pub trait DeliveryHandler: Send + Sync + 'static {
    /// Process one delivery. Returning `Err` answers 500 so Tebex retries.
    async fn on_delivery(&self, delivery: &WebhookDelivery) -> anyhow::Result<()>;
}

/// Logging handler that logs all deliveries
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait::async_trait]
impl DeliveryHandler for LoggingHandler {
    async fn on_delivery(&self, delivery: &WebhookDelivery) -> anyhow::Result<()> {
        match &delivery.subject {
            WebhookSubject::Payment(payment) => {
                tracing::info!(
                    delivery_id = %delivery.id,
                    webhook_type = %delivery.webhook_type,
                    transaction_id = %payment.transaction_id,
                    status = ?payment.status.as_ref().and_then(|s| s.kind()),
                    "Payment webhook received"
                );
            }
            WebhookSubject::RecurringPayment(recurring) => {
                tracing::info!(
                    delivery_id = %delivery.id,
                    webhook_type = %delivery.webhook_type,
                    reference = %recurring.reference,
                    fail_count = ?recurring.fail_count,
                    "Recurring payment webhook received"
                );
            }
            WebhookSubject::Validation(_) => {
                tracing::debug!(delivery_id = %delivery.id, "Validation webhook received");
            }
        }
        Ok(())
    }
}

/// Where the receiver reads the client address from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientIpSource {
    /// TCP peer address of the connection
    #[default]
    Peer,
    /// First entry of a header set by a trusted reverse proxy
    /// (e.g. `X-Forwarded-For`)
    Header(String),
}

impl ClientIpSource {
    /// Resolve the client IP, or an empty string when it cannot be determined.
    ///
    /// An empty string never matches the allow-list, so unresolvable
    /// requests are rejected as `OriginRejected`.
    pub fn resolve(&self, peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
        match self {
            Self::Peer => peer
                .map(|addr| addr.ip().to_canonical().to_string())
                .unwrap_or_default(),
            Self::Header(name) => headers
                .get(name.as_str())
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|first| first.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Shared state of the webhook route
pub struct WebhookState<H, S = TebexSignature> {
    /// Delivery authenticator
    pub authenticator: Arc<WebhookAuthenticator<S>>,
    /// Integrator handler
    pub handler: Arc<H>,
    /// Client address resolution
    pub client_ip: ClientIpSource,
    /// Counters exposed by the CLI's `/metrics` route
    pub metrics: Arc<WebhookMetrics>,
}

impl<H: DeliveryHandler, S: SignatureScheme> WebhookState<H, S> {
    /// Create state reading the client address from the TCP peer
    pub fn new(authenticator: WebhookAuthenticator<S>, handler: H) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            handler: Arc::new(handler),
            client_ip: ClientIpSource::Peer,
            metrics: Arc::new(WebhookMetrics::new()),
        }
    }

    /// Read the client address from somewhere other than the TCP peer
    pub fn with_client_ip(mut self, source: ClientIpSource) -> Self {
        self.client_ip = source;
        self
    }

    /// Share an existing metrics set
    pub fn with_metrics(mut self, metrics: Arc<WebhookMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Build a router with `POST /` receiving deliveries.
///
/// Mount it under any prefix with [`Router::nest`]. The server must be
/// started with `into_make_service_with_connect_info::<SocketAddr>()` when
/// [`ClientIpSource::Peer`] is in use.
pub fn webhook_router<H, S>(state: Arc<WebhookState<H, S>>) -> Router
where
    H: DeliveryHandler,
    S: SignatureScheme + 'static,
{
    Router::new()
        .route("/", post(receive_webhook::<H, S>))
        .with_state(state)
}

async fn receive_webhook<H, S>(
    State(state): State<Arc<WebhookState<H, S>>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    H: DeliveryHandler,
    S: SignatureScheme + 'static,
{
    let source_ip = state.client_ip.resolve(peer.map(|ConnectInfo(addr)| addr), &headers);
    // A non-ASCII header value is present but can never match
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|value| value.to_str().unwrap_or_default());

    let delivery = match state
        .authenticator
        .admit(RawDelivery::new(&body, signature, &source_ip))
    {
        Ok(delivery) => delivery,
        Err(e) => {
            state.metrics.record_rejection(e.kind());
            return rejection_response(&e);
        }
    };

    if delivery.is_validation() {
        state.metrics.record_validation();
        return (StatusCode::OK, Json(json!({ "id": delivery.id }))).into_response();
    }

    state.metrics.record_admitted();
    let start = Instant::now();
    match state.handler.on_delivery(&delivery).await {
        Ok(()) => {
            state.metrics.record_handled(start.elapsed());
            StatusCode::OK.into_response()
        }
        Err(e) => {
            state.metrics.record_handler_failure(start.elapsed());
            tracing::error!(
                delivery_id = %delivery.id,
                webhook_type = %delivery.webhook_type,
                error = %e,
                "Webhook handler failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn rejection_response(error: &WebhookError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    let body = Json(json!({
        "error": error.kind().as_str(),
        "message": error.to_string(),
    }));
    (status, body).into_response()
}
