//! Checkout API client

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::checkout::types::{
    AddPackageRequest, AddSaleRequest, CheckoutBasket, CheckoutRequest, CreateBasketRequest,
    Payment, RecurringPayment, RegisterWebhookEndpointRequest, UpdateRecurringPaymentRequest,
    UpdateRecurringPaymentStatusRequest,
};
use crate::error::Result;
use crate::rest;

/// Production Checkout API base URL
pub const DEFAULT_CHECKOUT_URL: &str = "https://checkout.tebex.io/api";

/// Client for the server-side Checkout API.
///
/// Authenticates with HTTP Basic auth: the project id as username and the
/// private key as password. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    base_url: Url,
    username: String,
    password: Arc<SecretString>,
    http_client: Client,
}

impl CheckoutClient {
    /// Create a client against the production API with the default timeout
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::with_timeout(username, password, rest::DEFAULT_TIMEOUT)
    }

    /// Create a client against the production API
    pub fn with_timeout(
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            base_url: rest::parse_base_url(DEFAULT_CHECKOUT_URL)?,
            username: username.into(),
            password: Arc::new(SecretString::from(password.into())),
            http_client: rest::build_client(timeout)?,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing)
    pub fn with_http_client(
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        http_client: Client,
    ) -> Result<Self> {
        Ok(Self {
            base_url: rest::parse_base_url(base_url)?,
            username: username.into(),
            password: Arc::new(SecretString::from(password.into())),
            http_client,
        })
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = rest::parse_base_url(base_url)?;
        Ok(self)
    }

    /// API root requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // =========================================================================
    // Baskets
    // =========================================================================

    /// `GET /baskets/{ident}`
    pub async fn fetch_basket(&self, ident: &str) -> Result<CheckoutBasket> {
        self.get(&["baskets", ident]).await
    }

    /// `POST /baskets`
    pub async fn create_basket(&self, request: &CreateBasketRequest) -> Result<CheckoutBasket> {
        self.send_json(Method::POST, &["baskets"], request).await
    }

    /// `POST /baskets/{ident}/packages`
    pub async fn add_package(
        &self,
        ident: &str,
        request: &AddPackageRequest,
    ) -> Result<CheckoutBasket> {
        self.send_json(Method::POST, &["baskets", ident, "packages"], request)
            .await
    }

    /// `DELETE /baskets/{ident}/packages/{row_id}`
    pub async fn remove_row(&self, ident: &str, row_id: u64) -> Result<()> {
        let row_id = row_id.to_string();
        let response = self
            .request(Method::DELETE, &["baskets", ident, "packages", &row_id])
            .send()
            .await?;
        rest::empty_response(response).await
    }

    /// `POST /baskets/{ident}/sales`
    pub async fn add_sale(&self, ident: &str, request: &AddSaleRequest) -> Result<CheckoutBasket> {
        self.send_json(Method::POST, &["baskets", ident, "sales"], request)
            .await
    }

    /// `POST /checkout`: create a basket and add items in one call
    pub async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutBasket> {
        self.send_json(Method::POST, &["checkout"], request).await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// `GET /payments/{txn_id}?type=txn_id`
    pub async fn fetch_payment(&self, txn_id: &str) -> Result<Payment> {
        let response = self
            .request(Method::GET, &["payments", txn_id])
            .query(&[("type", "txn_id")])
            .send()
            .await?;
        rest::json_response(response).await
    }

    /// `POST /payments/{txn_id}/refund?type=txn_id`
    pub async fn refund_payment(&self, txn_id: &str) -> Result<Payment> {
        let response = self
            .request(Method::POST, &["payments", txn_id, "refund"])
            .query(&[("type", "txn_id")])
            .send()
            .await?;
        rest::json_response(response).await
    }

    // =========================================================================
    // Recurring payments
    // =========================================================================

    /// `GET /recurring-payments/{reference}`
    pub async fn fetch_recurring_payment(&self, reference: &str) -> Result<RecurringPayment> {
        self.get(&["recurring-payments", reference]).await
    }

    /// `PUT /recurring-payments/{reference}`: replace the subscribed items
    pub async fn update_recurring_payment(
        &self,
        reference: &str,
        request: &UpdateRecurringPaymentRequest,
    ) -> Result<RecurringPayment> {
        self.send_json(Method::PUT, &["recurring-payments", reference], request)
            .await
    }

    /// `DELETE /recurring-payments/{reference}`
    pub async fn cancel_recurring_payment(&self, reference: &str) -> Result<RecurringPayment> {
        let response = self
            .request(Method::DELETE, &["recurring-payments", reference])
            .send()
            .await?;
        rest::json_response(response).await
    }

    /// `PUT /recurring-payments/{reference}/status`: pause or reactivate
    pub async fn update_recurring_payment_status(
        &self,
        reference: &str,
        request: &UpdateRecurringPaymentStatusRequest,
    ) -> Result<RecurringPayment> {
        self.send_json(
            Method::PUT,
            &["recurring-payments", reference, "status"],
            request,
        )
        .await
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// `POST /webhooks/endpoints`
    pub async fn register_webhook_endpoint(
        &self,
        request: &RegisterWebhookEndpointRequest,
    ) -> Result<()> {
        let response = self
            .request(Method::POST, &["webhooks", "endpoints"])
            .json(request)
            .send()
            .await?;
        rest::empty_response(response).await
    }

    // =========================================================================
    // Internal HTTP Methods
    // =========================================================================

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = rest::endpoint(&self.base_url, segments);
        debug!(method = %method, path = %url.path(), "Checkout API request");
        self.http_client
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.request(Method::GET, segments).send().await?;
        rest::json_response(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, segments).json(body).send().await?;
        rest::json_response(response).await
    }
}
