#![allow(missing_docs)]

//! Checkout API request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{
    Address, BasketLinks, BasketRow, CheckoutItem, Coupon, DiscountType, GiftCard, Package,
    PriceDetails, RevenueShare, Sale,
};

/// Basket as returned by every basket-mutating Checkout endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBasket {
    /// Unique basket identifier, e.g. `1a-55fff4107740a1f40d844ff89607557f45bfafb3`
    pub ident: String,
    /// Expiry time, e.g. `2022-10-25 15:15:40`
    pub expire: String,
    pub price: f64,
    pub price_details: PriceDetails,
    /// Whether this basket only updates a stored payment method
    #[serde(default)]
    pub is_payment_method_update: bool,
    #[serde(default)]
    pub return_url: Option<String>,
    /// Whether checkout has completed
    pub complete: bool,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub username: Option<String>,
    /// Applied discounts; the object shape is undocumented upstream
    #[serde(default)]
    pub discounts: Vec<Value>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default)]
    pub giftcards: Vec<GiftCard>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub rows: Vec<BasketRow>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(rename = "creator_code", default)]
    pub creator_code: Option<String>,
    #[serde(rename = "roundup", default)]
    pub round_up: Option<bool>,
    #[serde(rename = "cancel_url", default)]
    pub cancel_url: Option<String>,
    #[serde(rename = "complete_url", default)]
    pub complete_url: Option<String>,
    #[serde(rename = "complete_auto_redirect", default)]
    pub complete_auto_redirect: bool,
    /// Integrator data echoed back in webhooks
    #[serde(default)]
    pub custom: Option<Value>,
    pub links: BasketLinks,
}

/// Body of `POST /baskets`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateBasketRequest {
    /// Where the customer returns after leaving checkout
    pub return_url: String,
    /// Where the customer lands after paying
    pub complete_url: String,
    /// Integrator data echoed back in webhooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Map<String, Value>>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// RFC 3339 expiry, e.g. `2025-01-27T18:09:51Z`
    pub expires_at: String,
    /// Redirect to `complete_url` without a confirmation page
    pub complete_auto_redirect: bool,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
    pub creator_code: String,
    /// Customer IP address
    pub ip: String,
}

/// Whether a package is bought once or on a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// One-off purchase
    Single,
    /// Recurring purchase
    Subscription,
}

/// Body of `POST /baskets/{ident}/packages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPackageRequest {
    pub package: Package,
    /// Quantity
    pub qty: u32,
    #[serde(rename = "type")]
    pub package_type: PackageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_share: Option<Vec<RevenueShare>>,
}

/// Body of `POST /baskets/{ident}/sales`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSaleRequest {
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: f64,
}

/// Body of `POST /checkout`: create a basket and fill it in one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub basket: CreateBasketRequest,
    pub items: Vec<CheckoutItem>,
    /// Optional sale applied to the new basket
    #[serde(rename = "Sale", default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<Sale>,
}

/// Amount in a currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    /// ISO 4217 code
    pub currency: String,
}

/// Payment status as reported by the Checkout API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub id: u32,
    pub description: String,
}

/// Payment fee breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFees {
    pub tax: Price,
    pub gateway: Price,
}

/// Customer attached to a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ip: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub marketing_consent: bool,
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Product line of a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProduct {
    /// Package id; sent as a string by this endpoint
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub base_price: Price,
    pub paid_price: Price,
    #[serde(default)]
    pub variables: Vec<Value>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Payment as returned by `GET /payments/{txn_id}` and the refund endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Transaction id, e.g. `tbx-26929122a56954-0e15be`
    pub transaction_id: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_sequence: String,
    pub created_at: String,
    pub price: Price,
    #[serde(default)]
    pub fees: Option<PaymentFees>,
    pub customer: PaymentCustomer,
    #[serde(default)]
    pub products: Vec<PaymentProduct>,
    #[serde(default)]
    pub coupons: Vec<Value>,
    #[serde(default)]
    pub gift_cards: Vec<Value>,
    /// Set when this payment belongs to a subscription
    #[serde(default)]
    pub recurring_payment_reference: Option<String>,
}

/// Subscription status with its display class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPaymentStatus {
    pub id: u32,
    /// Display class, e.g. `success`
    #[serde(rename = "class", default)]
    pub class_name: String,
    pub description: String,
    /// 1 when the subscription is active
    #[serde(default)]
    pub active: u8,
}

/// Subscription price and billing interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPrice {
    pub amount: f64,
    pub currency: String,
    /// ISO 8601 duration, e.g. `P2W`
    #[serde(default)]
    pub period: String,
}

/// Links from a subscription to its payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPaymentLinks {
    pub initial_payment: String,
    #[serde(default)]
    pub payment_history: Vec<String>,
}

/// Subscription as returned by the recurring-payment endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub paused_at: Option<String>,
    #[serde(default)]
    pub paused_until: Option<String>,
    pub next_payment_date: String,
    /// Subscription reference used in the URL path
    pub reference: String,
    pub account_id: u64,
    /// ISO 8601 duration, e.g. `P2W`
    pub interval: String,
    #[serde(default)]
    pub cancelled_at: Option<String>,
    #[serde(default)]
    pub cancellation_requested_at: Option<String>,
    pub status: RecurringPaymentStatus,
    pub amount: RecurringPrice,
    #[serde(default)]
    pub cancel_reason: Option<String>,
    pub links: RecurringPaymentLinks,
}

/// Body of `PUT /recurring-payments/{reference}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecurringPaymentRequest {
    /// Replacement items for the subscription
    pub items: Vec<CheckoutItem>,
}

/// Target state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurringPaymentState {
    Paused,
    Active,
}

/// Body of `PUT /recurring-payments/{reference}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecurringPaymentStatusRequest {
    pub status: RecurringPaymentState,
    /// When a paused subscription resumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_until: Option<String>,
}

impl UpdateRecurringPaymentStatusRequest {
    /// Pause, optionally until a given time
    pub fn pause(until: Option<String>) -> Self {
        Self {
            status: RecurringPaymentState::Paused,
            paused_until: until,
        }
    }

    /// Reactivate a paused subscription
    pub fn resume() -> Self {
        Self {
            status: RecurringPaymentState::Active,
            paused_until: None,
        }
    }
}

/// Body of `POST /webhooks/endpoints`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterWebhookEndpointRequest {
    /// Receiver URL
    pub url: String,
    /// Event types to deliver, e.g. `payment.completed`
    pub types: Vec<String>,
}
