// Schema types mirror the upstream payload; field docs live in the Tebex docs
#![allow(missing_docs)]

//! Tebex Webhook Event Types
//!
//! Strongly-typed representations of Tebex webhook deliveries. The subject
//! shape of a delivery is selected by the prefix of its `type`:
//!
//! | `type` prefix          | subject                       |
//! |------------------------|-------------------------------|
//! | `payment.`             | [`PaymentSubject`]            |
//! | `recurring-payment.`   | [`RecurringPaymentSubject`]   |
//! | `validation.`          | opaque JSON                   |
//!
//! Subject fields other than the identifier are optional and unknown fields
//! are kept in `extra`, so re-serializing a parsed delivery reproduces the
//! received JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::WebhookError;

/// Tebex webhook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookType {
    #[serde(rename = "payment.completed")]
    PaymentCompleted,
    #[serde(rename = "payment.declined")]
    PaymentDeclined,
    #[serde(rename = "payment.refunded")]
    PaymentRefunded,
    #[serde(rename = "payment.dispute.opened")]
    PaymentDisputeOpened,
    #[serde(rename = "payment.dispute.won")]
    PaymentDisputeWon,
    #[serde(rename = "payment.dispute.lost")]
    PaymentDisputeLost,
    #[serde(rename = "payment.dispute.closed")]
    PaymentDisputeClosed,
    #[serde(rename = "recurring-payment.started")]
    RecurringPaymentStarted,
    #[serde(rename = "recurring-payment.renewed")]
    RecurringPaymentRenewed,
    #[serde(rename = "recurring-payment.ended")]
    RecurringPaymentEnded,
    #[serde(rename = "recurring-payment.cancellation.requested")]
    RecurringPaymentCancellationRequested,
    #[serde(rename = "recurring-payment.cancellation.aborted")]
    RecurringPaymentCancellationAborted,
    #[serde(rename = "validation.webhook")]
    ValidationWebhook,
}

/// Subject family of a [`WebhookType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookCategory {
    /// `payment.*`
    Payment,
    /// `recurring-payment.*`
    RecurringPayment,
    /// `validation.*`
    Validation,
}

impl WebhookType {
    /// Every event type Tebex delivers
    pub const ALL: [WebhookType; 13] = [
        Self::PaymentCompleted,
        Self::PaymentDeclined,
        Self::PaymentRefunded,
        Self::PaymentDisputeOpened,
        Self::PaymentDisputeWon,
        Self::PaymentDisputeLost,
        Self::PaymentDisputeClosed,
        Self::RecurringPaymentStarted,
        Self::RecurringPaymentRenewed,
        Self::RecurringPaymentEnded,
        Self::RecurringPaymentCancellationRequested,
        Self::RecurringPaymentCancellationAborted,
        Self::ValidationWebhook,
    ];

    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentCompleted => "payment.completed",
            Self::PaymentDeclined => "payment.declined",
            Self::PaymentRefunded => "payment.refunded",
            Self::PaymentDisputeOpened => "payment.dispute.opened",
            Self::PaymentDisputeWon => "payment.dispute.won",
            Self::PaymentDisputeLost => "payment.dispute.lost",
            Self::PaymentDisputeClosed => "payment.dispute.closed",
            Self::RecurringPaymentStarted => "recurring-payment.started",
            Self::RecurringPaymentRenewed => "recurring-payment.renewed",
            Self::RecurringPaymentEnded => "recurring-payment.ended",
            Self::RecurringPaymentCancellationRequested => {
                "recurring-payment.cancellation.requested"
            }
            Self::RecurringPaymentCancellationAborted => "recurring-payment.cancellation.aborted",
            Self::ValidationWebhook => "validation.webhook",
        }
    }

    /// Subject family, decided by the prefix of the wire name
    pub fn category(&self) -> WebhookCategory {
        let name = self.as_str();
        if name.starts_with("recurring-payment.") {
            WebhookCategory::RecurringPayment
        } else if name.starts_with("payment.") {
            WebhookCategory::Payment
        } else {
            WebhookCategory::Validation
        }
    }
}

impl fmt::Display for WebhookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookType {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| WebhookError::MalformedPayload(format!("unknown webhook type: {s}")))
    }
}

/// An authenticated Tebex webhook delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct WebhookDelivery {
    /// Unique delivery identifier
    pub id: String,

    /// Event type
    #[serde(rename = "type")]
    pub webhook_type: WebhookType,

    /// ISO-8601 timestamp, kept exactly as sent
    pub date: String,

    /// Event payload, shaped by `webhook_type`
    pub subject: WebhookSubject,

    /// Envelope fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Delivery payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WebhookSubject {
    /// Subject of `payment.*` events
    Payment(Box<PaymentSubject>),
    /// Subject of `recurring-payment.*` events
    RecurringPayment(Box<RecurringPaymentSubject>),
    /// Subject of `validation.*` events, not interpreted
    Validation(Value),
}

#[derive(Deserialize)]
struct RawEnvelope {
    id: String,
    #[serde(rename = "type")]
    webhook_type: WebhookType,
    date: String,
    subject: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawEnvelope> for WebhookDelivery {
    type Error = String;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        let subject = match raw.webhook_type.category() {
            WebhookCategory::Payment => WebhookSubject::Payment(Box::new(
                serde_json::from_value(raw.subject)
                    .map_err(|e| format!("invalid payment subject: {e}"))?,
            )),
            WebhookCategory::RecurringPayment => WebhookSubject::RecurringPayment(Box::new(
                serde_json::from_value(raw.subject)
                    .map_err(|e| format!("invalid recurring payment subject: {e}"))?,
            )),
            WebhookCategory::Validation => WebhookSubject::Validation(raw.subject),
        };

        Ok(Self {
            id: raw.id,
            webhook_type: raw.webhook_type,
            date: raw.date,
            subject,
            extra: raw.extra,
        })
    }
}

impl WebhookDelivery {
    /// Parse from raw JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(bytes).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    /// Parse `date` as an RFC 3339 timestamp
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date).ok()
    }

    /// Whether this is the endpoint validation handshake
    pub fn is_validation(&self) -> bool {
        self.webhook_type.category() == WebhookCategory::Validation
    }

    /// Payment subject, for `payment.*` events
    pub fn as_payment(&self) -> Option<&PaymentSubject> {
        match &self.subject {
            WebhookSubject::Payment(p) => Some(p),
            _ => None,
        }
    }

    /// Recurring payment subject, for `recurring-payment.*` events
    pub fn as_recurring_payment(&self) -> Option<&RecurringPaymentSubject> {
        match &self.subject {
            WebhookSubject::RecurringPayment(r) => Some(r),
            _ => None,
        }
    }
}

// =============================================================================
// Payment Types
//
// Only the identifier of a subject is required. Every nested object keeps
// unknown fields in `extra`, and fields Tebex documents as nullable are
// `Option<Option<T>>` so that `null` and absent stay distinct.
// =============================================================================

/// Subject of `payment.*` events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSubject {
    /// Transaction ID (tbx-...)
    pub transaction_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_sequence: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Listed price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,

    /// Amount actually paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_paid: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<PaymentFees>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,

    /// Coupons used, as sent by Tebex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupons: Option<Vec<Value>>,

    /// Gift cards used, as sent by Tebex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_cards: Option<Vec<Value>>,

    /// Outer `None`: field absent. `Some(None)`: field sent as `null`.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_payment_reference: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub decline_reason: Option<Option<DeclineReason>>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Status attached to payment and recurring payment subjects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Known status ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatusKind {
    Active,
    Overdue,
    Expired,
    Cancelled,
    PendingDowngrade,
    Other(u32),
}

impl PaymentStatus {
    /// Map the numeric id to a known status, `None` when no id was sent
    pub fn kind(&self) -> Option<PaymentStatusKind> {
        let kind = match self.id? {
            2 => PaymentStatusKind::Active,
            3 => PaymentStatusKind::Overdue,
            4 => PaymentStatusKind::Expired,
            5 => PaymentStatusKind::Cancelled,
            7 => PaymentStatusKind::PendingDowngrade,
            other => PaymentStatusKind::Other(other),
        };
        Some(kind)
    }
}

/// Monetary amount.
///
/// `amount` keeps the JSON number exactly as sent, so `5` and `5.0` are not
/// conflated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    /// ISO 4217 code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Money {
    /// Amount as a float, for display and arithmetic
    pub fn amount_f64(&self) -> Option<f64> {
        self.amount.as_ref().and_then(Number::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refundable: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFees {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Customer who made the payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<GameUsername>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_consent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub postal_code: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// In-game identity linked to a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameUsername {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Product line of a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<ProductVariable>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Option<String>>,
    /// Free-form data attached at checkout
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom: Option<Option<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<GameUsername>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Recurring Payment Types
// =============================================================================

/// Subject of `recurring-payment.*` events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPaymentSubject {
    /// Recurring payment reference
    pub reference: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_payment: Option<Box<PaymentSubject>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment: Option<Box<PaymentSubject>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub cancelled_at: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub cancel_reason: Option<Option<String>>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keep "present but null" distinct from "absent"
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
