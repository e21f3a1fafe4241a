//! Integration tests for webhook admission
//!
//! Covers the end-to-end admission path: allow-list, signature header,
//! signature check, then envelope parsing.

use hmac::{Hmac, Mac};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use tebex_sdk::error::WebhookErrorKind;
use tebex_sdk::webhooks::{
    PaymentStatusKind, RawDelivery, SignatureScheme, WebhookAuthenticator, WebhookSecret,
    WebhookSubject, WebhookType,
};
use tebex_sdk::{Error, WebhookError};

const SECRET: &str = "secretKey";
const VALID_IP_1: &str = "18.209.80.3";
const VALID_IP_2: &str = "54.87.231.232";
const INVALID_IP: &str = "192.168.1.1";
const BODY: &str = r#"{"id":"123","type":"payment.completed","date":"2023-10-10T12:21:47+00:00","subject":{"transaction_id":"tbx-xxxxxxxx"}}"#;

/// Reference implementation of the Tebex signature, built from primitives
fn reference_signature(secret: &str, body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(&digest);
    hex::encode(mac.finalize().into_bytes())
}

fn authenticator() -> WebhookAuthenticator {
    WebhookAuthenticator::new(SECRET).unwrap()
}

// ============================================================================
// Admission scenarios
// ============================================================================

#[test]
fn test_valid_delivery_is_admitted_unchanged() {
    let auth = authenticator();
    let signature = reference_signature(SECRET, BODY.as_bytes());

    let delivery = auth
        .admit(RawDelivery::new(BODY.as_bytes(), Some(&signature), VALID_IP_1))
        .unwrap();

    assert_eq!(delivery.id, "123");
    assert_eq!(delivery.webhook_type, WebhookType::PaymentCompleted);
    assert_eq!(
        delivery.as_payment().map(|p| p.transaction_id.as_str()),
        Some("tbx-xxxxxxxx")
    );

    let original: Value = serde_json::from_str(BODY).unwrap();
    assert_eq!(serde_json::to_value(&delivery).unwrap(), original);
}

#[test]
fn test_both_tebex_addresses_are_accepted() {
    let auth = authenticator();
    let signature = auth.sign(BODY.as_bytes());

    for ip in [VALID_IP_1, VALID_IP_2] {
        assert!(auth.admit_parts(BODY.as_bytes(), Some(&signature), ip).is_ok());
    }
}

#[test]
fn test_unknown_address_is_rejected() {
    let auth = authenticator();
    let signature = auth.sign(BODY.as_bytes());

    let err = auth
        .admit_parts(BODY.as_bytes(), Some(&signature), INVALID_IP)
        .unwrap_err();
    assert_eq!(err.kind(), WebhookErrorKind::OriginRejected);
    assert_eq!(err.status_code(), 403);
}

#[test]
fn test_absent_signature_is_missing() {
    let err = authenticator()
        .admit_parts(BODY.as_bytes(), None, VALID_IP_1)
        .unwrap_err();
    assert_eq!(err, WebhookError::SignatureMissing);
}

#[test]
fn test_wrong_signature_is_invalid() {
    let err = authenticator()
        .admit_parts(BODY.as_bytes(), Some("invalidsignature"), VALID_IP_1)
        .unwrap_err();
    assert_eq!(err, WebhookError::SignatureInvalid);
}

#[test]
fn test_verify_signature_directly() {
    let auth = authenticator();
    let signature = reference_signature(SECRET, BODY.as_bytes());

    assert!(auth.verify_signature(BODY.as_bytes(), &signature));
    assert!(!auth.verify_signature(BODY.as_bytes(), "invalidsignature"));
}

#[test]
fn test_origin_checked_before_signature() {
    // bad IP and no signature: the IP failure wins
    let err = authenticator()
        .admit_parts(BODY.as_bytes(), None, INVALID_IP)
        .unwrap_err();
    assert_eq!(err.kind(), WebhookErrorKind::OriginRejected);
}

#[test]
fn test_signature_checked_before_parsing() {
    // garbage body with a wrong signature reports the signature, not the JSON
    let err = authenticator()
        .admit_parts(b"not json", Some("00"), VALID_IP_1)
        .unwrap_err();
    assert_eq!(err, WebhookError::SignatureInvalid);
}

#[test]
fn test_body_altered_after_signing_is_rejected() {
    let auth = authenticator();
    let signature = auth.sign(BODY.as_bytes());
    let tampered = BODY.replace("tbx-xxxxxxxx", "tbx-yyyyyyyy");

    let err = auth
        .admit_parts(tampered.as_bytes(), Some(&signature), VALID_IP_1)
        .unwrap_err();
    assert_eq!(err, WebhookError::SignatureInvalid);
}

#[test]
fn test_webhook_error_converts_into_crate_error() {
    let err: Error = authenticator()
        .admit_parts(BODY.as_bytes(), None, VALID_IP_1)
        .unwrap_err()
        .into();
    assert_eq!(err.as_webhook(), Some(&WebhookError::SignatureMissing));
}

// ============================================================================
// Injected signature scheme
// ============================================================================

/// Deterministic stand-in that signs with the body length
struct LengthScheme;

impl SignatureScheme for LengthScheme {
    fn sign(&self, _secret: &WebhookSecret, body: &[u8]) -> String {
        format!("len-{}", body.len())
    }
}

#[test]
fn test_fake_scheme_replaces_hmac() {
    let auth = authenticator().with_scheme(LengthScheme);
    let signature = format!("len-{}", BODY.len());

    let delivery = auth
        .admit_parts(BODY.as_bytes(), Some(&signature), VALID_IP_2)
        .unwrap();
    assert_eq!(delivery.id, "123");

    let real = reference_signature(SECRET, BODY.as_bytes());
    assert_eq!(
        auth.admit_parts(BODY.as_bytes(), Some(&real), VALID_IP_2),
        Err(WebhookError::SignatureInvalid)
    );
}

// ============================================================================
// Full payloads
// ============================================================================

fn full_payment_completed() -> Value {
    json!({
        "id": "7a2f3c1e-9b1d-4e6f-8a2b-3c4d5e6f7a8b",
        "type": "payment.completed",
        "date": "2024-03-05T16:12:45+00:00",
        "subject": {
            "transaction_id": "tbx-26929122a56954-0e15be",
            "status": {"id": 1, "description": "Complete"},
            "payment_sequence": "oneoff",
            "created_at": "2024-03-05T16:12:40+00:00",
            "price": {"amount": 5.35, "currency": "USD"},
            "price_paid": {"amount": 5.35, "currency": "USD"},
            "payment_method": {"name": "Test Payments", "refundable": true},
            "fees": {
                "tax": {"amount": 0.25, "currency": "USD"},
                "gateway": {"amount": 0.15, "currency": "USD"}
            },
            "customer": {
                "first_name": "Tebex",
                "last_name": "Integrations",
                "email": "integrations@tebex.io",
                "ip": "1.2.3.4",
                "username": {"id": "4b8a6c9e", "username": "Tebex"},
                "marketing_consent": false,
                "country": "GB",
                "postal_code": "BA1 1AA"
            },
            "products": [{
                "id": 6276316,
                "name": "Test Package",
                "quantity": 1,
                "base_price": {"amount": 5.35, "currency": "USD"},
                "paid_price": {"amount": 5.35, "currency": "USD"},
                "variables": [],
                "expires_at": null,
                "custom": null,
                "username": {"id": "4b8a6c9e", "username": "Tebex"}
            }],
            "coupons": [],
            "gift_cards": [],
            "recurring_payment_reference": null,
            "decline_reason": null,
            "revenue_share": []
        }
    })
}

#[test]
fn test_full_payment_round_trips() {
    let auth = authenticator();
    let body = serde_json::to_vec(&full_payment_completed()).unwrap();
    let signature = auth.sign(&body);

    let delivery = auth.admit_parts(&body, Some(&signature), VALID_IP_1).unwrap();
    let payment = delivery.as_payment().unwrap();

    assert_eq!(payment.recurring_payment_reference, Some(None));
    assert_eq!(payment.decline_reason, Some(None));
    assert_eq!(
        payment.customer.as_ref().and_then(|c| c.country.as_deref()),
        Some("GB")
    );
    assert!(payment.extra.contains_key("revenue_share"));

    assert_eq!(serde_json::to_value(&delivery).unwrap(), full_payment_completed());
}

#[test]
fn test_admitted_delivery_keeps_every_field_as_sent() {
    let payload = json!({
        "id": "c0ffee",
        "type": "payment.completed",
        "date": "2024-03-05T16:12:45+00:00",
        "account": {"id": 1234567, "name": "Example Store"},
        "subject": {
            "transaction_id": "tbx-1",
            "price": {"amount": 5, "currency": "USD"},
            "customer": {"email": "integrations@tebex.io", "phone": "+44 1225 000000"},
            "products": [{"id": 1, "name": "VIP", "quantity": 1}]
        }
    });
    let auth = authenticator();
    let body = serde_json::to_vec(&payload).unwrap();
    let signature = auth.sign(&body);

    let delivery = auth.admit_parts(&body, Some(&signature), VALID_IP_1).unwrap();
    let reserialized = serde_json::to_vec(&delivery).unwrap();

    assert_eq!(serde_json::to_value(&delivery).unwrap(), payload);
    // integer amounts are not widened to floats
    assert!(String::from_utf8(reserialized).unwrap().contains(r#""amount":5,"#));
}

#[test]
fn test_recurring_payment_delivery() {
    let payload = json!({
        "id": "5d0e7a4c",
        "type": "recurring-payment.cancellation.requested",
        "date": "2024-03-05T16:12:45+00:00",
        "subject": {
            "reference": "tbx-r-88",
            "created_at": "2024-02-05T16:12:45+00:00",
            "next_payment_at": "2024-04-05T16:12:45+00:00",
            "status": {"id": 7, "description": "Pending Downgrade"},
            "fail_count": 0,
            "price": {"amount": 9.99, "currency": "EUR"},
            "cancelled_at": null,
            "cancel_reason": "Too expensive"
        }
    });
    let auth = authenticator();
    let body = serde_json::to_vec(&payload).unwrap();
    let signature = auth.sign(&body);

    let delivery = auth.admit_parts(&body, Some(&signature), VALID_IP_2).unwrap();
    let recurring = delivery.as_recurring_payment().unwrap();

    assert_eq!(recurring.reference, "tbx-r-88");
    assert_eq!(
        recurring.status.as_ref().and_then(|s| s.kind()),
        Some(PaymentStatusKind::PendingDowngrade)
    );
    assert_eq!(recurring.cancel_reason, Some(Some("Too expensive".to_string())));
    assert_eq!(serde_json::to_value(&delivery).unwrap(), payload);
}

#[test]
fn test_validation_delivery() {
    let body = br#"{"id":"9c1b","type":"validation.webhook","date":"2024-03-05T16:12:45+00:00","subject":{"anything":["goes"]}}"#;
    let auth = authenticator();
    let signature = auth.sign(body);

    let delivery = auth.admit_parts(body, Some(&signature), VALID_IP_1).unwrap();
    assert!(delivery.is_validation());
    assert!(matches!(delivery.subject, WebhookSubject::Validation(_)));
    assert!(delivery.parsed_date().is_some());
}

#[test]
fn test_authenticated_but_malformed_envelope() {
    let auth = authenticator();
    let body = br#"{"id":"1","type":"payment.completed","date":"2024-03-05T16:12:45+00:00","subject":{}}"#;
    let signature = auth.sign(body);

    let err = auth.admit_parts(body, Some(&signature), VALID_IP_1).unwrap_err();
    assert_eq!(err.kind(), WebhookErrorKind::MalformedPayload);
    assert_eq!(err.status_code(), 400);
}
