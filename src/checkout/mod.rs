//! Tebex Checkout API
//!
//! Server-side API for building baskets, starting checkouts, and managing
//! payments and subscriptions. Requires the project id and private key, so it
//! must never run in a browser.
//!
//! # Example
//!
//! ```rust,no_run
//! use tebex_sdk::checkout::{CheckoutClient, CheckoutRequest, CreateBasketRequest};
//! use tebex_sdk::types::CheckoutItem;
//!
//! # async fn run() -> tebex_sdk::Result<()> {
//! let client = CheckoutClient::new("1234567", "private-key")?;
//! let basket = client
//!     .create_checkout(&CheckoutRequest {
//!         basket: CreateBasketRequest {
//!             return_url: "https://example.com/return".into(),
//!             complete_url: "https://example.com/thanks".into(),
//!             email: "customer@example.com".into(),
//!             ..Default::default()
//!         },
//!         items: vec![CheckoutItem::new(6276316).with_quantity(2)],
//!         sale: None,
//!     })
//!     .await?;
//! println!("pay at {}", basket.links.checkout);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::{CheckoutClient, DEFAULT_CHECKOUT_URL};
pub use types::{
    AddPackageRequest, AddSaleRequest, CheckoutBasket, CheckoutRequest, CreateBasketRequest,
    PackageType, Payment, RecurringPayment, RecurringPaymentState, RegisterWebhookEndpointRequest,
    UpdateRecurringPaymentRequest, UpdateRecurringPaymentStatusRequest,
};
