#![allow(missing_docs)]

//! Headless API response and request bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Coupon, GiftCard};

/// `{"data": ...}` envelope wrapping every Headless response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data<T> {
    /// Wrapped payload
    pub data: T,
}

impl<T> Data<T> {
    /// Unwrap the payload
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Response of `GET /accounts/{token}`
pub type WebstoreResponse = Data<Webstore>;
/// Response of `GET /accounts/{token}/pages`
pub type PagesResponse = Data<Vec<CmsPage>>;
/// Response of the basket endpoints
pub type BasketResponse = Data<Basket>;
/// Response of `GET /accounts/{token}/categories`
pub type CategoriesResponse = Data<Vec<Category>>;
/// Response of `GET /accounts/{token}/categories/{id}`
pub type CategoryResponse = Data<Category>;
/// Response of `GET /accounts/{token}/packages/{id}`
pub type PackageResponse = Data<Package>;
/// Response of `GET /accounts/{token}/packages`
pub type PackagesResponse = Data<Vec<Package>>;

/// Public description of a webstore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webstore {
    /// Numeric store id
    pub id: u64,
    /// HTML description
    #[serde(default)]
    pub description: String,
    /// Display name
    pub name: String,
    /// Public URL, e.g. `https://example.tebex.io`
    pub webstore_url: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Language code, e.g. `en`
    pub lang: String,
    /// Logo URL
    #[serde(default)]
    pub logo: Option<String>,
    /// Platform description, e.g. `Minecraft: Java Edition`
    pub platform_type: String,
    /// Platform id, e.g. `minecraft`
    pub platform_type_id: String,
    /// Creation time, RFC 3339
    pub created_at: String,
}

/// Custom CMS page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsPage {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub account_id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub disabled: bool,
    /// Sort position; typed as a boolean by some API versions
    #[serde(default)]
    pub sequence: Value,
    /// HTML content
    #[serde(default)]
    pub content: String,
}

/// Basket as seen by the Headless API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// Numeric basket id
    pub id: u64,
    /// Unique basket identifier used in URLs
    pub ident: String,
    /// Whether checkout has completed
    pub complete: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default)]
    pub giftcards: Vec<GiftCard>,
    #[serde(default)]
    pub creator_code: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default)]
    pub complete_url: Option<String>,
    #[serde(default)]
    pub complete_auto_redirect: bool,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default)]
    pub country: Option<String>,
    /// Customer IP address
    #[serde(default)]
    pub ip: Option<String>,
    /// Platform user id of the logged-in customer
    #[serde(default)]
    pub username_id: Option<Value>,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub sales_tax: f64,
    #[serde(default)]
    pub total_price: f64,
    /// ISO 4217 currency code
    pub currency: String,
    #[serde(default)]
    pub packages: Vec<BasketPackage>,
    /// Integrator data echoed back in webhooks
    #[serde(default)]
    pub custom: Value,
    pub links: BasketLinks,
}

/// Package line of a headless basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketPackage {
    /// Quantity
    pub qty: u32,
    /// Package type, e.g. `single`
    #[serde(rename = "type")]
    pub package_type: String,
    /// Revenue share settings
    #[serde(default)]
    pub revenue_share: Vec<RevenueShare>,
    /// Fields not modelled here (package id, name, pricing)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Revenue share entry of a headless basket package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShare {
    /// Destination wallet reference
    pub wallet_ref: String,
    /// Absolute amount
    pub amount: f64,
    /// Gateway fee in percent
    pub gateway_fee_percent: f64,
}

/// Links returned with a headless basket
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasketLinks {
    /// Payment URL
    #[serde(default)]
    pub payment: Option<String>,
    /// Checkout URL
    #[serde(default)]
    pub checkout: Option<String>,
}

/// Login option for a basket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthLink {
    /// Platform name, e.g. `FiveM`
    pub name: String,
    /// URL the customer visits to log in
    pub url: String,
}

/// Store category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// HTML description
    #[serde(default)]
    pub description: String,
    /// Only populated when requested with `includePackages`
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Sort position
    #[serde(default)]
    pub order: i64,
    /// Display style, e.g. `list`
    #[serde(default)]
    pub display_type: String,
}

/// Category reference inside a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCategory {
    pub id: u64,
    pub name: String,
}

/// Purchasable package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: u64,
    pub name: String,
    /// HTML description
    #[serde(default)]
    pub description: String,
    /// Image URL
    #[serde(default)]
    pub image: Option<String>,
    /// Package type, e.g. `single` or `subscription`
    #[serde(rename = "type")]
    pub package_type: String,
    pub category: PackageCategory,
    pub base_price: f64,
    #[serde(default)]
    pub sales_tax: f64,
    pub total_price: f64,
    /// ISO 4217 currency code
    pub currency: String,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub disable_quantity: bool,
    #[serde(default)]
    pub disable_gifting: bool,
    #[serde(default)]
    pub expiration_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /accounts/{token}/baskets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBasketRequest {
    /// Where the customer lands after paying
    pub complete_url: String,
    /// Where the customer lands after abandoning checkout
    pub cancel_url: String,
    /// Integrator data echoed back in webhooks
    pub custom: Map<String, Value>,
    /// Redirect to `complete_url` without a confirmation page
    pub complete_auto_redirect: bool,
}

impl CreateBasketRequest {
    /// Basket with no custom data and no auto redirect
    pub fn new(complete_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        Self {
            complete_url: complete_url.into(),
            cancel_url: cancel_url.into(),
            custom: Map::new(),
            complete_auto_redirect: false,
        }
    }

    /// Attach one custom field
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Skip the confirmation page after payment
    pub fn with_auto_redirect(mut self, enabled: bool) -> Self {
        self.complete_auto_redirect = enabled;
        self
    }
}

#[derive(Serialize)]
pub(crate) struct CreatorCodeBody<'a> {
    pub creator_code: &'a str,
}

#[derive(Serialize)]
pub(crate) struct GiftCardBody<'a> {
    pub card_number: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CouponBody<'a> {
    pub coupon_code: &'a str,
}

#[derive(Serialize)]
pub(crate) struct AddPackageBody {
    pub package_id: u64,
    pub quantity: u32,
}

#[derive(Serialize)]
pub(crate) struct RemovePackageBody {
    pub package_id: u64,
}

#[derive(Serialize)]
pub(crate) struct QuantityBody {
    pub quantity: u32,
}
