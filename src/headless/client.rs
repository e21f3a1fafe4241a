//! Headless API client

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::headless::types::{
    AddPackageBody, AuthLink, BasketResponse, CategoriesResponse, CategoryResponse,
    CouponBody, CreateBasketRequest, CreatorCodeBody, GiftCardBody, PackageResponse,
    PackagesResponse, PagesResponse, QuantityBody, RemovePackageBody, WebstoreResponse,
};
use crate::rest;

/// Production Headless API base URL
pub const DEFAULT_HEADLESS_URL: &str = "https://headless.tebex.io/api";

/// Client for the public Headless API.
///
/// Identifies the store by its public token, which is embedded in request
/// paths. The token is kept out of logs and `Debug` output.
#[derive(Debug, Clone)]
pub struct HeadlessClient {
    base_url: Url,
    token: Arc<SecretString>,
    http_client: Client,
}

impl HeadlessClient {
    /// Create a client against the production API with the default timeout
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(token, rest::DEFAULT_TIMEOUT)
    }

    /// Create a client against the production API
    pub fn with_timeout(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: rest::parse_base_url(DEFAULT_HEADLESS_URL)?,
            token: Arc::new(non_empty_token(token.into())?),
            http_client: rest::build_client(timeout)?,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing)
    pub fn with_http_client(
        base_url: &str,
        token: impl Into<String>,
        http_client: Client,
    ) -> Result<Self> {
        Ok(Self {
            base_url: rest::parse_base_url(base_url)?,
            token: Arc::new(non_empty_token(token.into())?),
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
    // Store
    // =========================================================================

    /// `GET /accounts/{token}`
    pub async fn get_webstore(&self) -> Result<WebstoreResponse> {
        self.send(self.account_request(Method::GET, &[])).await
    }

    /// `GET /accounts/{token}/pages`
    pub async fn get_custom_pages(&self) -> Result<PagesResponse> {
        self.send(self.account_request(Method::GET, &["pages"])).await
    }

    // =========================================================================
    // Baskets
    // =========================================================================

    /// `GET /accounts/{token}/baskets/{ident}`
    pub async fn get_basket(&self, ident: &str) -> Result<BasketResponse> {
        self.send(self.account_request(Method::GET, &["baskets", ident]))
            .await
    }

    /// `POST /accounts/{token}/baskets`
    pub async fn create_basket(&self, request: &CreateBasketRequest) -> Result<BasketResponse> {
        self.send(self.account_request(Method::POST, &["baskets"]).json(request))
            .await
    }

    /// `GET /accounts/{token}/baskets/{ident}/auth?returnUrl=...`
    ///
    /// Lists the login options the customer can use for this basket.
    pub async fn get_basket_auth(&self, ident: &str, return_url: &str) -> Result<Vec<AuthLink>> {
        let request = self
            .account_request(Method::GET, &["baskets", ident, "auth"])
            .query(&[("returnUrl", return_url)]);
        self.send(request).await
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// `GET /accounts/{token}/categories`
    pub async fn get_categories(&self, include_packages: bool) -> Result<CategoriesResponse> {
        let request = self.account_request(Method::GET, &["categories"]);
        self.send(with_include_packages(request, include_packages))
            .await
    }

    /// `GET /accounts/{token}/categories/{id}`
    pub async fn get_category(
        &self,
        category_id: u64,
        include_packages: bool,
    ) -> Result<CategoryResponse> {
        let category_id = category_id.to_string();
        let request = self.account_request(Method::GET, &["categories", &category_id]);
        self.send(with_include_packages(request, include_packages))
            .await
    }

    /// `GET /accounts/{token}/packages/{id}`
    ///
    /// `ip_address` and `basket_ident` let Tebex price the package for a
    /// specific customer.
    pub async fn get_package(
        &self,
        package_id: u64,
        ip_address: Option<&str>,
        basket_ident: Option<&str>,
    ) -> Result<PackageResponse> {
        let package_id = package_id.to_string();
        let request = self.account_request(Method::GET, &["packages", &package_id]);
        self.send(with_pricing_context(request, ip_address, basket_ident))
            .await
    }

    /// `GET /accounts/{token}/packages`
    pub async fn get_all_packages(
        &self,
        ip_address: Option<&str>,
        basket_ident: Option<&str>,
    ) -> Result<PackagesResponse> {
        let request = self.account_request(Method::GET, &["packages"]);
        self.send(with_pricing_context(request, ip_address, basket_ident))
            .await
    }

    // =========================================================================
    // Codes, gift cards and coupons
    // =========================================================================

    /// `POST /accounts/{token}/baskets/{ident}/creator-codes`
    pub async fn apply_creator_code(&self, ident: &str, creator_code: &str) -> Result<BasketResponse> {
        let request = self
            .account_request(Method::POST, &["baskets", ident, "creator-codes"])
            .json(&CreatorCodeBody { creator_code });
        self.send(request).await
    }

    /// `POST /accounts/{token}/baskets/{ident}/creator-codes/remove`
    pub async fn remove_creator_code(&self, ident: &str) -> Result<BasketResponse> {
        let request =
            self.account_request(Method::POST, &["baskets", ident, "creator-codes", "remove"]);
        self.send(request).await
    }

    /// `POST /accounts/{token}/baskets/{ident}/giftcards`
    pub async fn apply_gift_card(&self, ident: &str, card_number: &str) -> Result<BasketResponse> {
        let request = self
            .account_request(Method::POST, &["baskets", ident, "giftcards"])
            .json(&GiftCardBody { card_number });
        self.send(request).await
    }

    /// `POST /accounts/{token}/baskets/{ident}/giftcards/remove`
    pub async fn remove_gift_card(&self, ident: &str, card_number: &str) -> Result<()> {
        let request = self
            .account_request(Method::POST, &["baskets", ident, "giftcards", "remove"])
            .json(&GiftCardBody { card_number });
        rest::empty_response(request.send().await?).await
    }

    /// `POST /accounts/{token}/baskets/{ident}/coupons`
    pub async fn apply_coupon(&self, ident: &str, coupon_code: &str) -> Result<BasketResponse> {
        let request = self
            .account_request(Method::POST, &["baskets", ident, "coupons"])
            .json(&CouponBody { coupon_code });
        self.send(request).await
    }

    /// `POST /accounts/{token}/baskets/{ident}/coupons/remove`
    pub async fn remove_coupon(&self, ident: &str) -> Result<()> {
        let request =
            self.account_request(Method::POST, &["baskets", ident, "coupons", "remove"]);
        rest::empty_response(request.send().await?).await
    }

    // =========================================================================
    // Basket packages (not scoped to the account token)
    // =========================================================================

    /// `POST /baskets/{ident}/packages`
    pub async fn add_package(
        &self,
        ident: &str,
        package_id: u64,
        quantity: u32,
    ) -> Result<BasketResponse> {
        let request = self
            .basket_request(Method::POST, &["baskets", ident, "packages"])
            .json(&AddPackageBody {
                package_id,
                quantity,
            });
        self.send(request).await
    }

    /// `POST /baskets/{ident}/packages/remove`
    pub async fn remove_package(&self, ident: &str, package_id: u64) -> Result<BasketResponse> {
        let request = self
            .basket_request(Method::POST, &["baskets", ident, "packages", "remove"])
            .json(&RemovePackageBody { package_id });
        self.send(request).await
    }

    /// `PUT /baskets/{ident}/packages/{package_id}`
    pub async fn update_package_quantity(
        &self,
        ident: &str,
        package_id: u64,
        quantity: u32,
    ) -> Result<BasketResponse> {
        let package_id = package_id.to_string();
        let request = self
            .basket_request(Method::PUT, &["baskets", ident, "packages", &package_id])
            .json(&QuantityBody { quantity });
        self.send(request).await
    }

    // =========================================================================
    // Internal HTTP Methods
    // =========================================================================

    fn account_request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        debug!(method = %method, route = %segments.join("/"), "Headless API request");
        let mut path = vec!["accounts", self.token.expose_secret()];
        path.extend_from_slice(segments);
        self.http_client
            .request(method, rest::endpoint(&self.base_url, &path))
    }

    fn basket_request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        debug!(method = %method, route = %segments.join("/"), "Headless API request");
        self.http_client
            .request(method, rest::endpoint(&self.base_url, segments))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        rest::json_response(request.send().await?).await
    }
}

fn non_empty_token(token: String) -> Result<SecretString> {
    if token.is_empty() {
        return Err(Error::config("headless public token cannot be empty"));
    }
    Ok(SecretString::from(token))
}

fn with_include_packages(request: RequestBuilder, include_packages: bool) -> RequestBuilder {
    if include_packages {
        request.query(&[("includePackages", "1")])
    } else {
        request
    }
}

fn with_pricing_context(
    request: RequestBuilder,
    ip_address: Option<&str>,
    basket_ident: Option<&str>,
) -> RequestBuilder {
    let params: Vec<(&str, &str)> = [("ipAddress", ip_address), ("basketIdent", basket_ident)]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect();

    if params.is_empty() {
        request
    } else {
        request.query(&params)
    }
}
