//! Tebex Headless API
//!
//! Public, browser-safe API for building a custom storefront: store details,
//! categories, packages and baskets. Authenticated only by the store's public
//! token.

pub mod client;
pub mod types;

pub use client::{HeadlessClient, DEFAULT_HEADLESS_URL};
pub use types::{
    AuthLink, Basket, BasketPackage, BasketResponse, CategoriesResponse, Category,
    CategoryResponse, CmsPage, CreateBasketRequest, Data, Package, PackageResponse,
    PackagesResponse, PagesResponse, Webstore, WebstoreResponse,
};
