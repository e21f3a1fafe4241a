//! Integration tests for HeadlessClient using wiremock

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tebex_sdk::headless::{CreateBasketRequest, HeadlessClient};
use tebex_sdk::Error;

const TOKEN: &str = "t-abc123";
const IDENT: &str = "8f3e0d5c2a";

fn create_client(server: &MockServer) -> HeadlessClient {
    HeadlessClient::with_http_client(&server.uri(), TOKEN, reqwest::Client::new()).unwrap()
}

fn account_path(rest: &str) -> String {
    format!("/accounts/{TOKEN}{rest}")
}

fn basket_json() -> Value {
    json!({
        "data": {
            "id": 190,
            "ident": IDENT,
            "complete": false,
            "email": null,
            "username": "Notch",
            "coupons": [{"coupon_code": "SPRING"}],
            "giftcards": [],
            "creator_code": "",
            "cancel_url": "https://example.com/cancel",
            "complete_url": "https://example.com/done",
            "complete_auto_redirect": false,
            "country": "GB",
            "ip": "1.2.3.4",
            "username_id": 4928,
            "base_price": 2.54,
            "sales_tax": 0.22,
            "total_price": 2.76,
            "currency": "USD",
            "packages": [{
                "qty": 2,
                "type": "single",
                "revenue_share": [],
                "id": 6276316,
                "name": "Test Package"
            }],
            "custom": {"discord_id": "1234"},
            "links": {"checkout": format!("https://pay.tebex.io/{IDENT}")}
        }
    })
}

fn package_json(id: u64) -> Value {
    json!({
        "id": id,
        "name": "Test Package",
        "description": "<p>This is a test package</p>",
        "image": null,
        "type": "single",
        "category": {"id": 2678660, "name": "Test"},
        "base_price": 1.27,
        "sales_tax": 0.11,
        "total_price": 1.38,
        "currency": "USD",
        "discount": 0,
        "disable_quantity": false,
        "disable_gifting": false,
        "expiration_date": null,
        "created_at": "2024-01-11T13:57:09+00:00",
        "updated_at": "2024-01-11T13:57:09+00:00"
    })
}

// ============================================================================
// Store
// ============================================================================

#[tokio::test]
async fn test_get_webstore() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 1234567,
                "description": "",
                "name": "Example Store",
                "webstore_url": "https://example.tebex.io",
                "currency": "USD",
                "lang": "en",
                "logo": null,
                "platform_type": "Minecraft: Java Edition",
                "platform_type_id": "minecraft",
                "created_at": "2023-06-01T10:00:00+00:00"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = create_client(&server).get_webstore().await.unwrap().into_inner();
    assert_eq!(store.name, "Example Store");
    assert_eq!(store.platform_type_id, "minecraft");
}

#[tokio::test]
async fn test_get_custom_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("/pages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1,
                "created_at": "2023-06-01T10:00:00+00:00",
                "updated_at": "2023-06-01T10:00:00+00:00",
                "account_id": 1234567,
                "title": "Rules",
                "slug": "rules",
                "private": false,
                "hidden": false,
                "disabled": false,
                "sequence": false,
                "content": "<p>Be nice</p>"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pages = create_client(&server).get_custom_pages().await.unwrap().data;
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].slug, "rules");
}

// ============================================================================
// Baskets
// ============================================================================

#[tokio::test]
async fn test_create_basket() {
    let server = MockServer::start().await;
    let request = CreateBasketRequest::new("https://example.com/done", "https://example.com/cancel")
        .with_custom("discord_id", "1234");

    Mock::given(method("POST"))
        .and(path(account_path("/baskets")))
        .and(body_json(json!({
            "complete_url": "https://example.com/done",
            "cancel_url": "https://example.com/cancel",
            "custom": {"discord_id": "1234"},
            "complete_auto_redirect": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;

    let basket = create_client(&server).create_basket(&request).await.unwrap().data;
    assert_eq!(basket.ident, IDENT);
    assert_eq!(basket.coupons[0].coupon_code, "SPRING");
    assert_eq!(basket.packages[0].qty, 2);
}

#[tokio::test]
async fn test_get_basket() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path(&format!("/baskets/{IDENT}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;

    let basket = create_client(&server).get_basket(IDENT).await.unwrap().data;
    assert_eq!(basket.total_price, 2.76);
    assert_eq!(basket.links.payment, None);
}

#[tokio::test]
async fn test_get_basket_auth_passes_return_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path(&format!("/baskets/{IDENT}/auth"))))
        .and(query_param("returnUrl", "https://example.com/store?step=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "FiveM", "url": "https://auth.tebex.io/fivem"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let links = create_client(&server)
        .get_basket_auth(IDENT, "https://example.com/store?step=2")
        .await
        .unwrap();
    assert_eq!(links[0].name, "FiveM");
}

// ============================================================================
// Catalogue
// ============================================================================

#[tokio::test]
async fn test_get_categories_with_packages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("/categories")))
        .and(query_param("includePackages", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 2678660,
                "name": "Test",
                "slug": "test",
                "description": "",
                "packages": [package_json(6276316)],
                "order": 0,
                "display_type": "list"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let categories = create_client(&server).get_categories(true).await.unwrap().data;
    assert_eq!(categories[0].packages[0].id, 6276316);
}

#[tokio::test]
async fn test_get_category_without_packages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("/categories/2678660")))
        .and(query_param_is_missing("includePackages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 2678660, "name": "Test", "order": 3, "display_type": "grid"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let category = create_client(&server)
        .get_category(2678660, false)
        .await
        .unwrap()
        .data;
    assert!(category.packages.is_empty());
    assert_eq!(category.order, 3);
}

#[tokio::test]
async fn test_get_package_with_pricing_context() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("/packages/6276316")))
        .and(query_param("ipAddress", "1.2.3.4"))
        .and(query_param("basketIdent", IDENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": package_json(6276316)})))
        .expect(1)
        .mount(&server)
        .await;

    let package = create_client(&server)
        .get_package(6276316, Some("1.2.3.4"), Some(IDENT))
        .await
        .unwrap()
        .data;
    assert_eq!(package.total_price, 1.38);
}

#[tokio::test]
async fn test_get_all_packages_skips_empty_context() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("/packages")))
        .and(query_param_is_missing("ipAddress"))
        .and(query_param_is_missing("basketIdent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [package_json(1), package_json(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let packages = create_client(&server)
        .get_all_packages(Some(""), None)
        .await
        .unwrap()
        .data;
    assert_eq!(packages.len(), 2);
}

// ============================================================================
// Codes, gift cards and coupons
// ============================================================================

#[tokio::test]
async fn test_apply_creator_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/creator-codes"))))
        .and(body_json(json!({"creator_code": "streamer"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;

    create_client(&server)
        .apply_creator_code(IDENT, "streamer")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remove_creator_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/creator-codes/remove"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;

    create_client(&server).remove_creator_code(IDENT).await.unwrap();
}

#[tokio::test]
async fn test_gift_card_apply_and_remove() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/giftcards"))))
        .and(body_json(json!({"card_number": "GC-0001"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/giftcards/remove"))))
        .and(body_json(json!({"card_number": "GC-0001"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    client.apply_gift_card(IDENT, "GC-0001").await.unwrap();
    client.remove_gift_card(IDENT, "GC-0001").await.unwrap();
}

#[tokio::test]
async fn test_coupon_apply_and_remove() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/coupons"))))
        .and(body_json(json!({"coupon_code": "SPRING"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/coupons/remove"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let basket = client.apply_coupon(IDENT, "SPRING").await.unwrap().data;
    assert_eq!(basket.coupons.len(), 1);
    client.remove_coupon(IDENT).await.unwrap();
}

// ============================================================================
// Basket packages
// ============================================================================

#[tokio::test]
async fn test_basket_package_routes_skip_account_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/baskets/{IDENT}/packages")))
        .and(body_json(json!({"package_id": 6276316, "quantity": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/baskets/{IDENT}/packages/remove")))
        .and(body_json(json!({"package_id": 6276316})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/baskets/{IDENT}/packages/6276316")))
        .and(body_json(json!({"quantity": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    client.add_package(IDENT, 6276316, 2).await.unwrap();
    client.remove_package(IDENT, 6276316).await.unwrap();
    client.update_package_quantity(IDENT, 6276316, 5).await.unwrap();
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_unknown_token_surfaces_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("/categories")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "https://httpstatuses.io/404",
            "title": "Unable to find a webstore with the given public token",
            "status": 404,
            "detail": "",
            "instance": ""
        })))
        .mount(&server)
        .await;

    let err = create_client(&server).get_categories(false).await.unwrap_err();
    assert_eq!(err.as_upstream().map(|p| p.status), Some(404));
}

#[tokio::test]
async fn test_remove_coupon_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(account_path(&format!("/baskets/{IDENT}/coupons/remove"))))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = create_client(&server).remove_coupon(IDENT).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 500, .. }));
}
