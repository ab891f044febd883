use std::convert::Infallible;
use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::{json, Value};
use shopagent_catalog::{CatalogCache, Slot};
use shopagent_core::{Environment, ExternalConfig, Product, StripeConfig, Variant};
use shopagent_scraper::{RetryPolicy, ShopifyAdminClient};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::signature::compute_signature;

const WEBHOOK_SECRET: &str = "whsec_test";

fn test_config(dir: &Path, webhook_secret: Option<&str>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "info".to_owned(),
        products_path: dir.join("products.json"),
        external_products_path: dir.join("external_products.json"),
        refresh_interval_secs: 900,
        shopify: None,
        webhook_secret: webhook_secret.map(str::to_owned),
        stripe: StripeConfig {
            secret_key: None,
            publishable_key: Some("pk_test_abc".to_owned()),
            currency: "usd".to_owned(),
        },
        external: ExternalConfig {
            stores: Vec::new(),
            max_products: Some(300),
            scraper_cmd: None,
        },
        scraper_request_timeout_secs: 5,
        scraper_user_agent: "shopagent-test/0.1".to_owned(),
        scraper_max_retries: 0,
        scraper_retry_backoff_base_secs: 0,
    }
}

fn product(id: &str, title: &str, tags: &str, inventory: i64) -> Product {
    Product {
        id: id.to_owned(),
        title: title.to_owned(),
        body_html: Some("<p>A &amp; B</p>".to_owned()),
        vendor: None,
        product_type: None,
        tags: tags.to_owned(),
        status: "active".to_owned(),
        variants: vec![Variant {
            id: format!("{id}0"),
            product_id: Some(id.to_owned()),
            title: "Default Title".to_owned(),
            price: "12.50".to_owned(),
            inventory_quantity: inventory,
            available: inventory > 0,
            sku: None,
        }],
        image: None,
        images: Vec::new(),
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    cache: Arc<CatalogCache>,
    app: Router,
}

async fn harness_with(
    webhook_secret: Option<&str>,
    shopify: Option<ShopifyAdminClient>,
    products: Vec<Product>,
) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Arc::new(test_config(dir.path(), webhook_secret));
    let cache = Arc::new(CatalogCache::new(
        config.products_path.clone(),
        config.external_products_path.clone(),
    ));
    if !products.is_empty() {
        cache
            .refresh_slot(Slot::Shopify, move || async move { Ok::<_, Infallible>(products) })
            .await
            .expect("seed catalog");
    }

    let refresher = Arc::new(Refresher::new(Arc::clone(&cache), shopify, None));
    let checkout = Arc::new(Checkout::from_config(&config.stripe, 5).expect("checkout"));
    let app = build_app(AppState {
        config,
        refresher,
        checkout,
    });
    Harness {
        _dir: dir,
        cache,
        app,
    }
}

async fn harness(products: Vec<Product>) -> Harness {
    harness_with(Some(WEBHOOK_SECRET), None, products).await
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("bad_request", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("unauthorized", StatusCode::UNAUTHORIZED),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "msg").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[tokio::test]
async fn health_reports_slot_sizes_and_echoes_request_id() {
    let h = harness(vec![product("1", "Red Mug", "kitchen", 3)]).await;

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["products"], 1);
    assert_eq!(json["data"]["external_products"], 0);
    assert_eq!(json["meta"]["request_id"], "req-abc");
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let h = harness(Vec::new()).await;
    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/config")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("request id header");
    assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
}

#[tokio::test]
async fn config_reports_mock_checkout() {
    let h = harness(Vec::new()).await;
    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/config")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({"publishableKey": "pk_test_abc", "stripeConfigured": false})
    );
}

#[tokio::test]
async fn agent_returns_best_match_and_mock_secret() {
    let h = harness(vec![
        product("1", "Red Mug", "kitchen", 3),
        product("2", "Blue Plate", "", 3),
    ])
    .await;

    let response = h
        .app
        .oneshot(post_json("/agent", r#"{"query": "red mug"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["product"]["id"], "1");
    assert_eq!(json["product"]["title"], "Red Mug");
    assert_eq!(json["product"]["description"], "A & B");
    assert_eq!(json["product"]["price_display"], "$12.50");
    assert_eq!(json["payment_intent_client_secret"], "pi_mock_1_secret_mock");
}

#[tokio::test]
async fn agent_empty_query_returns_first_in_stock_product() {
    let h = harness(vec![
        product("1", "Sold Out", "", 0),
        product("2", "Blue Plate", "", 1),
        product("3", "Green Cup", "", 1),
    ])
    .await;

    let response = h
        .app
        .oneshot(post_json("/agent", r#"{"query": ""}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["product"]["id"], "2");
}

#[tokio::test]
async fn agent_rejects_malformed_bodies() {
    for body in ["not json", r#"{"q": "mug"}"#, r#"{"query": 42}"#] {
        let h = harness(vec![product("1", "Red Mug", "", 1)]).await;
        let response = h
            .app
            .oneshot(post_json("/agent", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn agent_returns_404_when_nothing_is_in_stock() {
    let h = harness(vec![product("1", "Red Mug", "", 0)]).await;
    let response = h
        .app
        .oneshot(post_json("/agent", r#"{"query": "red mug"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn agent_free_product_gets_mock_intent() {
    let mut free = product("8412", "Sample Sachet", "sample", 10);
    free.variants[0].price = "0.00".to_owned();
    let h = harness(vec![free]).await;

    let response = h
        .app
        .oneshot(post_json("/agent", r#"{"query": "sample sachet"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["product"]["id"], "8412");
    assert_eq!(json["product"]["price_display"], "$0.00");
    assert_eq!(
        json["payment_intent_client_secret"],
        "pi_mock_8412_secret_mock"
    );
}

#[tokio::test]
async fn webhook_without_signature_header_is_unauthorized() {
    let h = harness(Vec::new()).await;
    let response = h
        .app
        .oneshot(post_json("/webhooks/shopify/products", r#"{"id": 1}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Invalid HMAC");
}

#[tokio::test]
async fn webhook_with_same_length_wrong_signature_is_unauthorized() {
    let h = harness(Vec::new()).await;
    let body = r#"{"id": 1}"#;
    let good = compute_signature(WEBHOOK_SECRET, body.as_bytes()).expect("signature");
    let wrong = compute_signature("not-the-secret", body.as_bytes()).expect("signature");
    assert_eq!(good.len(), wrong.len());

    let mut request = post_json("/webhooks/shopify/products", body);
    request.headers_mut().insert(
        "x-shopify-hmac-sha256",
        wrong.parse().expect("header value"),
    );
    let response = h.app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_without_secret_configured_is_a_server_error() {
    let h = harness_with(None, None, Vec::new()).await;
    let response = h
        .app
        .oneshot(post_json("/webhooks/shopify/products", "{}"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn signed_webhook_refreshes_shopify_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": [{
            "id": 99,
            "title": "Fresh Teapot",
            "status": "active",
            "variants": [{"id": 990, "price": "30.00", "inventory_quantity": 5}]
        }]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ShopifyAdminClient::with_base_url(
        &server.uri(),
        "shpat_test",
        "2024-10",
        5,
        "shopagent-test/0.1",
        RetryPolicy::none(),
    )
    .expect("client");
    let h = harness_with(
        Some(WEBHOOK_SECRET),
        Some(client),
        vec![product("1", "Old Mug", "", 1)],
    )
    .await;

    let body = r#"{"id": 99, "title": "Fresh Teapot"}"#;
    let signature = compute_signature(WEBHOOK_SECRET, body.as_bytes()).expect("signature");
    let mut request = post_json("/webhooks/shopify/products", body);
    request.headers_mut().insert(
        "x-shopify-hmac-sha256",
        signature.parse().expect("header value"),
    );

    let response = h.app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert_eq!(&text[..], b"ok");

    let shopify = h.cache.slot(Slot::Shopify).await.expect("populated");
    assert_eq!(shopify.len(), 1);
    assert_eq!(shopify[0].title, "Fresh Teapot");

    let on_disk = shopagent_catalog::read_products(h.cache.path(Slot::Shopify))
        .await
        .expect("file written");
    assert_eq!(on_disk[0].id, "99");
}
