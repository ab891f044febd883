//! Integration tests for `McpCatalogClient` against a `wiremock` storefront.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopagent_scraper::{McpCatalogClient, RetryPolicy, ScraperError};

fn test_client() -> McpCatalogClient {
    McpCatalogClient::new(5, "shopagent-test/0.1", RetryPolicy::none())
        .expect("failed to build test client")
        .with_page_delay(Duration::ZERO)
}

fn raw_product(n: u32) -> serde_json::Value {
    json!({
        "product_id": format!("gid://shopify/Product/{n}"),
        "title": format!("Product {n}"),
        "price_range": {"min": "10.00", "max": "10.00", "currency": "USD"},
        "variants": [{
            "variant_id": format!("gid://shopify/ProductVariant/{n}0"),
            "title": "Default Title",
            "price": "10.00",
            "available": true
        }]
    })
}

/// Wraps a catalog page the way `search_shop_catalog` does: JSON text inside
/// the first content entry.
fn tool_response(products: &[serde_json::Value], next: Option<&str>) -> serde_json::Value {
    let page = json!({
        "products": products,
        "pagination": {
            "endCursor": next,
            "hasNextPage": next.is_some()
        }
    });
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {"content": [{"type": "text", "text": page.to_string()}]}
    })
}

async fn mount_initialize(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({"method": "initialize"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"protocolVersion": "2024-11-05", "capabilities": {}}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn downloads_every_page_until_has_next_page_is_false() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({
            "method": "tools/call",
            "params": {"name": "search_shop_catalog", "arguments": {"after": "c2"}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tool_response(&[raw_product(3)], None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({
            "method": "tools/call",
            "params": {"name": "search_shop_catalog", "arguments": {"query": "*", "limit": 100}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_response(
            &[raw_product(1), raw_product(2)],
            Some("c2"),
        )))
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_products(&server.uri(), None)
        .await
        .expect("download succeeds");

    let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Product 1", "Product 2", "Product 3"]);
}

#[tokio::test]
async fn stops_at_max_products() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_response(
            &[raw_product(1), raw_product(2), raw_product(3)],
            Some("more"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let raw = test_client()
        .fetch_raw_catalog(&server.uri(), Some(2))
        .await
        .expect("download succeeds");
    assert_eq!(raw.len(), 2);
}

#[tokio::test]
async fn later_page_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({"params": {"arguments": {"after": "c2"}}})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tool_response(&[raw_product(1)], Some("c2"))),
        )
        .mount(&server)
        .await;

    let raw = test_client()
        .fetch_raw_catalog(&server.uri(), None)
        .await
        .expect("first page is kept");
    assert_eq!(raw.len(), 1);
}

#[tokio::test]
async fn failed_initialize_means_mcp_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_raw_catalog(&server.uri(), None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::McpUnavailable { .. }),
        "expected McpUnavailable, got: {err:?}"
    );
}

#[tokio::test]
async fn rpc_error_on_first_page_is_returned() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/mcp"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "tool not found"}
        })))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_raw_catalog(&server.uri(), None)
        .await
        .unwrap_err();
    match err {
        ScraperError::McpCall { method, message, .. } => {
            assert_eq!(method, "tools/call");
            assert!(message.contains("tool not found"), "message: {message}");
        }
        other => panic!("expected McpCall, got: {other:?}"),
    }
}
