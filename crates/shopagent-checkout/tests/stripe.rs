//! Integration tests for `StripeClient` using wiremock HTTP mocks.

use shopagent_checkout::{CheckoutError, StripeClient};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> StripeClient {
    StripeClient::with_base_url("sk_test_123", 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn create_payment_intent_posts_form_and_parses_intent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(body_string_contains("amount=2499"))
        .and(body_string_contains("currency=usd"))
        .and(body_string_contains("automatic_payment_methods%5Benabled%5D=true"))
        .and(body_string_contains("metadata%5Bproduct_id%5D=8412"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "pi_3Nabc",
            "object": "payment_intent",
            "amount": 2499,
            "currency": "usd",
            "client_secret": "pi_3Nabc_secret_xyz",
            "status": "requires_payment_method"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let intent = test_client(&server.uri())
        .create_payment_intent(2499, "usd", "8412")
        .await
        .expect("should create intent");

    assert_eq!(intent.id, "pi_3Nabc");
    assert_eq!(intent.client_secret, "pi_3Nabc_secret_xyz");
    assert_eq!(intent.amount, Some(2499));
    assert_eq!(intent.status.as_deref(), Some("requires_payment_method"));
}

#[tokio::test]
async fn stripe_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_payment_intent(100, "usd", "1")
        .await
        .unwrap_err();

    match err {
        CheckoutError::Stripe { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API Key provided");
        }
        other => panic!("expected Stripe error, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_still_maps_to_stripe_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_payment_intent(100, "usd", "1")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Stripe { status: 502, .. }));
}

#[tokio::test]
async fn malformed_success_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": 5}"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_payment_intent(100, "usd", "1")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Deserialize { .. }));
}
