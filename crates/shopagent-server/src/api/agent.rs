use axum::{body::Bytes, extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;
use shopagent_core::{best_match, MatchResult};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct AgentResponse {
    product: MatchResult,
    payment_intent_client_secret: String,
}

/// `POST /agent` with `{"query": "..."}`.
///
/// The body is read raw so malformed JSON becomes a 400 in the API error
/// shape rather than axum's default rejection.
pub(super) async fn handle_agent(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let query = parse_query(&body).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            "body must be JSON with a string \"query\"",
        )
    })?;

    state.refresher.ensure_loaded().await;
    let snapshot = state.refresher.cache().snapshot().await;

    let Some(found) = best_match(snapshot.iter(), &query) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "no in-stock product matches the query",
        ));
    };
    let product = found.product;
    tracing::info!(
        query = %query,
        product_id = %product.id,
        score = found.score,
        "agent: matched product"
    );

    let Some(variant) = product.purchase_variant() else {
        tracing::error!(product_id = %product.id, "agent: matched product has no variants");
        return Err(ApiError::internal(req_id.0));
    };

    let intent = state
        .checkout
        .create_payment_intent(&variant.price, &product.id)
        .await
        .map_err(|e| {
            tracing::error!(product_id = %product.id, error = %e, "agent: checkout failed");
            ApiError::internal(req_id.0.clone())
        })?;

    Ok(Json(AgentResponse {
        product: MatchResult::from(product),
        payment_intent_client_secret: intent.client_secret,
    }))
}

fn parse_query(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("query")?.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::parse_query;

    #[test]
    fn parse_query_accepts_string_query() {
        assert_eq!(parse_query(br#"{"query": "red mug"}"#).as_deref(), Some("red mug"));
        assert_eq!(parse_query(br#"{"query": ""}"#).as_deref(), Some(""));
    }

    #[test]
    fn parse_query_rejects_bad_bodies() {
        assert_eq!(parse_query(b"not json"), None);
        assert_eq!(parse_query(br#"{"q": "mug"}"#), None);
        assert_eq!(parse_query(br#"{"query": 5}"#), None);
        assert_eq!(parse_query(br#"["query"]"#), None);
        assert_eq!(parse_query(b""), None);
    }
}
