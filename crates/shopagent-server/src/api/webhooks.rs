use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension,
};
use shopagent_catalog::Slot;

use super::{ApiError, AppState};
use crate::middleware::RequestId;
use crate::signature::{verify_signature, SIGNATURE_HEADER};

/// `POST /webhooks/shopify/products`: verifies the signature and refreshes
/// the Shopify slot before answering.
pub(super) async fn shopify_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Some(secret) = state.config.webhook_secret.as_deref() else {
        tracing::error!("webhook: SHOPIFY_WEBHOOK_SECRET is not set");
        return Err(ApiError::internal(req_id.0));
    };

    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(secret, &body, provided) {
        tracing::warn!(request_id = %req_id.0, "webhook: rejected invalid HMAC");
        return Err(ApiError::new(req_id.0, "unauthorized", "Invalid HMAC"));
    }

    match state.refresher.refresh(Slot::Shopify).await {
        Ok(Some(count)) => {
            tracing::info!(count, "webhook: shopify catalog refreshed");
            Ok((StatusCode::OK, "ok"))
        }
        Ok(None) => {
            tracing::error!("webhook: no Shopify source configured");
            Err(ApiError::internal(req_id.0))
        }
        Err(e) => {
            tracing::error!(error = %e, "webhook: refresh failed");
            Err(ApiError::internal(req_id.0))
        }
    }
}
