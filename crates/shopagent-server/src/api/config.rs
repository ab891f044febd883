use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClientConfig {
    publishable_key: Option<String>,
    stripe_configured: bool,
}

/// `GET /config`: what the browser needs to start a Stripe checkout.
pub(super) async fn get_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        publishable_key: state.config.stripe.publishable_key.clone(),
        stripe_configured: state.checkout.is_configured(),
    })
}
