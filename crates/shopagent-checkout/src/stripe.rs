//! Minimal client for Stripe's `POST /v1/payment_intents`.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::CheckoutError;
use crate::PaymentIntent;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com/";

/// Client for the Stripe REST API.
///
/// Use [`StripeClient::new`] for production or [`StripeClient::with_base_url`]
/// to point at a mock server in tests.
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl StripeClient {
    /// # Errors
    ///
    /// Returns [`CheckoutError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(secret_key: &str, timeout_secs: u64) -> Result<Self, CheckoutError> {
        Self::with_base_url(secret_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`], plus [`CheckoutError::InvalidBaseUrl`].
    pub fn with_base_url(
        secret_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, CheckoutError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CheckoutError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            secret_key: secret_key.to_owned(),
            base_url,
        })
    }

    /// Creates a payment intent for `amount` minor units of `currency`,
    /// tagged with the product ID in its metadata.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Stripe`] on a non-2xx response, carrying Stripe's
    ///   error message when it sent one.
    /// - [`CheckoutError::Http`] on network failure.
    /// - [`CheckoutError::Deserialize`] if the response is not a payment intent.
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        product_id: &str,
    ) -> Result<PaymentIntent, CheckoutError> {
        let url = self
            .base_url
            .join("v1/payment_intents")
            .map_err(|e| CheckoutError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
            ("metadata[product_id]", product_id),
        ];

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error.message.or(env.error.kind))
                .unwrap_or_else(|| "no error message".to_owned());
            return Err(CheckoutError::Stripe {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| CheckoutError::Deserialize {
            context: format!("payment intent for product {product_id}"),
            source: e,
        })
    }
}
