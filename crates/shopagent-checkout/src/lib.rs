//! Payment intents for the product the agent picked.
//!
//! With a Stripe secret key configured, intents are created through the
//! Stripe API. Without one, a deterministic mock intent is returned so the
//! demo runs end to end offline.

mod amount;
pub mod error;
pub mod stripe;

use serde::{Deserialize, Serialize};
use shopagent_core::StripeConfig;

pub use amount::amount_to_minor_units;
pub use error::CheckoutError;
pub use stripe::StripeClient;

/// The fields of a Stripe payment intent the agent uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PaymentIntent {
    /// The fixed intent returned when no payment provider is configured.
    #[must_use]
    pub fn mock(product_id: &str, amount: Option<i64>, currency: &str) -> Self {
        Self {
            id: format!("pi_mock_{product_id}"),
            client_secret: format!("pi_mock_{product_id}_secret_mock"),
            amount,
            currency: Some(currency.to_owned()),
            status: Some("requires_payment_method".to_owned()),
        }
    }
}

/// Where payment intents come from.
pub enum Checkout {
    Stripe { client: StripeClient, currency: String },
    Mock { currency: String },
}

impl Checkout {
    /// Stripe when a secret key is configured, the mock otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Http`] if the Stripe HTTP client cannot be
    /// built.
    pub fn from_config(config: &StripeConfig, timeout_secs: u64) -> Result<Self, CheckoutError> {
        let currency = config.currency.clone();
        match config.secret_key.as_deref() {
            Some(key) => Ok(Self::Stripe {
                client: StripeClient::new(key, timeout_secs)?,
                currency,
            }),
            None => Ok(Self::Mock { currency }),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Stripe { .. })
    }

    /// Creates an intent for `price` (a decimal string) on `product_id`.
    ///
    /// The mock never fails: a price it cannot charge leaves `amount` unset.
    ///
    /// # Errors
    ///
    /// With Stripe configured, [`CheckoutError::InvalidAmount`] for an
    /// unchargeable price, or any error from
    /// [`StripeClient::create_payment_intent`].
    pub async fn create_payment_intent(
        &self,
        price: &str,
        product_id: &str,
    ) -> Result<PaymentIntent, CheckoutError> {
        match self {
            Self::Stripe { client, currency } => {
                let amount = amount_to_minor_units(price)?;
                let intent = client
                    .create_payment_intent(amount, currency, product_id)
                    .await?;
                tracing::info!(product_id, amount, intent_id = %intent.id, "checkout: created payment intent");
                Ok(intent)
            }
            Self::Mock { currency } => {
                let amount = amount_to_minor_units(price).ok();
                tracing::debug!(product_id, ?amount, "checkout: returning mock payment intent");
                Ok(PaymentIntent::mock(product_id, amount, currency))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripe_config(secret_key: Option<&str>) -> StripeConfig {
        StripeConfig {
            secret_key: secret_key.map(str::to_owned),
            publishable_key: None,
            currency: "usd".to_owned(),
        }
    }

    #[tokio::test]
    async fn mock_intent_is_keyed_by_product_id() {
        let checkout = Checkout::from_config(&stripe_config(None), 5).unwrap();
        assert!(!checkout.is_configured());

        let intent = checkout
            .create_payment_intent("24.99", "8412")
            .await
            .unwrap();
        assert_eq!(intent.id, "pi_mock_8412");
        assert_eq!(intent.client_secret, "pi_mock_8412_secret_mock");
        assert_eq!(intent.amount, Some(2499));
        assert_eq!(intent.currency.as_deref(), Some("usd"));
    }

    #[tokio::test]
    async fn mock_returns_intent_for_unchargeable_prices() {
        let checkout = Checkout::from_config(&stripe_config(None), 5).unwrap();
        for price in ["0.00", "", "free"] {
            let intent = checkout
                .create_payment_intent(price, "8412")
                .await
                .unwrap();
            assert_eq!(intent.client_secret, "pi_mock_8412_secret_mock", "price {price:?}");
            assert_eq!(intent.amount, None, "price {price:?}");
        }
    }

    #[tokio::test]
    async fn stripe_rejects_unchargeable_price_before_calling_out() {
        let checkout = Checkout::Stripe {
            client: StripeClient::with_base_url("sk_test_123", 5, "http://127.0.0.1:9").unwrap(),
            currency: "usd".to_owned(),
        };
        let err = checkout.create_payment_intent("0", "1").await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidAmount { .. }));
    }

    #[test]
    fn secret_key_selects_stripe() {
        let checkout = Checkout::from_config(&stripe_config(Some("sk_test_123")), 5).unwrap();
        assert!(checkout.is_configured());
    }
}
