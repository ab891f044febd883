use thiserror::Error;

/// Errors returned while creating a payment intent.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe answered with a non-2xx status.
    #[error("Stripe returned {status}: {message}")]
    Stripe { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The product price cannot be charged.
    #[error("invalid amount \"{price}\": {reason}")]
    InvalidAmount { price: String, reason: String },

    #[error("invalid Stripe base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
