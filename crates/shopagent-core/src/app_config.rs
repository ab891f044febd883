use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Shopify Admin API credentials. Present only when both the store domain and
/// the access token are configured.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// e.g. `"my-store.myshopify.com"`.
    pub store_domain: String,
    pub access_token: String,
    pub api_version: String,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store_domain", &self.store_domain)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Stripe keys and charge currency.
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub publishable_key: Option<String>,
    pub currency: String,
}

impl StripeConfig {
    /// `true` when a secret key is available for real payment intents.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[redacted]"))
            .field("publishable_key", &self.publishable_key)
            .field("currency", &self.currency)
            .finish()
    }
}

/// Storefronts scraped in addition to the Shopify store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalConfig {
    /// Storefront domains, e.g. `["skims.com"]`.
    pub stores: Vec<String>,
    /// Per-store product cap; `None` means unlimited.
    pub max_products: Option<usize>,
    /// External scraper command line. The native MCP client is used when unset.
    pub scraper_cmd: Option<String>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub products_path: PathBuf,
    pub external_products_path: PathBuf,
    pub refresh_interval_secs: u64,
    pub shopify: Option<ShopifyConfig>,
    pub webhook_secret: Option<String>,
    pub stripe: StripeConfig,
    pub external: ExternalConfig,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("products_path", &self.products_path)
            .field("external_products_path", &self.external_products_path)
            .field("refresh_interval_secs", &self.refresh_interval_secs)
            .field("shopify", &self.shopify)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("stripe", &self.stripe)
            .field("external", &self.external)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .finish()
    }
}
