use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::{AppConfig, Environment, ExternalConfig, ShopifyConfig, StripeConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid. Missing
/// credentials are not errors; they disable the feature that needs them.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Empty values are treated as unset so a blank line in `.env` does not
/// count as a credential.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("AGENT_ENV", "development"));
    let bind_addr = parse_addr("AGENT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("AGENT_LOG_LEVEL", "info");
    let products_path = PathBuf::from(or_default("AGENT_PRODUCTS_PATH", "./data/products.json"));
    let external_products_path = PathBuf::from(or_default(
        "AGENT_EXTERNAL_PRODUCTS_PATH",
        "./data/external_products.json",
    ));

    let refresh_interval_secs = parse_u64("AGENT_REFRESH_INTERVAL_SECS", "900")?;
    if refresh_interval_secs == 0 {
        return Err(invalid(
            "AGENT_REFRESH_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let shopify = match (
        optional("SHOPIFY_STORE_DOMAIN"),
        optional("SHOPIFY_ACCESS_TOKEN"),
    ) {
        (Some(store_domain), Some(access_token)) => Some(ShopifyConfig {
            store_domain,
            access_token,
            api_version: or_default("SHOPIFY_API_VERSION", "2024-10"),
        }),
        _ => None,
    };

    let stripe = StripeConfig {
        secret_key: optional("STRIPE_SECRET_KEY"),
        publishable_key: optional("STRIPE_PUBLISHABLE_KEY"),
        currency: or_default("STRIPE_CURRENCY", "usd").to_lowercase(),
    };

    let max_products = parse_usize("EXTERNAL_MAX_PRODUCTS", "300")?;
    let external = ExternalConfig {
        stores: parse_store_list(&or_default("EXTERNAL_STORES", "")),
        max_products: (max_products > 0).then_some(max_products),
        scraper_cmd: optional("EXTERNAL_SCRAPER_CMD"),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        products_path,
        external_products_path,
        refresh_interval_secs,
        shopify,
        webhook_secret: optional("SHOPIFY_WEBHOOK_SECRET"),
        stripe,
        external,
        scraper_request_timeout_secs: parse_u64("AGENT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?,
        scraper_user_agent: or_default("AGENT_SCRAPER_USER_AGENT", "shopagent/0.1 (catalog-sync)"),
        scraper_max_retries: parse_u32("AGENT_SCRAPER_MAX_RETRIES", "0")?,
        scraper_retry_backoff_base_secs: parse_u64("AGENT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Splits a comma-separated store list, dropping blanks and duplicates while
/// keeping first-seen order.
fn parse_store_list(raw: &str) -> Vec<String> {
    let mut stores: Vec<String> = Vec::new();
    for store in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let store = store.to_lowercase();
        if !stores.contains(&store) {
            stores.push(store);
        }
    }
    stores
}

/// Describes every credential whose absence disables a feature.
///
/// Binaries log each entry as a warning at startup; none of them is fatal.
#[must_use]
pub fn missing_credentials(config: &AppConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.shopify.is_none() {
        missing.push("SHOPIFY_STORE_DOMAIN/SHOPIFY_ACCESS_TOKEN not set; Shopify catalog sync disabled");
    }
    if config.webhook_secret.is_none() {
        missing.push("SHOPIFY_WEBHOOK_SECRET not set; product webhooks will be rejected");
    }
    if !config.stripe.is_configured() {
        missing.push("STRIPE_SECRET_KEY not set; checkout returns mock payment intents");
    }
    missing
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
