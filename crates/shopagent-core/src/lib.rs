pub mod app_config;
pub mod config;
pub mod description;
pub mod matcher;
pub mod products;

pub use app_config::{AppConfig, Environment, ExternalConfig, ShopifyConfig, StripeConfig};
pub use config::{load_app_config, load_app_config_from_env, missing_credentials, ConfigError};
pub use description::normalize_description;
pub use matcher::{best_match, tokenize, MatchResult, ScoredMatch};
pub use products::{Product, ProductImage, Variant};
