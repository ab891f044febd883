//! Catalog sources for the shopping agent.
//!
//! - [`ShopifyAdminClient`]: the merchant's own catalog via the Admin REST API.
//! - [`McpCatalogClient`]: any storefront's public catalog via `/api/mcp`.
//! - [`ExternalCatalog`]: the external-products slot, native or via a command.

pub mod client;
pub mod error;
pub mod external;
pub mod mcp;
pub mod normalize;
pub mod pagination;
pub mod retry;
pub mod types;

pub use client::{store_base_url, store_host, store_slug, ShopifyAdminClient};
pub use error::ScraperError;
pub use external::{ExternalCatalog, ProcessScraper};
pub use mcp::{parse_products, McpCatalogClient, McpProduct};
pub use normalize::{normalize_mcp_product, normalize_shopify_product};
pub use retry::RetryPolicy;
pub use types::{ShopifyProduct, ShopifyProductsResponse, ShopifyVariant};
