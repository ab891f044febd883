//! Shapes used by the storefront MCP endpoint (`POST /api/mcp`).
//!
//! The catalog is exposed through the `search_shop_catalog` tool. Its result
//! is a JSON document serialized as a string inside the first `content`
//! entry of the JSON-RPC `result`:
//!
//! ```text
//! {"result": {"content": [{"type": "text", "text": "{\"products\": [...], \"pagination\": {...}}"}]}}
//! ```
//!
//! Storefronts differ in which optional fields they fill, so everything
//! except the product ID and title is defaulted.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ToolResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// One page of `search_shop_catalog` output. Products are kept as raw JSON
/// so a download can be written back out untouched.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogPage {
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
    #[serde(default)]
    pub pagination: Option<CatalogPagination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CatalogPagination {
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// A storefront product as returned by `search_shop_catalog`.
#[derive(Debug, Clone, Deserialize)]
pub struct McpProduct {
    /// Shopify GID, e.g. `"gid://shopify/Product/8412"`.
    pub product_id: String,
    pub title: String,
    /// Plain-text or HTML description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt_text: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price_range: Option<McpPriceRange>,
    #[serde(default)]
    pub variants: Vec<McpVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpPriceRange {
    #[serde(deserialize_with = "price_string")]
    pub min: String,
    #[serde(default, deserialize_with = "opt_price_string")]
    pub max: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpVariant {
    /// Shopify GID, e.g. `"gid://shopify/ProductVariant/4410"`.
    pub variant_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "price_string")]
    pub price: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Prices arrive as `"24.00"`, `24.0`, or `{"amount": "24.00", ...}`
/// depending on the storefront.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(f64),
    Money { amount: String },
}

impl From<RawPrice> for String {
    fn from(raw: RawPrice) -> Self {
        match raw {
            RawPrice::Text(s) | RawPrice::Money { amount: s } => s,
            RawPrice::Number(n) => n.to_string(),
        }
    }
}

fn price_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawPrice::deserialize(deserializer).map(String::from)
}

fn opt_price_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawPrice>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
