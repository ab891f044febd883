//! Shopify response types for the Admin REST `products.json` endpoint.
//!
//! ### Tags
//! The Admin API sends tags as one comma-separated string
//! (`"kitchen, ceramic"`). The public storefront `products.json` sends a JSON
//! array instead. [`ShopifyTags`] accepts both so the same types can read
//! either endpoint and hand-written fixtures.
//!
//! ### `inventory_quantity`
//! Present on Admin API variants; absent from the storefront endpoint. Missing
//! values are treated as zero stock during normalization.
//!
//! ### `status`
//! `"active"`, `"draft"`, or `"archived"` on the Admin API; may be absent from
//! the storefront endpoint. Defaults to `"active"` in normalization.

use serde::Deserialize;

/// Top-level response from `GET /admin/api/{version}/products.json`.
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsResponse {
    pub products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    /// May be an empty string; normalized to `None`.
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: ShopifyTags,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
    #[serde(default)]
    pub image: Option<ShopifyImage>,
    #[serde(default)]
    pub images: Vec<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    /// Decimal string, e.g. `"24.00"`.
    pub price: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    /// Only sent by the storefront endpoint.
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    #[serde(default)]
    pub id: Option<i64>,
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

/// Tags in either the Admin (comma string) or storefront (array) encoding.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ShopifyTags {
    Joined(String),
    List(Vec<String>),
}

impl Default for ShopifyTags {
    fn default() -> Self {
        Self::Joined(String::new())
    }
}

impl ShopifyTags {
    /// Canonical `"a, b, c"` form with blanks removed.
    #[must_use]
    pub fn to_comma_list(&self) -> String {
        let parts: Vec<&str> = match self {
            Self::Joined(s) => s.split(',').map(str::trim).collect(),
            Self::List(items) => items.iter().map(|s| s.trim()).collect(),
        };
        parts
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
