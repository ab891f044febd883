use serde::{Deserialize, Deserializer, Serialize};

/// Status value that excludes a product from matching.
pub const STATUS_DRAFT: &str = "draft";

/// A catalog product in the normalized shape shared by every source and by
/// the on-disk catalog files.
///
/// The field layout follows Shopify's Admin REST product resource, so a
/// products file written by one source can be read back by any other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Upstream product ID. Shopify sends a JSON number; MCP storefronts send
    /// a GID string. Both are carried as a string.
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub title: String,
    /// Raw HTML description.
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    /// Comma-separated tag list, e.g. `"kitchen, ceramic"`.
    #[serde(default)]
    pub tags: String,
    /// `"active"` or `"draft"` (Shopify may also send `"archived"`).
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub image: Option<ProductImage>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// A purchasable configuration of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_from_number_or_string")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Price as a decimal string, exactly as the upstream returns it.
    pub price: String,
    /// Missing quantities count as out of stock.
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default, deserialize_with = "opt_id_from_number_or_string")]
    pub id: Option<String>,
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

impl Product {
    /// Sum of `inventory_quantity` across all variants, saturating at the
    /// `i64` bounds.
    #[must_use]
    pub fn total_inventory(&self) -> i64 {
        self.variants
            .iter()
            .map(|v| v.inventory_quantity)
            .fold(0i64, i64::saturating_add)
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_DRAFT)
    }

    /// Non-draft with positive summed inventory.
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        !self.is_draft() && self.total_inventory() > 0
    }

    /// The variant a buyer gets by default: the first one in stock, or the
    /// first variant when none are.
    #[must_use]
    pub fn purchase_variant(&self) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.inventory_quantity > 0)
            .or_else(|| self.variants.first())
    }

    /// Primary image URL, falling back to the first gallery image.
    #[must_use]
    pub fn primary_image_src(&self) -> Option<&str> {
        self.image
            .as_ref()
            .or_else(|| self.images.first())
            .map(|img| img.src.as_str())
    }
}

fn default_status() -> String {
    "active".to_string()
}

fn default_available() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn opt_id_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
