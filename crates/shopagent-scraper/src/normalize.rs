//! Conversion from upstream product shapes into [`shopagent_core::Product`].
//!
//! Both sources end up in the Admin REST layout so either catalog file can
//! be read back by the same loader.

use shopagent_core::{Product, ProductImage, Variant};

use crate::client::store_host;
use crate::error::ScraperError;
use crate::mcp::{McpProduct, McpVariant};
use crate::types::{ShopifyImage, ShopifyProduct, ShopifyVariant};

/// Normalizes an Admin API product.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the product has no variants or
/// a variant has an empty price.
pub fn normalize_shopify_product(product: ShopifyProduct) -> Result<Product, ScraperError> {
    let id = product.id.to_string();
    if product.variants.is_empty() {
        return Err(ScraperError::Normalization {
            source_product_id: id,
            reason: "product has no variants".into(),
        });
    }

    let variants = product
        .variants
        .into_iter()
        .map(|v| normalize_shopify_variant(v, &id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        title: product.title,
        body_html: non_empty(product.body_html),
        vendor: non_empty(product.vendor),
        product_type: non_empty(product.product_type),
        tags: product.tags.to_comma_list(),
        status: product
            .status
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| "active".to_owned(), |s| s.trim().to_ascii_lowercase()),
        variants,
        image: product.image.map(normalize_image),
        images: product.images.into_iter().map(normalize_image).collect(),
        id,
    })
}

fn normalize_shopify_variant(
    variant: ShopifyVariant,
    product_id: &str,
) -> Result<Variant, ScraperError> {
    let price = variant.price.trim().to_owned();
    if price.is_empty() {
        return Err(ScraperError::Normalization {
            source_product_id: product_id.to_owned(),
            reason: format!("variant {} has no price", variant.id),
        });
    }

    let inventory_quantity = variant.inventory_quantity.unwrap_or(0);
    Ok(Variant {
        id: variant.id.to_string(),
        product_id: Some(
            variant
                .product_id
                .map_or_else(|| product_id.to_owned(), |p| p.to_string()),
        ),
        title: variant.title,
        price,
        inventory_quantity,
        available: variant.available.unwrap_or(inventory_quantity > 0),
        sku: non_empty(variant.sku),
    })
}

fn normalize_image(image: ShopifyImage) -> ProductImage {
    ProductImage {
        id: image.id.map(|id| id.to_string()),
        src: image.src,
        alt: non_empty(image.alt),
        width: image.width,
        height: image.height,
    }
}

/// Normalizes a storefront MCP product from `store`.
///
/// The storefront does not report stock levels, so each variant gets an
/// inventory of 1 when available and 0 otherwise. Products that only carry a
/// price range get a single synthetic variant priced at the range minimum.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the product has neither
/// variants nor a price range.
pub fn normalize_mcp_product(product: McpProduct, store: &str) -> Result<Product, ScraperError> {
    let id = gid_tail(&product.product_id).to_owned();

    let variants: Vec<Variant> = if product.variants.is_empty() {
        let Some(range) = product.price_range.as_ref() else {
            return Err(ScraperError::Normalization {
                source_product_id: product.product_id.clone(),
                reason: "product has no variants or price range".into(),
            });
        };
        vec![Variant {
            id: id.clone(),
            product_id: Some(id.clone()),
            title: "Default Title".to_owned(),
            price: range.min.clone(),
            inventory_quantity: 1,
            available: true,
            sku: None,
        }]
    } else {
        product
            .variants
            .into_iter()
            .map(|v| normalize_mcp_variant(v, &id))
            .collect()
    };

    let image = non_empty(product.image_url).map(|src| ProductImage {
        id: None,
        src,
        alt: non_empty(product.image_alt_text),
        width: None,
        height: None,
    });

    Ok(Product {
        title: product.title,
        body_html: non_empty(product.description),
        vendor: non_empty(product.vendor).or_else(|| Some(store_host(store))),
        product_type: non_empty(product.product_type),
        tags: product
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        status: "active".to_owned(),
        variants,
        images: image.iter().cloned().collect(),
        image,
        id,
    })
}

fn normalize_mcp_variant(variant: McpVariant, product_id: &str) -> Variant {
    Variant {
        id: gid_tail(&variant.variant_id).to_owned(),
        product_id: Some(product_id.to_owned()),
        title: variant.title,
        price: variant.price,
        inventory_quantity: i64::from(variant.available),
        available: variant.available,
        sku: None,
    }
}

/// `"gid://shopify/Product/8412"` → `"8412"`. Plain IDs pass through.
fn gid_tail(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
