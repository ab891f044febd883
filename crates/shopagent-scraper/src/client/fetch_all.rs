//! Multi-page catalog fetch for `ShopifyAdminClient`.

use shopagent_core::Product;

use crate::error::ScraperError;
use crate::normalize::normalize_shopify_product;
use crate::types::ShopifyProduct;

use super::ShopifyAdminClient;
use super::MAX_PAGES;

impl ShopifyAdminClient {
    /// Fetches every product by following `page_info` cursors until the last
    /// page.
    ///
    /// All-or-nothing: a failure on any page discards the pages already read,
    /// so a refresh never swaps in a truncated catalog.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_products_page`], and returns
    /// [`ScraperError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn fetch_all_products(&self) -> Result<Vec<ShopifyProduct>, ScraperError> {
        let mut all_products: Vec<ShopifyProduct> = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let (page, next) = self.fetch_products_page(cursor.as_deref()).await?;
            all_products.extend(page.products);

            match next {
                Some(next) => cursor = Some(next),
                None => return Ok(all_products),
            }
        }

        Err(ScraperError::PaginationLimit {
            store: self.store().to_owned(),
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches the full catalog and normalizes it.
    ///
    /// Products that fail normalization are logged and skipped; they never
    /// fail the whole fetch.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_all_products`].
    pub async fn fetch_catalog(&self) -> Result<Vec<Product>, ScraperError> {
        let raw = self.fetch_all_products().await?;
        let fetched = raw.len();

        let products: Vec<Product> = raw
            .into_iter()
            .filter_map(|p| match normalize_shopify_product(p) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(store = self.store(), error = %e, "skipping product");
                    None
                }
            })
            .collect();

        tracing::info!(
            store = self.store(),
            fetched,
            kept = products.len(),
            "fetched shopify catalog"
        );
        Ok(products)
    }
}
