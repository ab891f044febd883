//! Wires the catalog sources to the cache slots.

use std::sync::Arc;

use shopagent_catalog::{CatalogCache, CatalogError, Slot};
use shopagent_core::AppConfig;
use shopagent_scraper::{
    ExternalCatalog, McpCatalogClient, ProcessScraper, RetryPolicy, ScraperError,
    ShopifyAdminClient,
};

/// External stores and how to fetch them.
pub struct ExternalSource {
    pub catalog: ExternalCatalog,
    pub stores: Vec<String>,
    pub max_products: Option<usize>,
}

/// Refreshes cache slots from whichever sources are configured.
pub struct Refresher {
    cache: Arc<CatalogCache>,
    shopify: Option<ShopifyAdminClient>,
    external: Option<ExternalSource>,
}

impl Refresher {
    #[must_use]
    pub fn new(
        cache: Arc<CatalogCache>,
        shopify: Option<ShopifyAdminClient>,
        external: Option<ExternalSource>,
    ) -> Self {
        Self {
            cache,
            shopify,
            external,
        }
    }

    /// Builds the configured sources. A missing Shopify credential or an
    /// empty store list leaves that slot without a source.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if an HTTP client cannot be built or the
    /// Shopify store domain is invalid.
    pub fn from_config(config: &AppConfig, cache: Arc<CatalogCache>) -> Result<Self, ScraperError> {
        let retry = RetryPolicy {
            max_retries: config.scraper_max_retries,
            backoff_base_secs: config.scraper_retry_backoff_base_secs,
        };

        let shopify = config
            .shopify
            .as_ref()
            .map(|shopify| {
                ShopifyAdminClient::new(
                    shopify,
                    config.scraper_request_timeout_secs,
                    &config.scraper_user_agent,
                    retry,
                )
            })
            .transpose()?;

        let external = if config.external.stores.is_empty() {
            None
        } else {
            let catalog = match config
                .external
                .scraper_cmd
                .as_deref()
                .and_then(ProcessScraper::from_command_line)
            {
                Some(process) => ExternalCatalog::Process(process),
                None => ExternalCatalog::Native(McpCatalogClient::new(
                    config.scraper_request_timeout_secs,
                    &config.scraper_user_agent,
                    retry,
                )?),
            };
            Some(ExternalSource {
                catalog,
                stores: config.external.stores.clone(),
                max_products: config.external.max_products,
            })
        };

        Ok(Self::new(cache, shopify, external))
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    #[must_use]
    pub fn has_source(&self, slot: Slot) -> bool {
        match slot {
            Slot::Shopify => self.shopify.is_some(),
            Slot::External => self.external.is_some(),
        }
    }

    /// Refreshes one slot. Returns `Ok(None)` when the slot has no source.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] if the upstream fetch failed; the
    /// slot keeps its previous contents.
    pub async fn refresh(&self, slot: Slot) -> Result<Option<usize>, CatalogError> {
        match slot {
            Slot::Shopify => {
                let Some(client) = self.shopify.as_ref() else {
                    return Ok(None);
                };
                self.cache
                    .refresh_slot(slot, || client.fetch_catalog())
                    .await
                    .map(Some)
            }
            Slot::External => {
                let Some(source) = self.external.as_ref() else {
                    return Ok(None);
                };
                self.cache
                    .refresh_slot(slot, || {
                        source
                            .catalog
                            .fetch_all_stores(&source.stores, source.max_products)
                    })
                    .await
                    .map(Some)
            }
        }
    }

    /// Refreshes every configured slot. Failures are logged, not returned.
    pub async fn refresh_all(&self) {
        for slot in Slot::ALL {
            if let Err(e) = self.refresh(slot).await {
                tracing::warn!(slot = %slot, error = %e, "catalog: refresh failed");
            }
        }
    }

    /// Loads every slot from disk, then refreshes every configured source.
    ///
    /// Slots whose file is missing or corrupt and that have no source stay
    /// empty until one is configured.
    pub async fn startup(&self) {
        for slot in Slot::ALL {
            match self.cache.load_from_disk(slot).await {
                Ok(outcome) if outcome.needs_refresh() && !self.has_source(slot) => {
                    tracing::warn!(slot = %slot, ?outcome, "catalog: no data and no source configured");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(slot = %slot, error = %e, "catalog: could not read file"),
            }
        }
        self.refresh_all().await;
    }

    /// Fetches on demand when nothing has been loaded yet.
    pub async fn ensure_loaded(&self) {
        if !self.cache.is_initialized().await {
            tracing::info!("catalog: empty at query time; fetching on demand");
            self.refresh_all().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slots_without_source_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = Arc::new(CatalogCache::new(
            dir.path().join("products.json"),
            dir.path().join("external_products.json"),
        ));
        let refresher = Refresher::new(Arc::clone(&cache), None, None);

        assert!(!refresher.has_source(Slot::Shopify));
        assert_eq!(refresher.refresh(Slot::Shopify).await.expect("ok"), None);
        assert_eq!(refresher.refresh(Slot::External).await.expect("ok"), None);
    }

    #[tokio::test]
    async fn startup_loads_files_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("products.json"),
            r#"[{"id": 1, "title": "Red Mug", "variants": [{"id": 10, "price": "9.00", "inventory_quantity": 1}]}]"#,
        )
        .expect("write");
        let cache = Arc::new(CatalogCache::new(
            dir.path().join("products.json"),
            dir.path().join("external_products.json"),
        ));
        let refresher = Refresher::new(Arc::clone(&cache), None, None);

        refresher.startup().await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.shopify.len(), 1);
        assert!(snapshot.external.is_empty());
        assert!(cache.is_initialized().await);
    }
}
