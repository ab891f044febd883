//! Catalog command handlers for the CLI.

use std::path::{Path, PathBuf};

use shopagent_catalog::{read_products, write_atomic, CatalogCache, CatalogError, Slot};
use shopagent_core::{best_match, AppConfig, MatchResult, Product};
use shopagent_scraper::{store_slug, McpCatalogClient, RetryPolicy, ShopifyAdminClient};

fn retry_policy(config: &AppConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.scraper_max_retries,
        backoff_base_secs: config.scraper_retry_backoff_base_secs,
    }
}

/// Run one Shopify refresh and write the products file.
///
/// # Errors
///
/// Returns an error if Shopify credentials are missing or the fetch fails.
pub(crate) async fn run_sync(config: &AppConfig) -> anyhow::Result<()> {
    let Some(shopify) = config.shopify.as_ref() else {
        anyhow::bail!("SHOPIFY_STORE_DOMAIN and SHOPIFY_ACCESS_TOKEN must be set to sync");
    };

    let client = ShopifyAdminClient::new(
        shopify,
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        retry_policy(config),
    )?;
    let cache = CatalogCache::new(
        config.products_path.clone(),
        config.external_products_path.clone(),
    );

    let count = cache
        .refresh_slot(Slot::Shopify, || client.fetch_catalog())
        .await?;
    println!(
        "Synced {count} products from {} to {}",
        client.store(),
        config.products_path.display()
    );
    Ok(())
}

/// Default output file for `scrape`: `<store_slug>_catalog.json`.
pub(crate) fn default_output(store: &str) -> PathBuf {
    PathBuf::from(format!("{}_catalog.json", store_slug(store)))
}

/// Download a storefront catalog and write the raw product array.
///
/// The output matches what `EXTERNAL_SCRAPER_CMD` must produce, so this
/// command can serve as the external scraper.
///
/// # Errors
///
/// Returns an error if the store does not answer the MCP handshake, the
/// first catalog page fails, or the file cannot be written.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    store: &str,
    max_products: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| default_output(store));
    let cap = (max_products > 0).then_some(max_products);

    let client = McpCatalogClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        retry_policy(config),
    )?;
    let products = client.fetch_raw_catalog(store, cap).await?;

    let json = serde_json::to_vec_pretty(&products)?;
    write_atomic(&output, &json).await?;
    println!("Saved {} products to {}", products.len(), output.display());
    Ok(())
}

/// Products in the file at `path`; a missing file counts as empty.
async fn read_or_empty(path: &Path) -> anyhow::Result<Vec<Product>> {
    match read_products(path).await {
        Ok(products) => Ok(products),
        Err(CatalogError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "catalog file not found; treating as empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Render the best match for `query` over the two catalogs, in the
/// `/agent` product shape plus the score.
pub(crate) fn match_json(
    shopify: &[Product],
    external: &[Product],
    query: &str,
) -> Option<serde_json::Value> {
    let found = best_match(shopify.iter().chain(external.iter()), query)?;
    Some(serde_json::json!({
        "score": found.score,
        "product": MatchResult::from(found.product),
    }))
}

/// Print the best match for `query` from the cached catalog files.
///
/// # Errors
///
/// Returns an error if a catalog file is unreadable or nothing matches.
pub(crate) async fn run_match(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let shopify = read_or_empty(&config.products_path).await?;
    let external = read_or_empty(&config.external_products_path).await?;

    let Some(found) = match_json(&shopify, &external, query) else {
        anyhow::bail!("no in-stock product matches \"{query}\"");
    };
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
