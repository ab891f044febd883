//! External-products source: storefront catalogs for stores that are not
//! the merchant's own.
//!
//! Stores are fetched either with the built-in MCP client or by running an
//! operator-supplied command that writes the same raw JSON array.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use shopagent_core::Product;
use tokio::process::Command;

use crate::client::{store_host, store_slug};
use crate::error::ScraperError;
use crate::mcp::{parse_products, McpCatalogClient, McpProduct};
use crate::normalize::normalize_mcp_product;

/// Runs an external catalog downloader once per store.
///
/// The command is invoked as
/// `<program> [args…] --store <domain> --max-products <n> --output <file>`
/// (`n = 0` means unlimited) and must write a JSON array of raw catalog
/// entries to `<file>`.
#[derive(Debug, Clone)]
pub struct ProcessScraper {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl ProcessScraper {
    /// Parses a whitespace-separated command line such as
    /// `"python3 scripts/download_catalog.py"`. Returns `None` if blank.
    #[must_use]
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            work_dir: std::env::temp_dir(),
        })
    }

    /// Directory for the per-run output files. Defaults to the OS temp dir.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Runs the command for `store` and parses what it wrote.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::ExternalIo`] if the command cannot be spawned or
    ///   its output file cannot be read.
    /// - [`ScraperError::ExternalCommand`] on a non-zero exit status.
    /// - [`ScraperError::Deserialize`] if the output is not a JSON array.
    pub async fn fetch_store(
        &self,
        store: &str,
        max_products: Option<usize>,
    ) -> Result<Vec<McpProduct>, ScraperError> {
        let host = store_host(store);
        let output = self.work_dir.join(format!(
            "{}_{}.json",
            store_slug(store),
            uuid::Uuid::new_v4().simple()
        ));

        let result = self.run(&host, max_products, &output).await;
        if let Err(e) = tokio::fs::remove_file(&output).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(store = %host, path = %output.display(), error = %e, "could not remove scraper output");
            }
        }
        let raw = result?;

        let mut products = parse_products(&host, raw);
        if let Some(cap) = max_products {
            products.truncate(cap);
        }
        Ok(products)
    }

    async fn run(
        &self,
        host: &str,
        max_products: Option<usize>,
        output: &Path,
    ) -> Result<Vec<serde_json::Value>, ScraperError> {
        let io_err = |source: std::io::Error| ScraperError::ExternalIo {
            store: host.to_owned(),
            source,
        };

        tracing::debug!(store = %host, program = %self.program, "running external scraper");
        let result = Command::new(&self.program)
            .args(&self.args)
            .arg("--store")
            .arg(host)
            .arg("--max-products")
            .arg(max_products.unwrap_or(0).to_string())
            .arg("--output")
            .arg(output)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(io_err)?;

        if !result.status.success() {
            return Err(ScraperError::ExternalCommand {
                store: host.to_owned(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }

        let bytes = tokio::fs::read(output).await.map_err(io_err)?;
        serde_json::from_slice(&bytes).map_err(|e| ScraperError::Deserialize {
            context: format!("external scraper output for {host}"),
            source: e,
        })
    }
}

/// How the external-products slot gets its data.
pub enum ExternalCatalog {
    Native(McpCatalogClient),
    Process(ProcessScraper),
}

impl ExternalCatalog {
    /// Fetches one store's products.
    ///
    /// # Errors
    ///
    /// Whatever the underlying fetcher returns.
    pub async fn fetch_store(
        &self,
        store: &str,
        max_products: Option<usize>,
    ) -> Result<Vec<McpProduct>, ScraperError> {
        match self {
            Self::Native(client) => client.fetch_products(store, max_products).await,
            Self::Process(scraper) => scraper.fetch_store(store, max_products).await,
        }
    }

    /// Fetches every store in order and normalizes the results.
    ///
    /// A store that fails is logged and skipped. An empty store list yields
    /// an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::AllStoresFailed`] when every configured store
    /// failed, so the caller keeps its previous catalog.
    pub async fn fetch_all_stores(
        &self,
        stores: &[String],
        max_products: Option<usize>,
    ) -> Result<Vec<Product>, ScraperError> {
        let mut products = Vec::new();
        let mut failed = 0usize;

        for store in stores {
            match self.fetch_store(store, max_products).await {
                Ok(batch) => {
                    let fetched = batch.len();
                    let before = products.len();
                    products.extend(batch.into_iter().filter_map(|p| {
                        match normalize_mcp_product(p, store) {
                            Ok(product) => Some(product),
                            Err(e) => {
                                tracing::warn!(store = %store, error = %e, "skipping product");
                                None
                            }
                        }
                    }));
                    tracing::info!(
                        store = %store,
                        fetched,
                        kept = products.len() - before,
                        "fetched external catalog"
                    );
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(store = %store, error = %e, "external store fetch failed");
                }
            }
        }

        if !stores.is_empty() && failed == stores.len() {
            return Err(ScraperError::AllStoresFailed { count: failed });
        }
        Ok(products)
    }
}
