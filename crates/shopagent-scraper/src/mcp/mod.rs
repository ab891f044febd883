//! Catalog download over a storefront's MCP endpoint.
//!
//! Works against any Shopify-hosted storefront that exposes `/api/mcp`, with
//! no credentials. Used for the external-products slot.

mod types;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::json;

use crate::client::{store_base_url, store_host};
use crate::error::ScraperError;
use crate::retry::RetryPolicy;

pub use types::{McpPriceRange, McpProduct, McpVariant};
use types::{CatalogPage, RpcRequest, RpcResponse, ToolResult};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SEARCH_TOOL: &str = "search_shop_catalog";
const SEARCH_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(300);
const MAX_PAGES: usize = 500;

pub struct McpCatalogClient {
    client: Client,
    retry: RetryPolicy,
    page_delay: Duration,
}

impl McpCatalogClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            retry,
            page_delay: DEFAULT_PAGE_DELAY,
        })
    }

    /// Overrides the pause between catalog pages.
    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Downloads up to `max_products` raw catalog entries (`None` = no cap).
    ///
    /// The first page must succeed. A failure on a later page ends the
    /// download early and keeps what was already fetched.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidStore`] if `store` is not a usable host.
    /// - [`ScraperError::McpUnavailable`] if the `initialize` handshake fails.
    /// - Any error from the first catalog page.
    pub async fn fetch_raw_catalog(
        &self,
        store: &str,
        max_products: Option<usize>,
    ) -> Result<Vec<serde_json::Value>, ScraperError> {
        let mut endpoint = store_base_url(store)?;
        endpoint.set_path("api/mcp");
        let host = store_host(store);

        self.call(
            &endpoint,
            &host,
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "shopagent", "version": env!("CARGO_PKG_VERSION")},
            }),
        )
        .await
        .map_err(|e| ScraperError::McpUnavailable {
            store: host.clone(),
            reason: e.to_string(),
        })?;

        let mut products: Vec<serde_json::Value> = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 1..=MAX_PAGES {
            if max_products.is_some_and(|cap| products.len() >= cap) {
                break;
            }
            if page > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let batch = match self.search_page(&endpoint, &host, cursor.as_deref()).await {
                Ok(batch) => batch,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    tracing::warn!(store = %host, page, error = %e, "catalog page failed; keeping earlier pages");
                    break;
                }
            };

            let fetched = batch.products.len();
            tracing::debug!(store = %host, page, fetched, "fetched catalog page");
            products.extend(batch.products);

            let pagination = batch.pagination.unwrap_or_default();
            match pagination.end_cursor {
                Some(next) if pagination.has_next_page && fetched > 0 => cursor = Some(next),
                _ => break,
            }
        }

        if let Some(cap) = max_products {
            products.truncate(cap);
        }
        tracing::info!(store = %host, count = products.len(), "downloaded storefront catalog");
        Ok(products)
    }

    /// Like [`Self::fetch_raw_catalog`], parsed into [`McpProduct`]s.
    /// Entries that do not parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_raw_catalog`].
    pub async fn fetch_products(
        &self,
        store: &str,
        max_products: Option<usize>,
    ) -> Result<Vec<McpProduct>, ScraperError> {
        let raw = self.fetch_raw_catalog(store, max_products).await?;
        Ok(parse_products(store, raw))
    }

    async fn search_page(
        &self,
        endpoint: &Url,
        host: &str,
        after: Option<&str>,
    ) -> Result<CatalogPage, ScraperError> {
        let mut arguments = json!({
            "query": "*",
            "context": "catalog",
            "limit": SEARCH_PAGE_SIZE,
        });
        if let Some(after) = after {
            arguments["after"] = json!(after);
        }

        let result = self
            .call(
                endpoint,
                host,
                "tools/call",
                json!({"name": SEARCH_TOOL, "arguments": arguments}),
            )
            .await?;

        let tool: ToolResult =
            serde_json::from_value(result).map_err(|e| ScraperError::Deserialize {
                context: format!("{SEARCH_TOOL} result from {host}"),
                source: e,
            })?;

        let Some(text) = tool.content.into_iter().next().and_then(|c| c.text) else {
            return Ok(CatalogPage::default());
        };

        serde_json::from_str(&text).map_err(|e| ScraperError::Deserialize {
            context: format!("{SEARCH_TOOL} page from {host}"),
            source: e,
        })
    }

    /// Sends one JSON-RPC request and returns its `result`.
    async fn call(
        &self,
        endpoint: &Url,
        host: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ScraperError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let request = &request;

        let body = self
            .retry
            .run(|| async move {
                let response = self
                    .client
                    .post(endpoint.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .json(&request)
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(ScraperError::RateLimited {
                        domain: host.to_owned(),
                        retry_after_secs: 1,
                    });
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: endpoint.to_string(),
                    });
                }
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: endpoint.to_string(),
                    });
                }

                Ok(response.text().await?)
            })
            .await?;

        let call_error = |message: String| ScraperError::McpCall {
            store: host.to_owned(),
            method: method.to_owned(),
            message,
        };

        if body.trim().is_empty() {
            return Err(call_error("empty response".to_owned()));
        }

        let envelope: RpcResponse =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("{method} response from {host}"),
                source: e,
            })?;

        if let Some(err) = envelope.error {
            return Err(call_error(format!("{} (code {})", err.message, err.code)));
        }
        envelope
            .result
            .ok_or_else(|| call_error("response has no result".to_owned()))
    }
}

/// Parses raw catalog entries, skipping ones that do not match the product
/// shape.
#[must_use]
pub fn parse_products(store: &str, raw: Vec<serde_json::Value>) -> Vec<McpProduct> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<McpProduct>(value) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(store, error = %e, "skipping unparseable catalog entry");
                None
            }
        })
        .collect()
}
