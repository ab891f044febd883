//! HTTP client for the Shopify Admin REST `products.json` endpoint.

mod fetch_all;
mod origin;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use shopagent_core::ShopifyConfig;

use crate::error::ScraperError;
use crate::pagination::next_page_info;
use crate::retry::RetryPolicy;
use crate::types::ShopifyProductsResponse;

pub use origin::{store_base_url, store_host, store_slug};

/// Page size requested from the Admin API (its maximum).
pub const PAGE_LIMIT: u32 = 250;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on cycling cursors.
pub(super) const MAX_PAGES: usize = 200;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Authenticated client for one Shopify store's Admin API.
///
/// Maps 401/403, 404, 429 and other non-2xx responses to typed errors and
/// returns the next-page cursor from the `Link` header.
pub struct ShopifyAdminClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    pub(super) access_token: String,
    pub(super) api_version: String,
    pub(super) retry: RetryPolicy,
}

impl ShopifyAdminClient {
    /// Creates a client for the store named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidStore`] if the store domain is not a
    /// valid host, or [`ScraperError::Http`] if the `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        config: &ShopifyConfig,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(
            &config.store_domain,
            &config.access_token,
            &config.api_version,
            timeout_secs,
            user_agent,
            retry,
        )
    }

    /// Creates a client against an explicit base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        api_version: &str,
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
            base_url: store_base_url(base_url)?,
            access_token: access_token.to_owned(),
            api_version: api_version.to_owned(),
            retry,
        })
    }

    /// Store host, for log fields.
    #[must_use]
    pub fn store(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// Fetches one page of products.
    ///
    /// Returns the parsed page and the `page_info` cursor of the next page,
    /// or `None` on the last page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Unauthorized`]: HTTP 401/403.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after any configured retries.
    /// - [`ScraperError::NotFound`]: HTTP 404 (wrong API version or domain).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure.
    /// - [`ScraperError::Deserialize`]: body does not match the product shape.
    pub async fn fetch_products_page(
        &self,
        page_info: Option<&str>,
    ) -> Result<(ShopifyProductsResponse, Option<String>), ScraperError> {
        let url = self.products_url(page_info);

        self.retry
            .run(|| {
                let url = url.clone();
                async move {
                    let response = self
                        .client
                        .get(url.clone())
                        .header(ACCESS_TOKEN_HEADER, &self.access_token)
                        .header(reqwest::header::ACCEPT, "application/json")
                        .send()
                        .await?;
                    let status = response.status();
                    let url = url.to_string();

                    match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            return Err(ScraperError::Unauthorized { url });
                        }
                        StatusCode::NOT_FOUND => return Err(ScraperError::NotFound { url }),
                        StatusCode::TOO_MANY_REQUESTS => {
                            let retry_after_secs = response
                                .headers()
                                .get(reqwest::header::RETRY_AFTER)
                                .and_then(|v| v.to_str().ok())
                                .and_then(parse_retry_after)
                                .unwrap_or(2);
                            return Err(ScraperError::RateLimited {
                                domain: self.store().to_owned(),
                                retry_after_secs,
                            });
                        }
                        s if !s.is_success() => {
                            return Err(ScraperError::UnexpectedStatus {
                                status: s.as_u16(),
                                url,
                            });
                        }
                        _ => {}
                    }

                    // Read the Link header before the body consumes the response.
                    let next = next_page_info(
                        response
                            .headers()
                            .get(reqwest::header::LINK)
                            .and_then(|v| v.to_str().ok()),
                    );

                    let body = response.text().await?;
                    let parsed = serde_json::from_str::<ShopifyProductsResponse>(&body)
                        .map_err(|e| ScraperError::Deserialize {
                            context: format!("products page from {}", self.store()),
                            source: e,
                        })?;

                    Ok((parsed, next))
                }
            })
            .await
    }

    /// `{base}/admin/api/{version}/products.json?limit=250[&page_info=…]`.
    ///
    /// Shopify rejects any filter other than `limit` alongside `page_info`,
    /// so the cursor request carries nothing else.
    pub(super) fn products_url(&self, page_info: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("admin/api/{}/products.json", self.api_version));
        url.query_pairs_mut()
            .append_pair("limit", &PAGE_LIMIT.to_string());
        if let Some(cursor) = page_info {
            url.query_pairs_mut().append_pair("page_info", cursor);
        }
        url
    }
}

/// Shopify sends `Retry-After` as fractional seconds (`"2.0"`).
fn parse_retry_after(raw: &str) -> Option<u64> {
    let secs = raw.trim().parse::<f64>().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(secs.ceil() as u64)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
