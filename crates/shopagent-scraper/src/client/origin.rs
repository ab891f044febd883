//! Store domain helpers shared by the Shopify and MCP clients.

use reqwest::Url;

use crate::error::ScraperError;

/// Turns a configured store into a base URL.
///
/// Bare domains (`"skims.com"`) get an `https://` scheme; values that already
/// carry a scheme (test servers, `http://127.0.0.1:8080`) keep it. Any path is
/// dropped so endpoints are always resolved from the store root.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidStore`] if the result is not a valid
/// absolute URL with a host.
pub fn store_base_url(store: &str) -> Result<Url, ScraperError> {
    let trimmed = store.trim().trim_end_matches('/');
    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let invalid = |reason: String| ScraperError::InvalidStore {
        store: store.to_owned(),
        reason,
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }

    Url::parse(&format!("{}/", url.origin().ascii_serialization()))
        .map_err(|e| invalid(e.to_string()))
}

/// Hostname used in log fields and error messages. Falls back to the input.
#[must_use]
pub fn store_host(store: &str) -> String {
    store_base_url(store)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| store.to_owned())
}

/// File-name slug for a store: `"www.skims.com"` → `"skims"`,
/// `"shop.example.co.uk"` → `"shop_example_uk"`.
#[must_use]
pub fn store_slug(store: &str) -> String {
    store_host(store)
        .replace("www.", "")
        .replace(".com", "")
        .replace(".co", "")
        .replace(".br", "")
        .replace('.', "_")
}
