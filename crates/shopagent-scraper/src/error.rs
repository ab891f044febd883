use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unauthorized request to {url} (check the access token)")]
    Unauthorized { url: String },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("normalization error for product {source_product_id}: {reason}")]
    Normalization {
        source_product_id: String,
        reason: String,
    },

    #[error("pagination limit reached for {store}: exceeded {max_pages} pages")]
    PaginationLimit { store: String, max_pages: usize },

    #[error("invalid store \"{store}\": {reason}")]
    InvalidStore { store: String, reason: String },

    #[error("{store} does not support the storefront MCP catalog: {reason}")]
    McpUnavailable { store: String, reason: String },

    #[error("MCP call {method} to {store} failed: {message}")]
    McpCall {
        store: String,
        method: String,
        message: String,
    },

    #[error("external scraper for {store} failed ({status}): {stderr}")]
    ExternalCommand {
        store: String,
        status: String,
        stderr: String,
    },

    #[error("external scraper I/O error for {store}: {source}")]
    ExternalIo {
        store: String,
        #[source]
        source: std::io::Error,
    },

    #[error("all {count} external stores failed")]
    AllStoresFailed { count: usize },
}
