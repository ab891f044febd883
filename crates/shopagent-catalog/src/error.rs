use std::path::PathBuf;

use thiserror::Error;

use crate::Slot;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog file {path} is not a product array: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {slot} catalog: {source}")]
    Serialize {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },

    #[error("{slot} catalog fetch failed: {source}")]
    Fetch {
        slot: Slot,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
