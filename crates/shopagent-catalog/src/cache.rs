use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shopagent_core::Product;
use tokio::sync::{Mutex, RwLock};

use crate::error::CatalogError;
use crate::store::{read_products, write_atomic};

/// One independently refreshed part of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The merchant's own Shopify catalog (base products file).
    Shopify,
    /// Products gathered from other storefronts.
    External,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Shopify, Slot::External];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shopify => "shopify",
            Self::External => "external",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reading a slot's file at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Missing,
    Corrupt,
}

impl LoadOutcome {
    /// Whether the slot still needs a fetch before it has any data.
    #[must_use]
    pub fn needs_refresh(self) -> bool {
        !matches!(self, Self::Loaded(_))
    }
}

struct SlotState {
    path: PathBuf,
    products: RwLock<Option<Arc<Vec<Product>>>>,
    refresh_lock: Mutex<()>,
}

impl SlotState {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            products: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }
}

/// In-memory catalog with a JSON file per slot.
///
/// Readers take a [`CatalogSnapshot`] and never wait on a fetch. Each slot is
/// replaced wholesale by [`CatalogCache::refresh_slot`], which holds a
/// per-slot lock for the whole fetch-swap-persist sequence so refreshes of
/// the same slot run one at a time.
pub struct CatalogCache {
    shopify: SlotState,
    external: SlotState,
}

impl CatalogCache {
    #[must_use]
    pub fn new(products_path: impl Into<PathBuf>, external_path: impl Into<PathBuf>) -> Self {
        Self {
            shopify: SlotState::new(products_path.into()),
            external: SlotState::new(external_path.into()),
        }
    }

    fn state(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::Shopify => &self.shopify,
            Slot::External => &self.external,
        }
    }

    /// File backing `slot`.
    #[must_use]
    pub fn path(&self, slot: Slot) -> &Path {
        &self.state(slot).path
    }

    /// Loads `slot` from its file, replacing the in-memory contents.
    ///
    /// A missing or unparseable file leaves the slot untouched and is
    /// reported through [`LoadOutcome`] so the caller can fall back to a
    /// fetch.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] for read failures other than a missing
    /// file.
    pub async fn load_from_disk(&self, slot: Slot) -> Result<LoadOutcome, CatalogError> {
        let state = self.state(slot);
        match read_products(&state.path).await {
            Ok(products) => {
                let count = products.len();
                *state.products.write().await = Some(Arc::new(products));
                tracing::info!(slot = %slot, count, path = %state.path.display(), "catalog: loaded from disk");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(CatalogError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::info!(slot = %slot, path = %state.path.display(), "catalog: no file on disk");
                Ok(LoadOutcome::Missing)
            }
            Err(CatalogError::Parse { path, source }) => {
                tracing::warn!(slot = %slot, path = %path.display(), error = %source, "catalog: file is corrupt");
                Ok(LoadOutcome::Corrupt)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches fresh contents for `slot` with `fetch`, swaps them in, and
    /// mirrors them to disk.
    ///
    /// On fetch failure the previous contents stay in place. A failed disk
    /// write is logged; the in-memory swap still stands. Returns the new
    /// product count.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] wrapping the fetch error.
    pub async fn refresh_slot<F, Fut, E>(&self, slot: Slot, fetch: F) -> Result<usize, CatalogError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Product>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let state = self.state(slot);
        let _guard = state.refresh_lock.lock().await;

        let products = match fetch().await {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(slot = %slot, error = %e, "catalog: refresh failed; keeping previous contents");
                return Err(CatalogError::Fetch {
                    slot,
                    source: Box::new(e),
                });
            }
        };

        let count = products.len();
        let products = Arc::new(products);
        *state.products.write().await = Some(Arc::clone(&products));
        tracing::info!(slot = %slot, count, "catalog: refreshed");

        if let Err(e) = persist(slot, &state.path, &products).await {
            tracing::warn!(slot = %slot, error = %e, "catalog: failed to write file; in-memory catalog updated");
        }
        Ok(count)
    }

    /// Current contents of `slot`, or `None` if it has never been populated.
    pub async fn slot(&self, slot: Slot) -> Option<Arc<Vec<Product>>> {
        self.state(slot).products.read().await.clone()
    }

    /// Whether any slot has been populated, from disk or by a fetch.
    pub async fn is_initialized(&self) -> bool {
        for slot in Slot::ALL {
            if self.state(slot).products.read().await.is_some() {
                return true;
            }
        }
        false
    }

    /// Point-in-time view of both slots.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        let empty = || Arc::new(Vec::new());
        CatalogSnapshot {
            shopify: self.slot(Slot::Shopify).await.unwrap_or_else(empty),
            external: self.slot(Slot::External).await.unwrap_or_else(empty),
        }
    }
}

async fn persist(slot: Slot, path: &Path, products: &[Product]) -> Result<(), CatalogError> {
    let json = serde_json::to_vec_pretty(products)
        .map_err(|source| CatalogError::Serialize { slot, source })?;
    write_atomic(path, &json).await
}

/// Both slots as of one moment. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub shopify: Arc<Vec<Product>>,
    pub external: Arc<Vec<Product>>,
}

impl CatalogSnapshot {
    /// Every product, Shopify first, then external.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.shopify.iter().chain(self.external.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shopify.len() + self.external.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
