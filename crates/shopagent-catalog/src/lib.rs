//! Process-local product catalog with a JSON mirror per slot.

mod cache;
pub mod error;
pub mod store;

pub use cache::{CatalogCache, CatalogSnapshot, LoadOutcome, Slot};
pub use error::CatalogError;
pub use store::{read_products, write_atomic};
