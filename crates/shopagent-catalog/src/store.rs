//! JSON mirror of a catalog slot on disk.

use std::path::{Path, PathBuf};

use shopagent_core::Product;

use crate::error::CatalogError;

/// Reads a product array from `path`.
///
/// # Errors
///
/// [`CatalogError::Io`] if the file cannot be read (including when it does
/// not exist), [`CatalogError::Parse`] if it is not a JSON product array.
pub async fn read_products(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| io_error(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replaces the file at `path` with `bytes`.
///
/// Writes to a temp file in the same directory and renames it over the
/// target, so readers see either the old file or the new one. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if any step fails. The temp file is removed
/// on a failed rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CatalogError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await.map_err(|e| io_error(&dir, e))?;

    let file_name = path
        .file_name()
        .map_or_else(|| "catalog".into(), |n| n.to_string_lossy().into_owned());
    let tmp = dir.join(format!(".{file_name}-{}.tmp", uuid::Uuid::new_v4().simple()));

    tokio::fs::write(&tmp, bytes).await.map_err(|e| io_error(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_error(path, e));
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.to_path_buf(),
        source,
    }
}
