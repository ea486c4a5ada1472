//! Catalog loading — reads every service pricing file in a directory.
//!
//! Each `*.json` file holds an array of records. Files that fail to read or
//! parse are logged and skipped; only an entirely empty result is an error,
//! since the conversation cannot offer services without a catalog.

use std::path::Path;

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogRecord};
use crate::error::CatalogError;

/// Load and assemble the catalog from a directory of JSON pricing files.
pub fn load_dir(dir: &Path) -> Result<Catalog, CatalogError> {
    let listing = std::fs::read_dir(dir).map_err(|e| CatalogError::Read {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut records: Vec<CatalogRecord> = Vec::new();
    let mut files = 0usize;
    for dirent in listing.flatten() {
        let path = dirent.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable catalog file");
                continue;
            }
        };
        match serde_json::from_str::<Vec<CatalogRecord>>(&raw) {
            Ok(mut file_records) => {
                files += 1;
                records.append(&mut file_records);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping malformed catalog file");
            }
        }
    }

    let catalog = Catalog::from_records(records);
    if catalog.is_empty() {
        return Err(CatalogError::Empty(dir.display().to_string()));
    }
    info!(
        files,
        services = catalog.main_services().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}
