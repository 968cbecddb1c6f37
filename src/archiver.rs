use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{CatalogError, Result};
use crate::models::ProductRecord;

/// Pretty JSON with two-space indentation; non-ASCII is written as-is.
pub fn to_json(products: &[ProductRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(products)?)
}

pub fn from_json(json: &str) -> Result<Vec<ProductRecord>> {
    Ok(serde_json::from_str(json)?)
}

pub fn save_to_file(products: &[ProductRecord], path: &Path) -> Result<()> {
    let json = to_json(products)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    info!(path = %path.display(), count = products.len(), "catalog JSON written");
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<Vec<ProductRecord>> {
    if !path.exists() {
        return Err(CatalogError::Validation(format!("file not found: {}", path.display())));
    }
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}
