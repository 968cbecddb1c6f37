use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3"
);

/// Run configuration. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for sitemap and product page fetches.
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Heading used for the rendered catalog page.
    pub title: String,
    /// Optional contact line shown under the heading.
    pub contact: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 100,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            title: "Product Catalog".to_string(),
            contact: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load from a JSON file when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(CatalogError::Validation(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CatalogError::Parse(format!("config {}: {e}", path.display())))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
