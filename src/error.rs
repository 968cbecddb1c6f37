use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("parse failed: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Fetch(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(format!("invalid catalog JSON: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
