use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_name: String,
    pub image_url: String,
}

impl ProductRecord {
    pub fn new(product_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            image_url: image_url.into(),
        }
    }
}
