//! In-memory curation of a loaded catalog.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::archiver;
use crate::error::{CatalogError, Result};
use crate::models::ProductRecord;
use crate::render::{self, RenderOptions};

pub const GRID_COLUMNS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<ProductRecord>,
}

impl Catalog {
    pub fn new(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove a batch of positions, all referring to the current order.
    /// Nothing is removed if any index is out of range.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Result<usize> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.records.len()) {
            return Err(CatalogError::Validation(format!(
                "no product at index {bad} (catalog has {})",
                self.records.len()
            )));
        }
        for &i in indices.iter().rev() {
            self.records.remove(i);
        }
        Ok(indices.len())
    }

    /// Display rows, each entry paired with its current index.
    pub fn rows(&self) -> Vec<Vec<(usize, &ProductRecord)>> {
        self.records
            .chunks(GRID_COLUMNS)
            .enumerate()
            .map(|(row, chunk)| {
                chunk
                    .iter()
                    .enumerate()
                    .map(|(col, product)| (row * GRID_COLUMNS + col, product))
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// State was (re)initialized from the file.
    Fresh,
    /// The same upload was seen before; earlier edits are kept.
    Resumed,
}

#[derive(Debug, Clone)]
struct Upload {
    file_name: String,
    records: Vec<ProductRecord>,
}

/// One user's working copy of an uploaded catalog.
///
/// An upload is identified by file name *and* content, so re-uploading an
/// edited file under the same name starts over rather than keeping edits
/// made against the old content.
#[derive(Debug, Default)]
pub struct CurationSession {
    upload: Option<Upload>,
    catalog: Catalog,
}

impl CurationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, file_name: &str, records: Vec<ProductRecord>) -> Result<LoadOutcome> {
        if file_name.trim().is_empty() {
            return Err(CatalogError::Validation("uploaded file has no name".into()));
        }

        if let Some(upload) = &self.upload {
            if upload.file_name == file_name && upload.records == records {
                debug!(file = file_name, "same upload, keeping edits");
                return Ok(LoadOutcome::Resumed);
            }
        }

        info!(file = file_name, count = records.len(), "catalog loaded");
        self.catalog = Catalog::new(records.clone());
        self.upload = Some(Upload { file_name: file_name.to_string(), records });
        Ok(LoadOutcome::Fresh)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.file_name.as_str())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Result<usize> {
        if self.upload.is_none() {
            return Err(CatalogError::Validation("no catalog loaded".into()));
        }
        let removed = self.catalog.remove(indices)?;
        info!(removed, remaining = self.catalog.len(), "products deleted");
        Ok(removed)
    }

    pub fn render_html(&self, options: &RenderOptions) -> String {
        render::render_catalog(self.catalog.records(), options)
    }

    pub fn export_json(&self) -> Result<String> {
        archiver::to_json(self.catalog.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new("A", "https://x.example/a.png"),
            ProductRecord::new("B", "https://x.example/b.png"),
            ProductRecord::new("C", "https://x.example/c.png"),
        ]
    }

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.records().iter().map(|p| p.product_name.as_str()).collect()
    }

    #[test]
    fn delete_single_index() {
        let mut catalog = Catalog::new(abc());
        catalog.remove(&BTreeSet::from([1])).unwrap();
        assert_eq!(names(&catalog), vec!["A", "C"]);
    }

    #[test]
    fn delete_batch_uses_original_positions() {
        let mut catalog = Catalog::new(abc());
        assert_eq!(catalog.remove(&BTreeSet::from([0, 2])).unwrap(), 2);
        assert_eq!(names(&catalog), vec!["B"]);
    }

    #[test]
    fn out_of_range_batch_changes_nothing() {
        let mut catalog = Catalog::new(abc());
        let err = catalog.remove(&BTreeSet::from([0, 3])).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn rows_of_three_with_indices() {
        let mut records = abc();
        records.push(ProductRecord::new("D", "https://x.example/d.png"));
        let catalog = Catalog::new(records);
        let rows = catalog.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1][0].0, 3);
        assert_eq!(rows[1][0].1.product_name, "D");
    }

    #[test]
    fn same_upload_resumes_edits() {
        let mut session = CurationSession::new();
        assert_eq!(session.load("shop.json", abc()).unwrap(), LoadOutcome::Fresh);
        session.remove(&BTreeSet::from([0])).unwrap();

        assert_eq!(session.load("shop.json", abc()).unwrap(), LoadOutcome::Resumed);
        assert_eq!(names(session.catalog()), vec!["B", "C"]);
    }

    #[test]
    fn different_name_resets() {
        let mut session = CurationSession::new();
        session.load("shop.json", abc()).unwrap();
        session.remove(&BTreeSet::from([0])).unwrap();

        assert_eq!(session.load("other.json", abc()).unwrap(), LoadOutcome::Fresh);
        assert_eq!(session.catalog().len(), 3);
        assert_eq!(session.file_name(), Some("other.json"));
    }

    #[test]
    fn same_name_different_content_resets() {
        let mut session = CurationSession::new();
        session.load("shop.json", abc()).unwrap();
        session.remove(&BTreeSet::from([0])).unwrap();

        let mut changed = abc();
        changed.push(ProductRecord::new("D", "https://x.example/d.png"));
        assert_eq!(session.load("shop.json", changed).unwrap(), LoadOutcome::Fresh);
        assert_eq!(session.catalog().len(), 4);
    }

    #[test]
    fn remove_before_load_is_rejected() {
        let mut session = CurationSession::new();
        assert!(session.remove(&BTreeSet::from([0])).is_err());
        assert!(session.load("  ", abc()).is_err());
    }

    #[test]
    fn exports_reflect_deletions() {
        let mut session = CurationSession::new();
        session.load("shop.json", abc()).unwrap();
        session.remove(&BTreeSet::from([1])).unwrap();

        let json = session.export_json().unwrap();
        assert_eq!(archiver::from_json(&json).unwrap(), vec![abc()[0].clone(), abc()[2].clone()]);

        let html = session.render_html(&RenderOptions::default());
        assert!(html.contains(">A<") && html.contains(">C<"));
        assert!(!html.contains(">B<"));
    }
}
