use std::fmt;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extract::Extractor;
use crate::fetcher::PageSource;
use crate::models::ProductRecord;
use crate::sitemap;

/// Product pages are recognized by this path fragment only.
pub const PRODUCT_MARKER: &str = "/product/";

pub fn product_urls<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    urls.iter()
        .map(AsRef::as_ref)
        .filter(|u| u.contains(PRODUCT_MARKER))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Failed(String),
    Incomplete { missing_name: bool, missing_image: bool },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Failed(e) => write!(f, "{e}"),
            SkipReason::Incomplete { missing_name: true, missing_image: true } => {
                write!(f, "no name or image found")
            }
            SkipReason::Incomplete { missing_name: true, .. } => write!(f, "no name found"),
            SkipReason::Incomplete { .. } => write!(f, "no image found"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedPage {
    pub url: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub sitemap_url: String,
    /// `<loc>` entries in the sitemap.
    pub loc_count: usize,
    pub product_url_count: usize,
    pub records: Vec<ProductRecord>,
    pub skipped: Vec<SkippedPage>,
}

/// Sitemap to records, one page at a time.
///
/// Only the sitemap itself is fail-fast. A product page that cannot be
/// fetched, or that lacks a name or image, is recorded in `skipped` and the
/// run continues.
pub fn harvest(
    source: &impl PageSource,
    extractor: &Extractor,
    sitemap_url: &str,
) -> Result<HarvestReport> {
    let locs = sitemap::fetch_locs(source, sitemap_url)?;
    let pages = product_urls(&locs);
    info!(
        sitemap = sitemap_url,
        locs = locs.len(),
        product_pages = pages.len(),
        "harvest started"
    );

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (i, url) in pages.iter().enumerate() {
        debug!(page = i + 1, total = pages.len(), url = %url, "extracting");
        let reason = match extractor.try_extract(source, url) {
            Ok(extraction) => {
                let reason = SkipReason::Incomplete {
                    missing_name: extraction.name.is_none(),
                    missing_image: extraction.image_url.is_none(),
                };
                match extraction.into_record() {
                    Some(record) => {
                        records.push(record);
                        continue;
                    }
                    None => reason,
                }
            }
            Err(e) => SkipReason::Failed(e.to_string()),
        };
        warn!(url = %url, reason = %reason, "page skipped");
        skipped.push(SkippedPage { url: url.clone(), reason });
    }

    info!(found = records.len(), skipped = skipped.len(), "harvest finished");

    Ok(HarvestReport {
        sitemap_url: sitemap_url.trim().to_string(),
        loc_count: locs.len(),
        product_url_count: pages.len(),
        records,
        skipped,
    })
}
