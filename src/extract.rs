//! Product name and image extraction from arbitrary shop markup.
//!
//! Every lookup is an ordered cascade of CSS selectors where the first
//! selector that yields a usable element wins. The lists below are the whole
//! heuristic; tune them here when a site is missed.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{CatalogError, Result};
use crate::fetcher::PageSource;
use crate::models::ProductRecord;

pub const CONTAINER_SELECTORS: &[&str] = &[
    ".product",
    ".product-detail",
    ".product-details",
    ".woocommerce-product-details",
    ".single-product",
    ".product-info",
    ".product-content",
    ".product-page",
    ".product-view",
];

/// Tried inside the product container.
pub const CONTAINER_IMAGE_SELECTORS: &[&str] = &[
    "img.wp-post-image",
    "img.attachment-shop_single",
    "img.attachment-woocommerce_thumbnail",
    "img",
];

/// Tried across the whole page when the container gave no image.
pub const PAGE_IMAGE_SELECTORS: &[&str] = &[
    ".product img",
    ".woocommerce-product-gallery__image img",
    ".gallery img",
    ".product-image img",
    "img.wp-post-image",
    "img.attachment-shop_single",
    "img.attachment-woocommerce_thumbnail",
    "img",
];

pub const HEADING_SELECTOR: &str = "h1, h2";

struct Step {
    css: &'static str,
    selector: Selector,
}

/// An ordered list of compiled selectors.
pub struct Cascade {
    steps: Vec<Step>,
}

impl Cascade {
    pub fn compile(css: &[&'static str]) -> Result<Self> {
        let steps = css
            .iter()
            .map(|&css| {
                Selector::parse(css)
                    .map(|selector| Step { css, selector })
                    .map_err(|e| CatalogError::Parse(format!("selector {css:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// First element matched by the earliest selector that matches anything.
    pub fn first_match<'a>(&self, scope: ElementRef<'a>) -> Option<(&'static str, ElementRef<'a>)> {
        self.find_map(scope, Some)
    }

    /// Only the first match of each selector is offered to `accept`; a
    /// rejected match moves on to the next selector, not the next element.
    pub fn find_map<'a, T>(
        &self,
        scope: ElementRef<'a>,
        mut accept: impl FnMut(ElementRef<'a>) -> Option<T>,
    ) -> Option<(&'static str, T)> {
        self.steps.iter().find_map(|step| {
            let element = scope.select(&step.selector).next()?;
            accept(element).map(|value| (step.css, value))
        })
    }
}

/// What one page yielded. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub name: Option<String>,
    pub image_url: Option<String>,
    /// Container selector that matched, if any.
    pub container: Option<&'static str>,
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.image_url.is_some()
    }

    pub fn into_record(self) -> Option<ProductRecord> {
        match (self.name, self.image_url) {
            (Some(name), Some(image_url)) => Some(ProductRecord::new(name, image_url)),
            _ => None,
        }
    }
}

pub struct Extractor {
    containers: Cascade,
    container_images: Cascade,
    page_images: Cascade,
    heading: Selector,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            containers: Cascade::compile(CONTAINER_SELECTORS)?,
            container_images: Cascade::compile(CONTAINER_IMAGE_SELECTORS)?,
            page_images: Cascade::compile(PAGE_IMAGE_SELECTORS)?,
            heading: Selector::parse(HEADING_SELECTOR)
                .map_err(|e| CatalogError::Parse(format!("selector {HEADING_SELECTOR:?}: {e}")))?,
        })
    }

    /// Fetch `url` and extract from it, reporting why a page failed.
    pub fn try_extract(&self, source: &impl PageSource, url: &str) -> Result<Extraction> {
        let page_url = Url::parse(url)
            .map_err(|e| CatalogError::Validation(format!("bad page URL {url:?}: {e}")))?;
        let html = source.fetch(url)?;
        Ok(self.extract_html(&html, &page_url))
    }

    /// Best-effort form of [`Extractor::try_extract`]: a failed page yields
    /// an empty extraction.
    pub fn extract(&self, source: &impl PageSource, url: &str) -> Extraction {
        self.try_extract(source, url).unwrap_or_else(|e| {
            warn!(url, error = %e, "page skipped");
            Extraction::default()
        })
    }

    pub fn extract_html(&self, html: &str, page_url: &Url) -> Extraction {
        let doc = Html::parse_document(html);
        let page = doc.root_element();

        let mut extraction = Extraction::default();

        if let Some((css, container)) = self.containers.first_match(page) {
            debug!(url = %page_url, container = css, "product container found");
            extraction.container = Some(css);
            extraction.name = self.heading_in(container);
            extraction.image_url = self
                .container_images
                .find_map(container, image_src)
                .map(|(_, src)| src);
        }

        if extraction.name.is_none() {
            extraction.name = self.heading_in(page);
        }
        if extraction.image_url.is_none() {
            extraction.image_url = self.page_images.find_map(page, image_src).map(|(_, src)| src);
        }

        extraction.image_url = extraction.image_url.map(|src| absolutize(&src, page_url));
        extraction
    }

    fn heading_in(&self, scope: ElementRef) -> Option<String> {
        let heading = scope.select(&self.heading).next()?;
        let text = heading.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }
}

fn image_src(img: ElementRef) -> Option<String> {
    let src = img.value().attr("src")?.trim();
    (!src.is_empty()).then(|| src.to_string())
}

/// Resolve a reference without a scheme against the page it came from.
fn absolutize(src: &str, page_url: &Url) -> String {
    match Url::parse(src) {
        Ok(_) => src.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => page_url
            .join(src)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| src.to_string()),
        Err(_) => src.to_string(),
    }
}
