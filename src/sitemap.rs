//! Sitemap `<loc>` harvesting.
//!
//! Only `urlset` documents are read: a sitemap index yields the URLs of its
//! child sitemaps, which are returned as-is and not fetched.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::fetcher::PageSource;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Fetch a sitemap and return the text of every `<loc>` in document order.
pub fn fetch_locs(source: &impl PageSource, sitemap_url: &str) -> Result<Vec<String>> {
    let sitemap_url = sitemap_url.trim();
    if sitemap_url.is_empty() {
        return Err(CatalogError::Validation("a sitemap URL is required".into()));
    }

    let xml = source.fetch(sitemap_url)?;
    let locs = parse_locs(&xml)?;
    info!(sitemap = sitemap_url, count = locs.len(), "sitemap parsed");
    Ok(locs)
}

/// Collect `<loc>` text bound to the sitemaps.org namespace.
pub fn parse_locs(xml: &str) -> Result<Vec<String>> {
    let mut reader = NsReader::from_str(xml);

    let mut locs = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    // (depth of the open <loc>, text collected so far)
    let mut open_loc: Option<(usize, String)> = None;

    loop {
        let event = reader
            .read_resolved_event()
            .map_err(|e| CatalogError::Parse(format!("malformed sitemap XML: {e}")))?;

        match event {
            (ns, Event::Start(e)) => {
                depth += 1;
                saw_root = true;
                if open_loc.is_none() && is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    open_loc = Some((depth, String::new()));
                }
            }
            (ns, Event::Empty(e)) => {
                saw_root = true;
                if open_loc.is_none() && is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    locs.push(String::new());
                }
            }
            (_, Event::Text(t)) => {
                if let Some((_, text)) = open_loc.as_mut() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| CatalogError::Parse(format!("bad entity in <loc>: {e}")))?;
                    text.push_str(&unescaped);
                }
            }
            (_, Event::CData(c)) => {
                if let Some((_, text)) = open_loc.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            (_, Event::End(_)) => {
                if open_loc.as_ref().is_some_and(|(loc_depth, _)| *loc_depth == depth) {
                    if let Some((_, text)) = open_loc.take() {
                        locs.push(text.trim().to_string());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(CatalogError::Parse("sitemap has no root element".into()));
    }
    if depth > 0 {
        return Err(CatalogError::Parse(format!(
            "sitemap ended with {depth} unclosed element(s)"
        )));
    }

    debug!(count = locs.len(), "collected <loc> entries");
    Ok(locs)
}

fn is_sitemap_loc(ns: &ResolveResult, local_name: &[u8]) -> bool {
    local_name == b"loc"
        && matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NS.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://shop.example/product/one/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://shop.example/about/ </loc></url>
  <url><loc>https://shop.example/product/two/?a=1&amp;b=2</loc></url>
</urlset>"#;

    struct Static(HashMap<&'static str, &'static str>);

    impl PageSource for Static {
        fn fetch(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .map(|s| s.to_string())
                .ok_or_else(|| CatalogError::Fetch(format!("HTTP 404 Not Found: {url}")))
        }
    }

    #[test]
    fn returns_every_loc_in_document_order() {
        let locs = parse_locs(URLSET).unwrap();
        assert_eq!(
            locs,
            vec![
                "https://shop.example/product/one/",
                "https://shop.example/about/",
                "https://shop.example/product/two/?a=1&b=2",
            ]
        );
    }

    #[test]
    fn keeps_duplicates() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}">
                 <url><loc>https://a.example/x</loc></url>
                 <url><loc>https://a.example/x</loc></url>
               </urlset>"#
        );
        assert_eq!(parse_locs(&xml).unwrap().len(), 2);
    }

    #[test]
    fn ignores_loc_outside_namespace() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}"
                 xmlns:img="http://www.google.com/schemas/sitemap-image/1.1">
                 <url>
                   <loc>https://a.example/product/p</loc>
                   <img:image><img:loc>https://a.example/p.png</img:loc></img:image>
                 </url>
               </urlset>"#
        );
        assert_eq!(parse_locs(&xml).unwrap(), vec!["https://a.example/product/p"]);

        let bare = "<urlset><url><loc>https://a.example/x</loc></url></urlset>";
        assert!(parse_locs(bare).unwrap().is_empty());
    }

    #[test]
    fn prefixed_namespace_is_recognized() {
        let xml = format!(
            r#"<sm:urlset xmlns:sm="{SITEMAP_NS}"><sm:url>
                 <sm:loc><![CDATA[https://a.example/product/c]]></sm:loc>
               </sm:url></sm:urlset>"#
        );
        assert_eq!(parse_locs(&xml).unwrap(), vec!["https://a.example/product/c"]);
    }

    #[test]
    fn sitemap_index_entries_are_not_expanded() {
        let xml = format!(
            r#"<sitemapindex xmlns="{SITEMAP_NS}"><sitemap>
                 <loc>https://a.example/sitemap-products.xml</loc>
               </sitemap></sitemapindex>"#
        );
        assert_eq!(parse_locs(&xml).unwrap(), vec!["https://a.example/sitemap-products.xml"]);
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        for bad in [
            "",
            "not xml at all",
            "<urlset><url><loc>x</url></urlset>",
            "<urlset><url><loc>x</loc></url>",
        ] {
            let err = parse_locs(bad).unwrap_err();
            assert!(matches!(err, CatalogError::Parse(_)), "{bad:?} gave {err:?}");
        }
    }

    #[test]
    fn fetch_errors_propagate() {
        let source = Static(HashMap::new());
        let err = fetch_locs(&source, "https://a.example/sitemap.xml").unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(_)));
    }

    #[test]
    fn empty_url_is_validation_error() {
        let source = Static(HashMap::new());
        let err = fetch_locs(&source, "  ").unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn fetches_and_parses() {
        let source = Static(HashMap::from([("https://shop.example/sitemap.xml", URLSET)]));
        let locs = fetch_locs(&source, "https://shop.example/sitemap.xml").unwrap();
        assert_eq!(locs.len(), 3);
    }
}
