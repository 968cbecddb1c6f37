//! Output file naming for harvested catalogs.
//!
//! Sitemap generators often host the sitemap on their own domain and carry
//! the crawled site in the path (".../download/shop.ir-2d83255a7/sitemap.xml"),
//! so directory segments are searched before the host.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const FALLBACK_STEM: &str = "products";

static DOMAIN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9-]+\.[A-Za-z]{2,}").unwrap());

/// Domain-like stem for the output file of a harvest.
pub fn domain_stem(sitemap_url: &str) -> String {
    let sitemap_url = sitemap_url.trim();

    let stem = match Url::parse(sitemap_url) {
        Ok(url) => from_path_dirs(&url).or_else(|| url.host_str().map(str::to_string)),
        Err(_) => DOMAIN_TOKEN.find(sitemap_url).map(|m| m.as_str().to_string()),
    };

    stem.map(|s| sanitize(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

pub fn json_file_name(sitemap_url: &str) -> String {
    format!("{}.json", domain_stem(sitemap_url))
}

fn from_path_dirs(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let (_file, dirs) = segments.split_last()?;
    dirs.iter()
        .find_map(|seg| DOMAIN_TOKEN.find(seg))
        .map(|m| m.as_str().to_string())
}

fn sanitize(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    cleaned.trim_matches('.').to_string()
}
