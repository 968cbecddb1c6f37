//! Standalone HTML catalog page.

use chrono::{DateTime, Datelike, Utc};

use crate::models::ProductRecord;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub contact: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Product Catalog".to_string(),
            contact: None,
            generated_at: Utc::now(),
        }
    }
}

const STYLE: &str = r#"
body { background: #f8f9fa; margin: 0; font-family: 'Segoe UI', Arial, sans-serif; }
.catalog-header {
    background: linear-gradient(90deg, #007bff 0%, #00c6ff 100%);
    color: white;
    text-align: center;
    padding: 2rem 1rem 1rem 1rem;
    font-size: 2.2rem;
    font-weight: bold;
    letter-spacing: 2px;
    border-radius: 0 0 1.5rem 1.5rem;
    box-shadow: 0 2px 12px rgba(0,0,0,0.08);
    line-height: 1.3;
}
.catalog-header .contact {
    display: block;
    font-size: 1rem;
    font-weight: 400;
    margin-top: 0.7rem;
    color: #e0f7fa;
}
.catalog-footer {
    background: #222;
    color: #fff;
    text-align: center;
    padding: 1.5rem 1rem 2rem 1rem;
    font-size: 1.2rem;
    border-radius: 1.5rem 1.5rem 0 0;
    margin-top: 2rem;
    letter-spacing: 1px;
}
.catalog-grid {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 2rem;
    padding: 2rem 2vw;
    max-width: 1200px;
    margin: 0 auto;
}
.product-card {
    background: #fff;
    border-radius: 1rem;
    box-shadow: 0 4px 24px rgba(0,0,0,0.10);
    overflow: hidden;
    display: flex;
    flex-direction: column;
    align-items: center;
    transition: transform 0.15s, box-shadow 0.15s;
    padding-bottom: 1.5rem;
}
.product-card:hover {
    transform: translateY(-6px) scale(1.03);
    box-shadow: 0 8px 32px rgba(0,0,0,0.16);
}
.product-img {
    width: 100%;
    max-width: 240px;
    aspect-ratio: 4/3;
    object-fit: contain;
    background: #f0f0f0;
    margin-bottom: 1rem;
    border-bottom: 1px solid #eee;
}
.product-name {
    font-size: 1.1rem;
    font-weight: 600;
    color: #222;
    text-align: center;
    margin: 0.5rem 1rem;
    letter-spacing: 0.5px;
}
@media (max-width: 900px) {
    .catalog-grid { grid-template-columns: repeat(2, 1fr); }
}
@media (max-width: 600px) {
    .catalog-header { font-size: 1.2rem; padding: 1.2rem 0.5rem 0.5rem 0.5rem; }
    .catalog-footer { font-size: 1rem; padding: 1rem 0.5rem 1.2rem 0.5rem; }
    .catalog-grid { padding: 1rem 0.5vw; gap: 1rem; grid-template-columns: 1fr; }
    .product-card { border-radius: 0.7rem; }
}
"#;

pub fn render_catalog(products: &[ProductRecord], options: &RenderOptions) -> String {
    let title = escape_html(&options.title);

    let mut html = String::with_capacity(STYLE.len() + products.len() * 256 + 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<meta name=\"generated\" content=\"{}\">\n",
        options.generated_at.to_rfc3339()
    ));
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<div class=\"catalog-header\">\n    {title}\n"));
    if let Some(contact) = &options.contact {
        html.push_str(&format!("    <span class=\"contact\">{}</span>\n", escape_html(contact)));
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"catalog-grid\">\n");
    for product in products {
        let name = escape_html(&product.product_name);
        let src = escape_html(&product.image_url);
        html.push_str("    <div class=\"product-card\">\n");
        html.push_str(&format!(
            "        <img class=\"product-img\" src=\"{src}\" alt=\"{name}\">\n"
        ));
        html.push_str(&format!("        <div class=\"product-name\">{name}</div>\n"));
        html.push_str("    </div>\n");
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"catalog-footer\">End of Catalog &copy; {}</div>\n",
        options.generated_at.year()
    ));
    html.push_str("</body>\n</html>\n");
    html
}

/// Escape for both text and double/single-quoted attribute positions.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
