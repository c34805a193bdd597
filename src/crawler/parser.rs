//! Link discovery
//!
//! Pulls the outgoing links and the title out of a fetched page. Links are
//! resolved against the page's final URL; relevance filtering happens later.

use scraper::{Html, Selector};
use url::Url;

/// Hrefs with these prefixes never lead to another page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Links and metadata found on one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Outgoing links, absolute, in document order
    pub links: Vec<Url>,
}

/// Parses page markup and extracts links and title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - fragment-only hrefs (same-page anchors)
/// - anything that does not resolve to HTTP or HTTPS
///
/// # Example
///
/// ```
/// use docs_harvester::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Docs</title></head><body><a href="api">API</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/docs/").unwrap();
/// let parsed = parse_html(html, &page_url);
/// assert_eq!(parsed.title.as_deref(), Some("Docs"));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/docs/api");
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, page_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(anchors) = Selector::parse("a[href]") {
        for element in document.select(&anchors) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, page_url))
            {
                links.push(url);
            }
        }
    }

    if let Ok(canonical) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical) {
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, page_url))
            {
                links.push(url);
            }
        }
    }

    links
}

/// Resolves an href against the page URL, or None if it should be skipped
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let resolved = page_url.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}
