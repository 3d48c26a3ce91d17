//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Every `<a href>` with its anchor text and the text surrounding it

use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Title recorded when a page has no usable `<title>`
pub const NO_TITLE: &str = "No title";

/// Anchor text recorded when a link has no visible text
pub const NO_TEXT: &str = "No text";

/// Context recorded when a link's parent carries no visible text
pub const NO_CONTENT: &str = "No content";

/// A candidate outbound link found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLink {
    /// Absolute destination URL
    pub url: String,

    /// Visible anchor text
    pub text: String,

    /// Visible text of the anchor's parent element, truncated
    pub content: String,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: String,

    /// All links found on the page, in document order
    pub links: Vec<ExtractedLink>,
}

/// Parses HTML content and extracts the title and outbound links
///
/// # Link Extraction Rules
///
/// - Every `<a>` carrying an `href` is considered, in document order
/// - The href is resolved against `base_url`; links that do not resolve to
///   an absolute URL with a host are dropped (`mailto:`, `javascript:`, ...)
/// - Duplicate destinations are kept
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
/// * `excerpt_size` - Maximum number of characters kept from the parent text
///
/// # Example
///
/// ```
/// use url_evaluator::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>See <a href="/page">this page</a></p></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &base_url, 200);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links[0].url, "https://example.com/page");
/// assert_eq!(parsed.links[0].text, "this page");
/// assert_eq!(parsed.links[0].content, "See this page");
/// ```
pub fn parse_page(html: &str, base_url: &Url, excerpt_size: usize) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string());
    let links = extract_links(&document, base_url, excerpt_size);

    ParsedPage { title, links }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url, excerpt_size: usize) -> Vec<ExtractedLink> {
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base_url) else {
            continue;
        };

        let text = visible_text(element);
        let content = element
            .parent()
            .and_then(ElementRef::wrap)
            .map(visible_text)
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(excerpt_size).collect::<String>());

        links.push(ExtractedLink {
            url,
            text: if text.is_empty() {
                NO_TEXT.to_string()
            } else {
                text
            },
            content: content.unwrap_or_else(|| NO_CONTENT.to_string()),
        });
    }

    links
}

/// Joins the trimmed, non-empty text nodes under an element with single spaces
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
