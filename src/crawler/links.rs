//! Listing page link extraction
//!
//! Turns the configured link selector into a deduplicated set of
//! same-origin detail page URLs.

use crate::url::{is_same_origin, resolve_url};
use crate::ScribeError;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts detail page links from a listing page
///
/// # Link Rules
///
/// - Only elements matching `selector` are considered; their `href` is read
/// - The raw href must contain `path_marker`
/// - Relative hrefs are resolved against `base_url`
/// - The resolved URL must share `base_url`'s host and port
///
/// An empty set is a normal result: the listing simply had no products.
///
/// # Example
///
/// ```
/// use site_scribe::crawler::extract_links;
///
/// let html = r#"<div class="grid"><a href="/products/a">A</a><a href="/about">About</a></div>"#;
/// let links = extract_links(html, ".grid a", "/products/", "https://example.com").unwrap();
/// assert_eq!(links.len(), 1);
/// ```
pub fn extract_links(
    html: &str,
    selector: &str,
    path_marker: &str,
    base_url: &str,
) -> Result<BTreeSet<String>, ScribeError> {
    let selector = Selector::parse(selector).map_err(|e| ScribeError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })?;
    let base = Url::parse(base_url)?;

    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();
    let mut matched = 0usize;

    for element in document.select(&selector) {
        matched += 1;

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.contains(path_marker) {
            continue;
        }

        let Some(resolved) = resolve_url(base.as_str(), href) else {
            tracing::debug!("Could not resolve link '{}'", href);
            continue;
        };

        match Url::parse(&resolved) {
            Ok(url) if is_same_origin(&url, &base) => {
                tracing::debug!("Found detail link: {}", resolved);
                links.insert(resolved);
            }
            _ => tracing::debug!("Skipping off-site link: {}", resolved),
        }
    }

    tracing::debug!(
        "Selector matched {} elements, {} unique links kept",
        matched,
        links.len()
    );
    Ok(links)
}
