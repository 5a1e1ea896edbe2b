use url::Url;

/// Resolves `href` against `base`, the way a browser resolves a link
///
/// Absolute and protocol-relative hrefs replace the base; everything else is
/// joined onto it. Returns `None` when either side cannot be parsed.
///
/// # Examples
///
/// ```
/// use site_scribe::url::resolve_url;
///
/// assert_eq!(
///     resolve_url("https://example.com/products", "/products/a").as_deref(),
///     Some("https://example.com/products/a")
/// );
/// ```
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}

/// Extracts the lowercase host of a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two URLs share the same network location (host and port)
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    extract_domain(a).is_some()
        && extract_domain(a) == extract_domain(b)
        && a.port_or_known_default() == b.port_or_known_default()
}
