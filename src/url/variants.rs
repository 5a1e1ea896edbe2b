use std::path::{Component, Path, PathBuf};
use url::Url;

/// Lists the spellings under which one image may appear in a page's markup
///
/// `raw` is the reference exactly as written; `absolute` is its resolved URL. Beyond
/// those, the image is often referenced absolute, protocol-relative, host-prefixed,
/// or path-only, each with or without its query, percent-encoded or not, and with
/// `&` written as an entity. Variants are deduplicated and ordered longest first.
pub fn url_variants(raw: &str, absolute: &str) -> Vec<String> {
    let mut variants = vec![raw.to_string()];

    if let Ok(url) = Url::parse(absolute) {
        let query = url.query().map(|q| format!("?{}", q)).unwrap_or_default();
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let encoded_path = url.path().to_string();
        let mut paths = vec![encoded_path.clone()];
        if let Ok(decoded) = urlencoding::decode(&encoded_path) {
            if decoded != encoded_path {
                paths.push(decoded.into_owned());
            }
        }

        variants.push(url.to_string());
        for path in &paths {
            for tail in [String::new(), query.clone()] {
                let path_and_query = format!("{}{}", path, tail);
                if !host.is_empty() {
                    variants.push(format!("{}://{}{}", url.scheme(), host, path_and_query));
                    variants.push(format!("//{}{}", host, path_and_query));
                    variants.push(format!("{}{}", host, path_and_query));
                }
                // "/" alone would match every path in the document
                if path.len() > 1 {
                    variants.push(path_and_query);
                }
            }
        }
    }

    let escaped: Vec<String> = variants
        .iter()
        .filter(|v| v.contains('&') && !v.contains("&#") && !v.contains("&amp;"))
        .flat_map(|v| [v.replace('&', "&#038;"), v.replace('&', "&amp;")])
        .collect();
    variants.extend(escaped);

    variants.retain(|v| !v.is_empty());
    variants.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    variants.dedup();
    variants
}

/// Replaces `needle` in `haystack` only where it stands as a whole URL token
///
/// A match must be bounded by a quote, whitespace, bracket, `=`, `,`, or the ends of
/// the text, so `//host/a.jpg` never rewrites the tail of `https://host/a.jpg` and
/// `/a.jpg` never rewrites the head of `/a.jpg?w=300`.
pub fn replace_url_token(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in haystack.match_indices(needle) {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        if before.map_or(true, opens_url) && after.map_or(true, closes_url) {
            out.push_str(&haystack[last..start]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&haystack[last..]);
    out
}

fn opens_url(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '(' | '=' | ',' | '>')
}

fn closes_url(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | ')' | ',' | '<')
}

/// Computes `target` relative to `from` as a forward-slash path for Markdown links
///
/// `relative_dir("images", "posts_md")` yields `"../images"`.
pub fn relative_dir(target: &Path, from: &Path) -> String {
    let target = lexical_absolute(target);
    let from = lexical_absolute(from);

    let target_parts: Vec<_> = target.components().collect();
    let from_parts: Vec<_> = from.components().collect();

    let common = target_parts
        .iter()
        .zip(from_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        parts.push("..".to_string());
    }
    for component in &target_parts[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Anchors a path at the working directory and folds `.` and `..` without touching the disk
fn lexical_absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
