//! Markdown file persistence

use std::path::{Path, PathBuf};

/// Characters that cannot appear in a file name on common filesystems
const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces filesystem-unsafe characters with `_`
///
/// # Example
///
/// ```
/// use site_scribe::sanitize_filename;
///
/// assert_eq!(sanitize_filename("A/B: \"C\"?"), "A_B_ _C__");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// File name for a catalog product: `<title>.md`
pub fn catalog_filename(title: &str) -> String {
    format!("{}.md", sanitize_filename(title))
}

/// File name for a blog post: `<title>_<slug>.md`, with a random suffix when the slug is empty
pub fn post_filename(title: &str, slug: &str) -> String {
    let suffix = if slug.is_empty() {
        uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
    } else {
        sanitize_filename(slug)
    };
    format!("{}_{}.md", sanitize_filename(title), suffix)
}

/// Writes UTF-8 Markdown into `dir`, returning the full path
pub async fn write_markdown(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    tokio::fs::write(&path, content.as_bytes()).await?;
    Ok(path)
}
