//! Blog post extraction from REST API JSON

use crate::document::{Block, Document, FrontMatter};
use crate::url::resolve_url;
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

/// Title used when a post has none
pub const UNTITLED_POST: &str = "未命名文章";

/// Fields read from one post object, with literal defaults for anything absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    /// Only used for the tag lookup
    pub id: Option<u64>,
    pub title: String,
    pub content_html: String,
    pub date: String,
    pub link: String,
    pub slug: String,
    /// Excerpt with markup removed
    pub description: String,
}

impl PostFields {
    pub fn from_json(post: &Value) -> Self {
        let text = |pointer: &str| {
            post.pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let title = text("/title/rendered")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_POST.to_string());

        let date = text("/date")
            .or_else(|| text("/published"))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        Self {
            id: post.get("id").and_then(Value::as_u64),
            title,
            content_html: text("/content/rendered").unwrap_or_default(),
            date,
            link: text("/link").unwrap_or_default(),
            slug: text("/slug").unwrap_or_default(),
            description: strip_tags(&text("/excerpt/rendered").unwrap_or_default()),
        }
    }

    /// Assembles the document and its front matter
    ///
    /// `image_path` is the cover image relative to the Markdown file, if one was localized.
    pub fn into_document(
        self,
        keywords: Vec<String>,
        image_path: Option<String>,
    ) -> (Document, FrontMatter) {
        let mut unique = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            if !unique.contains(&keyword) {
                unique.push(keyword);
            }
        }

        let front_matter = FrontMatter {
            title: self.title.clone(),
            date: self.date,
            keywords: unique,
            description: self.description,
            image_path: image_path.unwrap_or_default(),
            slug: self.slug,
            source_link: self.link.clone(),
        };

        let mut document = Document::new(self.title, self.link);
        document.blocks.push(Block::Html(self.content_html));

        (document, front_matter)
    }
}

/// Removes every `<...>` tag and trims the remainder
pub fn strip_tags(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));
    tag.replace_all(html, "").trim().to_string()
}

/// The first image of a post body, both as written and as a fetchable URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// `src` exactly as it appears in the markup, entities and all
    pub raw: String,
    /// `src` with entities decoded, resolved against the site URL
    pub url: String,
}

/// Finds the first `<img>` with a non-empty `src` in a body fragment
///
/// The markup is scanned rather than parsed so the raw attribute text survives
/// for link rewriting. `data-src` and similar attributes never match.
pub fn first_image_src(html: &str, base_url: &str) -> Option<ImageSource> {
    static IMG_SRC: OnceLock<Regex> = OnceLock::new();
    let img_src = IMG_SRC.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("img pattern is valid")
    });

    img_src.captures_iter(html).find_map(|caps| {
        let raw = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
        if raw.as_str().trim().is_empty() {
            return None;
        }
        let decoded = decode_attribute(raw.as_str());
        let url = resolve_url(base_url, decoded.trim())?;
        Some(ImageSource {
            raw: raw.as_str().to_string(),
            url,
        })
    })
}

/// Decodes character references in an attribute value the way a browser would
fn decode_attribute(value: &str) -> String {
    let fragment = Html::parse_fragment(&format!("<img src=\"{}\">", value.replace('"', "&quot;")));
    Selector::parse("img")
        .ok()
        .and_then(|img| {
            fragment
                .select(&img)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| value.to_string())
}
