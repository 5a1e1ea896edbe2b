//! Structured content produced by the extractors
//!
//! A [`Document`] is built once per item, rendered, and dropped.

/// One unit of extracted content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph of stripped text
    Paragraph(String),

    /// A table with a header row and body rows
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    /// An image with an absolute (or verbatim) URL
    Image { url: String, alt: String },

    /// The non-empty items of one source list
    List { items: Vec<String> },

    /// A raw HTML fragment rendered through the general converter
    Html(String),
}

/// An extracted item ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Never empty; extractors substitute a placeholder
    pub title: String,

    /// Content blocks in rendering order
    pub blocks: Vec<Block>,

    /// Page or post the content came from
    pub source_url: String,
}

impl Document {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
            source_url: source_url.into(),
        }
    }

    /// Image blocks in document order
    pub fn images(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::Image { .. }))
    }
}

/// A remote image and, once downloaded, its local file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub remote_url: String,
    pub local_filename: Option<String>,
}

impl ImageRef {
    pub fn new(remote_url: impl Into<String>) -> Self {
        Self {
            remote_url: remote_url.into(),
            local_filename: None,
        }
    }

    /// True once the image has been stored locally
    pub fn is_localized(&self) -> bool {
        self.local_filename.is_some()
    }
}

/// Metadata header written above a blog post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,

    /// ISO-8601 publish date
    pub date: String,

    /// Tag names, deduplicated in lookup order
    pub keywords: Vec<String>,

    pub description: String,

    /// Path of the localized cover image relative to the Markdown file, or empty
    pub image_path: String,

    pub slug: String,

    pub source_link: String,
}
