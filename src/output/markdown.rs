//! Markdown rendering
//!
//! This module turns extracted documents into Markdown: per-block templates
//! for catalog pages, the general HTML converter for blog bodies, and the
//! front matter header for posts.

use crate::document::{Block, Document, FrontMatter};

/// Renders a document, preceded by front matter when given
///
/// # Example
///
/// ```
/// use site_scribe::{render, Block, Document};
///
/// let mut doc = Document::new("Widget", "https://example.com/products/widget");
/// doc.blocks.push(Block::Paragraph("A sturdy widget".to_string()));
/// assert_eq!(render(&doc, None), "A sturdy widget\n\n");
/// ```
pub fn render(document: &Document, front_matter: Option<&FrontMatter>) -> String {
    let mut md = String::new();

    if let Some(front_matter) = front_matter {
        md.push_str(&render_front_matter(front_matter));
    }

    for block in &document.blocks {
        render_block(block, &mut md);
    }

    md
}

/// Renders a catalog document as a complete product page
pub fn render_catalog_page(document: &Document) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", document.title));
    md.push_str(&format!("> 来源：{}\n\n", document.source_url));
    md.push_str("## 产品详情\n\n");
    md.push_str(&render(document, None));
    md
}

/// Renders the `---` delimited metadata block, followed by a blank line
pub fn render_front_matter(front_matter: &FrontMatter) -> String {
    let keywords = front_matter
        .keywords
        .iter()
        .map(|k| quote(k))
        .collect::<Vec<_>>()
        .join(", ");

    let mut md = String::from("---\n");
    md.push_str(&format!("title: {}\n", quote(&front_matter.title)));
    md.push_str(&format!("date: {}\n", front_matter.date));
    md.push_str(&format!("keywords: [{}]\n", keywords));
    md.push_str(&format!("description: {}\n", quote(&front_matter.description)));
    md.push_str(&format!("image: {}\n", quote(&front_matter.image_path)));
    md.push_str(&format!("url: {}\n", quote(&front_matter.slug)));
    md.push_str("draft: false\n");
    md.push_str(&format!("source: {}\n", front_matter.source_link));
    md.push_str("---\n\n");
    md
}

/// Converts an HTML fragment with links and images preserved and no line wrapping
pub fn html_to_markdown(html: &str) -> String {
    html2md::parse_html(html)
}

fn render_block(block: &Block, md: &mut String) {
    match block {
        Block::Paragraph(text) => {
            md.push_str(&format!("{}\n\n", text));
        }
        Block::Table { headers, rows } => {
            md.push_str(&table_row(headers));
            md.push_str(&table_row(&vec!["---".to_string(); headers.len()]));
            for row in rows {
                md.push_str(&table_row(row));
            }
            md.push('\n');
        }
        Block::Image { url, alt } => {
            md.push_str(&format!("![{}]({})\n\n", alt, url));
        }
        Block::List { items } => {
            for item in items {
                md.push_str(&format!("- {}\n", item));
            }
            md.push('\n');
        }
        Block::Html(html) => {
            md.push_str(&html_to_markdown(html));
        }
    }
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

/// Double-quotes a free-text value, escaping backslashes, quotes, and newlines
fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "");
    format!("\"{}\"", escaped)
}
