//! Product page extraction
//!
//! Blocks are collected per type, not interleaved: every qualifying paragraph
//! first, then tables, then images, then lists. Output therefore does not keep
//! the visual order of the source page, and downstream consumers rely on that.

use crate::document::{Block, Document};
use crate::output::sanitize_filename;
use crate::url::resolve_url;
use crate::ScribeError;
use scraper::{ElementRef, Html, Selector};

/// Prefix of the generated title when a page has none
pub const UNTITLED_PRODUCT_PREFIX: &str = "未命名产品_";

/// Sole paragraph of a document whose content region was not found
pub const CONTENT_NOT_FOUND: &str = "未提取到产品详情（请检查内容选择器配置）";

/// Appended to the title to form a missing image alt text
pub const IMAGE_ALT_SUFFIX: &str = "产品图片";

/// Paragraphs at or below this many characters are treated as noise
const MIN_PARAGRAPH_CHARS: usize = 5;

/// CSS selectors locating the title and content region of a detail page
#[derive(Debug, Clone, Copy)]
pub struct ContentSelectors<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

/// Extracts a product page into a [`Document`]
///
/// The title is stored with filename-unsafe characters replaced, so the heading,
/// default alt texts and file name all agree. A missing title becomes
/// `未命名产品_<unix timestamp>`. A missing content
/// region yields a document holding only the [`CONTENT_NOT_FOUND`] paragraph.
/// Neither case is an error; only an unparseable selector is.
pub fn extract_product(
    html: &str,
    selectors: ContentSelectors<'_>,
    source_url: &str,
    base_url: &str,
) -> Result<Document, ScribeError> {
    let title_selector = parse_selector(selectors.title)?;
    let content_selector = parse_selector(selectors.content)?;

    let page = Html::parse_document(html);

    let title = page
        .select(&title_selector)
        .next()
        .map(stripped_text)
        .filter(|t| !t.is_empty())
        .map(|t| sanitize_filename(&t))
        .unwrap_or_else(|| {
            tracing::debug!("No title found on {}, using placeholder", source_url);
            format!("{}{}", UNTITLED_PRODUCT_PREFIX, chrono::Utc::now().timestamp())
        });

    let mut document = Document::new(title, source_url);

    let Some(content) = page.select(&content_selector).next() else {
        tracing::warn!("Content region not found on {}", source_url);
        document
            .blocks
            .push(Block::Paragraph(CONTENT_NOT_FOUND.to_string()));
        return Ok(document);
    };

    document.blocks.extend(paragraphs(content));
    document.blocks.extend(tables(content));
    document.blocks.extend(images(content, &document.title, base_url));
    document.blocks.extend(lists(content));

    Ok(document)
}

/// Text of an element with every text node trimmed and the non-empty pieces concatenated
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_selector(css: &str) -> Result<Selector, ScribeError> {
    Selector::parse(css).map_err(|e| ScribeError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Descendants of `root` matching `css`, excluding `root` itself
fn descendants<'a>(root: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => root
            .select(&selector)
            .filter(|element| element.id() != root.id())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn paragraphs(content: ElementRef<'_>) -> Vec<Block> {
    descendants(content, "p")
        .into_iter()
        .map(stripped_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .map(Block::Paragraph)
        .collect()
}

fn tables(content: ElementRef<'_>) -> Vec<Block> {
    let mut blocks = Vec::new();

    for table in descendants(content, "table") {
        let headers: Vec<String> = descendants(table, "th")
            .into_iter()
            .map(stripped_text)
            .collect();
        if headers.is_empty() {
            continue;
        }

        // the first row holds the headers
        let rows = descendants(table, "tr")
            .into_iter()
            .skip(1)
            .map(|row| {
                descendants(row, "td")
                    .into_iter()
                    .map(stripped_text)
                    .collect()
            })
            .collect();

        blocks.push(Block::Table { headers, rows });
    }

    blocks
}

fn images(content: ElementRef<'_>, title: &str, base_url: &str) -> Vec<Block> {
    descendants(content, "img")
        .into_iter()
        .filter_map(|img| {
            let element = img.value();
            let src = ["src", "data-src", "data-original"]
                .iter()
                .filter_map(|attr| element.attr(attr))
                .find(|value| !value.is_empty())?;

            // substring check, so "/media/http-banner.png" is kept verbatim too
            let url = if src.contains("http") {
                src.to_string()
            } else {
                resolve_url(base_url, src).unwrap_or_else(|| src.to_string())
            };

            let alt = element
                .attr("alt")
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}{}", title, IMAGE_ALT_SUFFIX));

            Some(Block::Image { url, alt })
        })
        .collect()
}

fn lists(content: ElementRef<'_>) -> Vec<Block> {
    descendants(content, "ul")
        .into_iter()
        .map(|list| Block::List {
            items: descendants(list, "li")
                .into_iter()
                .map(stripped_text)
                .filter(|text| !text.is_empty())
                .collect(),
        })
        .collect()
}
