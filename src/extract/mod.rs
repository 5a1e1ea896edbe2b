//! Content extraction
//!
//! Turns a detail page's HTML (catalog) or a post's JSON (blog) into a
//! [`Document`](crate::Document).

mod blog;
mod catalog;

pub use blog::{first_image_src, strip_tags, ImageSource, PostFields, UNTITLED_POST};
pub use catalog::{
    extract_product, stripped_text, ContentSelectors, CONTENT_NOT_FOUND, IMAGE_ALT_SUFFIX,
    UNTITLED_PRODUCT_PREFIX,
};
