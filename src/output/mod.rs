//! Output module for rendering and persisting Markdown
//!
//! This module handles:
//! - Rendering documents and front matter to Markdown
//! - Building filesystem-safe file names and writing files
//! - Recording per-run statistics

mod markdown;
pub mod stats;
mod writer;

pub use markdown::{html_to_markdown, render, render_catalog_page, render_front_matter};
pub use stats::RunStats;
pub use writer::{catalog_filename, post_filename, sanitize_filename, write_markdown};
