//! URL handling module for Site-Scribe
//!
//! This module resolves links against a base URL, applies the same-origin
//! rule, and enumerates the spellings an image URL may take inside markup.

mod resolve;
mod variants;

pub use resolve::{extract_domain, is_same_origin, resolve_url};
pub use variants::{relative_dir, replace_url_token, url_variants};
