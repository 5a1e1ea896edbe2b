//! Image localization for the blog pipeline
//!
//! Downloads a remote image into the image directory under a name that cannot
//! collide with earlier downloads, then points the post body at the local copy.

mod localizer;

pub use localizer::{local_filename_for, rewrite_image_links, ImageLocalizer, DEFAULT_EXTENSION};
