//! Configuration module for Site-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Delay between items: {}ms", config.fetch.delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BlogConfig, CatalogConfig, Config, FetchConfig, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
