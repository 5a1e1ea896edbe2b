//! Crawler module for fetching and driving the pipelines
//!
//! This module contains the fetching and orchestration logic, including:
//! - HTTP fetching with failure classification and charset detection
//! - Listing page link extraction
//! - WordPress REST pagination and tag lookup
//! - Pacing between items
//! - The catalog and blog coordinators

mod blog;
mod catalog;
mod decode;
mod fetcher;
mod links;
mod scheduler;
mod wordpress;

pub use blog::BlogCoordinator;
pub use catalog::CatalogCoordinator;
pub use decode::decode_body;
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher};
pub use links::extract_links;
pub use scheduler::{pause, FixedDelay, NoDelay, RateLimitPolicy};
pub use wordpress::{PostPage, WordPressClient, POST_FIELDS};

use crate::config::Config;
use crate::output::RunStats;
use crate::ScribeError;

/// Runs the catalog pipeline described by `config`
pub async fn run_catalog(config: &Config) -> Result<RunStats, ScribeError> {
    let catalog = config
        .catalog
        .clone()
        .ok_or(ScribeError::MissingSection("catalog"))?;
    CatalogCoordinator::new(catalog, &config.fetch)?.run().await
}

/// Runs the blog pipeline described by `config`
pub async fn run_blog(config: &Config) -> Result<RunStats, ScribeError> {
    let blog = config
        .blog
        .clone()
        .ok_or(ScribeError::MissingSection("blog"))?;
    BlogCoordinator::new(blog, &config.fetch)?.run().await
}
