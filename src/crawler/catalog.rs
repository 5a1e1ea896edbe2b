//! Catalog pipeline coordinator
//!
//! Fetches the listing page once, then handles each product strictly in sequence:
//! fetch, extract, render, write, pause.

use crate::config::{CatalogConfig, FetchConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::links::extract_links;
use crate::crawler::scheduler::{pause, FixedDelay, RateLimitPolicy};
use crate::extract::{extract_product, ContentSelectors};
use crate::output::{catalog_filename, render_catalog_page, write_markdown, RunStats};
use crate::ScribeError;
use std::path::Path;

pub struct CatalogCoordinator {
    config: CatalogConfig,
    fetcher: Fetcher,
    rate_limit: Box<dyn RateLimitPolicy>,
}

impl CatalogCoordinator {
    /// Creates a coordinator pausing `fetch.delay_ms` between products
    pub fn new(config: CatalogConfig, fetch: &FetchConfig) -> Result<Self, ScribeError> {
        let fetcher = Fetcher::new(fetch, &config.base_url)?;
        Ok(Self::with_parts(
            config,
            fetcher,
            Box::new(FixedDelay::from_millis(fetch.delay_ms)),
        ))
    }

    pub fn with_parts(
        config: CatalogConfig,
        fetcher: Fetcher,
        rate_limit: Box<dyn RateLimitPolicy>,
    ) -> Self {
        Self {
            config,
            fetcher,
            rate_limit,
        }
    }

    /// Runs the pipeline to completion
    ///
    /// Fails only when the output directory cannot be created or the listing
    /// page cannot be fetched. A listing without product links ends the run
    /// early with empty stats.
    pub async fn run(&self) -> Result<RunStats, ScribeError> {
        let output_dir = Path::new(&self.config.output_dir);
        tokio::fs::create_dir_all(output_dir).await?;
        tracing::info!("Saving products to {}", output_dir.display());

        let mut stats = RunStats::new();

        let listing_url = &self.config.listing_url;
        let Some(listing) = self.fetcher.fetch_page(listing_url).await.into_body() else {
            tracing::error!("Could not fetch listing page {}, aborting", listing_url);
            return Err(ScribeError::ListingUnavailable {
                url: listing_url.clone(),
            });
        };

        let links = extract_links(
            &listing,
            &self.config.link_selector,
            &self.config.path_marker,
            &self.config.base_url,
        )?;
        stats.items_found = links.len() as u64;

        if links.is_empty() {
            tracing::error!(
                "No product links found on {}; check link-selector or whether the page lists products",
                listing_url
            );
            return Ok(stats);
        }
        tracing::info!("Found {} product pages", links.len());

        let total = links.len();
        for (idx, link) in links.iter().enumerate() {
            tracing::info!("[{}/{}] Fetching {}", idx + 1, total, link);
            self.process_product(link, output_dir, &mut stats).await?;
            pause(self.rate_limit.as_ref()).await;
        }

        stats.log_summary("Catalog");
        Ok(stats)
    }

    async fn process_product(
        &self,
        link: &str,
        output_dir: &Path,
        stats: &mut RunStats,
    ) -> Result<(), ScribeError> {
        let Some(html) = self.fetcher.fetch_page(link).await.into_body() else {
            stats.fetch_failures += 1;
            return Ok(());
        };

        let selectors = ContentSelectors {
            title: &self.config.title_selector,
            content: &self.config.content_selector,
        };
        let document = extract_product(&html, selectors, link, &self.config.base_url)?;
        let markdown = render_catalog_page(&document);
        let filename = catalog_filename(&document.title);

        match write_markdown(output_dir, &filename, &markdown).await {
            Ok(path) => {
                stats.items_written += 1;
                tracing::info!("Saved {}", path.display());
            }
            Err(e) => {
                stats.write_failures += 1;
                tracing::error!("Failed to save {}: {}", filename, e);
            }
        }

        Ok(())
    }
}
