//! Blog pipeline coordinator
//!
//! Collects every published post, then converts them one at a time: tag
//! lookup, first-image localization, HTML to Markdown, front matter, write.

use crate::config::{BlogConfig, FetchConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::{pause, FixedDelay, RateLimitPolicy};
use crate::crawler::wordpress::WordPressClient;
use crate::document::ImageRef;
use crate::extract::{first_image_src, PostFields};
use crate::images::{rewrite_image_links, ImageLocalizer};
use crate::output::{post_filename, render, write_markdown, RunStats};
use crate::url::relative_dir;
use crate::ScribeError;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub struct BlogCoordinator {
    config: BlogConfig,
    client: WordPressClient,
    localizer: ImageLocalizer,
    rate_limit: Box<dyn RateLimitPolicy>,
}

impl BlogCoordinator {
    /// Creates a coordinator pausing `fetch.delay_ms` between posts
    pub fn new(config: BlogConfig, fetch: &FetchConfig) -> Result<Self, ScribeError> {
        let fetcher = Fetcher::new(fetch, &config.site_url)?;
        Ok(Self::with_parts(
            config,
            fetcher,
            Box::new(FixedDelay::from_millis(fetch.delay_ms)),
        ))
    }

    pub fn with_parts(
        config: BlogConfig,
        fetcher: Fetcher,
        rate_limit: Box<dyn RateLimitPolicy>,
    ) -> Self {
        let localizer = ImageLocalizer::new(
            fetcher.client().clone(),
            &config.image_dir,
            Duration::from_secs(config.image_timeout_secs),
        );
        let client = WordPressClient::new(fetcher, &config);

        Self {
            config,
            client,
            localizer,
            rate_limit,
        }
    }

    /// Runs the pipeline to completion
    ///
    /// Fails when the output or image directory cannot be created, or when the
    /// first page of posts cannot be fetched.
    pub async fn run(&self) -> Result<RunStats, ScribeError> {
        let output_dir = Path::new(&self.config.output_dir);
        let image_dir = Path::new(&self.config.image_dir);
        tokio::fs::create_dir_all(output_dir).await?;
        tokio::fs::create_dir_all(image_dir).await?;
        tracing::info!("Saving posts to {}", output_dir.display());
        tracing::info!("Saving images to {}", image_dir.display());

        let image_prefix = relative_dir(image_dir, output_dir);
        let mut stats = RunStats::new();

        tracing::info!("Fetching posts from {}", self.config.posts_url());
        let Some(posts) = self.client.all_posts().await else {
            tracing::error!("Could not fetch the first page of posts, aborting");
            return Err(ScribeError::ListingUnavailable {
                url: self.config.posts_url(),
            });
        };
        stats.items_found = posts.len() as u64;
        tracing::info!("Converting {} posts to Markdown", posts.len());

        for (idx, post) in posts.iter().enumerate() {
            if idx > 0 {
                pause(self.rate_limit.as_ref()).await;
            }
            self.process_post(post, output_dir, &image_prefix, &mut stats)
                .await;
        }

        stats.log_summary("Blog");
        Ok(stats)
    }

    async fn process_post(
        &self,
        post: &Value,
        output_dir: &Path,
        image_prefix: &str,
        stats: &mut RunStats,
    ) {
        let mut fields = PostFields::from_json(post);
        let site_url = &self.config.site_url;

        let keywords = match fields.id {
            Some(id) => self.client.tag_names(id).await,
            None => Vec::new(),
        };

        let mut image_path = None;
        if let Some(source) = first_image_src(&fields.content_html, site_url) {
            let mut image = ImageRef::new(source.url);
            self.localizer.localize_ref(&mut image).await;

            match &image.local_filename {
                Some(local) => {
                    let local_path = if image_prefix == "." {
                        local.clone()
                    } else {
                        format!("{}/{}", image_prefix, local)
                    };
                    fields.content_html = rewrite_image_links(
                        &fields.content_html,
                        &source.raw,
                        &image.remote_url,
                        &local_path,
                    );
                    image_path = Some(local_path);
                    stats.images_localized += 1;
                }
                None => stats.image_failures += 1,
            }
        }

        let filename = post_filename(&fields.title, &fields.slug);
        let (document, front_matter) = fields.into_document(keywords, image_path);
        let markdown = render(&document, Some(&front_matter));

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
    }
}
