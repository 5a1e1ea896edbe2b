//! Client for the WordPress REST content API
//!
//! Pages through `/wp-json/wp/v2/posts` and looks up post tags.

use crate::config::BlogConfig;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use serde_json::Value;

/// Fields requested for every post
pub const POST_FIELDS: &str = "id,title,content,date,published,link,excerpt,slug";

/// One page of the posts collection
#[derive(Debug)]
pub enum PostPage {
    /// Posts on this page; empty means the collection is exhausted
    Posts(Vec<Value>),

    /// The page could not be fetched or was not a JSON array
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct WordPressClient {
    fetcher: Fetcher,
    api_base: String,
    per_page: u32,
}

impl WordPressClient {
    pub fn new(fetcher: Fetcher, config: &BlogConfig) -> Self {
        Self {
            fetcher,
            api_base: config.api_base(),
            per_page: config.per_page,
        }
    }

    /// Fetches one page of published posts (1-based)
    pub async fn posts_page(&self, page: u32) -> PostPage {
        let url = format!("{}/posts", self.api_base);
        let query = [
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("status", "publish".to_string()),
            ("_fields", POST_FIELDS.to_string()),
        ];

        match self.fetcher.fetch_json(&url, &query).await {
            FetchResult::Success {
                body: Value::Array(posts),
                ..
            } => PostPage::Posts(posts),
            FetchResult::Success { .. } => {
                tracing::warn!("Page {} of {} is not a JSON array", page, url);
                PostPage::Unavailable
            }
            _ => PostPage::Unavailable,
        }
    }

    /// Collects every published post
    ///
    /// Returns `None` when the very first page cannot be fetched. A later
    /// failing page ends pagination and keeps what was collected.
    pub async fn all_posts(&self) -> Option<Vec<Value>> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            match self.posts_page(page).await {
                PostPage::Posts(posts) if posts.is_empty() => {
                    tracing::info!("All posts fetched");
                    break;
                }
                PostPage::Posts(posts) => {
                    all.extend(posts);
                    tracing::info!("Fetched page {}, {} posts so far", page, all.len());
                    page += 1;
                }
                PostPage::Unavailable if page == 1 => return None,
                PostPage::Unavailable => {
                    tracing::warn!("Page {} unavailable, stopping pagination", page);
                    break;
                }
            }
        }

        Some(all)
    }

    /// Tag names attached to a post; any failure yields an empty list
    pub async fn tag_names(&self, post_id: u64) -> Vec<String> {
        let url = format!("{}/tags", self.api_base);
        let query = [("post", post_id.to_string())];

        match self.fetcher.fetch_json(&url, &query).await {
            FetchResult::Success {
                body: Value::Array(tags),
                ..
            } => tags
                .iter()
                .filter_map(|tag| tag.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
            _ => {
                tracing::debug!("No keywords for post {}", post_id);
                Vec::new()
            }
        }
    }
}
