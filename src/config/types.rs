use serde::Deserialize;
use std::collections::BTreeMap;

/// Browser-like User-Agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// Accept-Language sent when none is configured
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Main configuration structure for Site-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    pub catalog: Option<CatalogConfig>,
    pub blog: Option<BlogConfig>,
}

/// HTTP behaviour shared by both pipelines
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between successive items (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Referer header; the target site is used when unset
    #[serde(default)]
    pub referer: Option<String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Cookies sent with every request
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            referer: None,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }
}

/// Product catalog pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Site root; relative links and images resolve against it
    pub base_url: String,

    /// Page enumerating the product links
    pub listing_url: String,

    /// CSS selector for candidate product links
    pub link_selector: String,

    /// Substring every accepted product link must contain
    #[serde(default = "default_path_marker")]
    pub path_marker: String,

    pub title_selector: String,

    pub content_selector: String,

    /// Directory receiving one Markdown file per product
    pub output_dir: String,
}

/// WordPress blog pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlogConfig {
    /// Site root hosting `/wp-json/wp/v2`
    pub site_url: String,

    pub output_dir: String,

    /// Directory receiving downloaded images
    pub image_dir: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,
}

impl BlogConfig {
    /// Base of the REST API, e.g. `https://example.com/wp-json/wp/v2`
    pub fn api_base(&self) -> String {
        format!("{}/wp-json/wp/v2", self.site_url.trim_end_matches('/'))
    }

    /// Posts collection endpoint
    pub fn posts_url(&self) -> String {
        format!("{}/posts", self.api_base())
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    DEFAULT_ACCEPT_LANGUAGE.to_string()
}

fn default_path_marker() -> String {
    "/products/".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_image_timeout_secs() -> u64 {
    10
}
