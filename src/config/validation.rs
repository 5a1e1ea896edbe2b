use crate::config::types::{BlogConfig, CatalogConfig, Config, FetchConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;

    if config.catalog.is_none() && config.blog.is_none() {
        return Err(ConfigError::Validation(
            "at least one of [catalog] or [blog] must be configured".to_string(),
        ));
    }

    if let Some(catalog) = &config.catalog {
        validate_catalog_config(catalog)?;
    }
    if let Some(blog) = &config.blog {
        validate_blog_config(blog)?;
    }
    Ok(())
}

/// Validates HTTP settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(referer) = &config.referer {
        validate_http_url("referer", referer)?;
    }

    Ok(())
}

/// Validates the catalog pipeline settings
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let base = validate_http_url("base-url", &config.base_url)?;
    let listing = validate_http_url("listing-url", &config.listing_url)?;

    if base.host_str() != listing.host_str() {
        return Err(ConfigError::Validation(format!(
            "listing-url '{}' must be on the same host as base-url '{}'",
            config.listing_url, config.base_url
        )));
    }

    validate_selector("link-selector", &config.link_selector)?;
    validate_selector("title-selector", &config.title_selector)?;
    validate_selector("content-selector", &config.content_selector)?;

    if config.path_marker.is_empty() {
        return Err(ConfigError::Validation(
            "path-marker cannot be empty".to_string(),
        ));
    }

    validate_dir("catalog output-dir", &config.output_dir)?;
    Ok(())
}

/// Validates the blog pipeline settings
fn validate_blog_config(config: &BlogConfig) -> Result<(), ConfigError> {
    validate_http_url("site-url", &config.site_url)?;

    if config.per_page < 1 || config.per_page > 100 {
        return Err(ConfigError::Validation(format!(
            "per-page must be between 1 and 100, got {}",
            config.per_page
        )));
    }

    if config.image_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "image-timeout-secs must be greater than 0".to_string(),
        ));
    }

    validate_dir("blog output-dir", &config.output_dir)?;
    validate_dir("blog image-dir", &config.image_dir)?;
    Ok(())
}

/// Parses a URL and requires an http(s) scheme with a host
fn validate_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(url)
}

fn validate_selector(field: &str, value: &str) -> Result<(), ConfigError> {
    Selector::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", field, value, e)))
}

fn validate_dir(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
