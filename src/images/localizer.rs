use crate::document::ImageRef;
use crate::output::sanitize_filename;
use crate::url::{replace_url_token, url_variants};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Extension given to images whose URL path has none
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Downloads images into one directory
#[derive(Debug, Clone)]
pub struct ImageLocalizer {
    client: Client,
    target_dir: PathBuf,
    timeout: Duration,
}

impl ImageLocalizer {
    pub fn new(client: Client, target_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            client,
            target_dir: target_dir.into(),
            timeout,
        }
    }

    /// Downloads `image_url` and returns the generated local file name
    ///
    /// Returns `None` on any non-200 status, transport failure, or write failure.
    /// Failures are logged, never raised; a partially written file is removed.
    pub async fn localize(&self, image_url: &str) -> Option<String> {
        let filename = local_filename_for(image_url);
        let path = self.target_dir.join(&filename);

        let response = match self
            .client
            .get(image_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Image download failed for {}: {}", image_url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::warn!(
                "Image download failed for {}: HTTP {}",
                image_url,
                response.status().as_u16()
            );
            return None;
        }

        match stream_to_file(response, &path).await {
            Ok(bytes) => {
                tracing::debug!("Saved {} ({} bytes) to {}", image_url, bytes, path.display());
                Some(filename)
            }
            Err(e) => {
                tracing::warn!("Could not save image {}: {}", image_url, e);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::debug!("No partial file to remove at {}: {}", path.display(), e);
                }
                None
            }
        }
    }

    /// Localizes an [`ImageRef`] in place, leaving it remote on failure
    pub async fn localize_ref(&self, image: &mut ImageRef) {
        image.local_filename = self.localize(&image.remote_url).await;
    }
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> std::io::Result<u64> {
    let mut file = File::create(path).await?;
    let mut written = 0u64;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(std::io::Error::other)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Builds `<name>_<8 hex chars><ext>` from the last segment of the URL path
///
/// The segment is percent-decoded first, so `%E5%9B%BE.jpg` yields `图_<hex>.jpg`.
/// A URL without a usable name falls back to `image`; one without an extension gets
/// [`DEFAULT_EXTENSION`].
pub fn local_filename_for(image_url: &str) -> String {
    let basename = Url::parse(image_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_else(|| {
            image_url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        });

    let basename = urlencoding::decode(&basename)
        .map(|name| name.into_owned())
        .unwrap_or(basename);

    let (stem, ext) = split_extension(&basename);
    let stem = if stem.is_empty() { "image" } else { stem };
    let ext = if ext.is_empty() { DEFAULT_EXTENSION } else { ext };

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}{}", sanitize_filename(stem), &suffix[..8], ext)
}

/// Splits at the last dot; a leading dot does not start an extension
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx < name.len() - 1 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Replaces every spelling of one image in `html` with `local_path`
///
/// `raw_src` is the reference as written in the markup and `remote_url` its resolved
/// form; see [`url_variants`] for the spellings derived from them. Only whole URL
/// tokens are replaced, longest spelling first.
pub fn rewrite_image_links(html: &str, raw_src: &str, remote_url: &str, local_path: &str) -> String {
    if raw_src.is_empty() || local_path.is_empty() {
        return html.to_string();
    }

    url_variants(raw_src, remote_url)
        .iter()
        .fold(html.to_string(), |acc, variant| {
            replace_url_token(&acc, variant, local_path)
        })
}
