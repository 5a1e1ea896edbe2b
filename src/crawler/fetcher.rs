//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the pipelines, including:
//! - Building HTTP clients with browser-like default headers and cookies
//! - GET requests returning page text (charset detected from the bytes) or decoded JSON
//! - Failure classification (non-200 status, timeout, transport error)

use crate::config::FetchConfig;
use crate::crawler::decode::decode_body;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    CONTENT_TYPE, COOKIE, REFERER, UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
     image/avif,image/webp,image/apng,*/*;q=0.8";

/// Fetch metadata a browser sends on a top-level navigation
const SEC_FETCH_HEADERS: [(&str, &str); 4] = [
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-user", "?1"),
];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult<T = String> {
    /// Got a 200 with a readable body
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Decoded body
        body: T,
    },

    /// Server answered with anything other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, undecodable body, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the request hit the client timeout
        timed_out: bool,
    },
}

impl<T> FetchResult<T> {
    /// Returns the body of a successful fetch, discarding failure details
    pub fn into_body(self) -> Option<T> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// Every request carries browser navigation headers, the configured User-Agent,
/// Accept-Language, Referer
/// (defaulting to `site`), any extra headers, and a `Cookie` header assembled
/// from the configured cookies. Header entries that are not valid HTTP are
/// skipped with a warning.
pub fn build_http_client(config: &FetchConfig, site: &str) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    for (name, value) in SEC_FETCH_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    insert_header(&mut headers, ACCEPT_LANGUAGE, &config.accept_language);
    insert_header(
        &mut headers,
        REFERER,
        config.referer.as_deref().unwrap_or(site),
    );

    for (name, value) in &config.headers {
        match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => insert_header(&mut headers, name, value),
            Err(_) => tracing::warn!("Skipping invalid header name '{}'", name),
        }
    }

    if !config.cookies.is_empty() {
        let cookie = config
            .cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        insert_header(&mut headers, COOKIE, &cookie);
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!("Skipping invalid value for header '{}'", name),
    }
}

/// Thin wrapper around a configured client
///
/// Any non-200 status or transport failure is reported as a [`FetchResult`]
/// variant; nothing here returns `Err`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds a fetcher for `site` from the shared fetch settings
    pub fn new(config: &FetchConfig, site: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, site)?,
        })
    }

    /// The underlying client, shared with the image downloader
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a page as text
    pub async fn fetch_page(&self, url: &str) -> FetchResult {
        let result = fetch_url(self.client.get(url)).await;
        log_outcome(url, &result);
        result
    }

    /// Fetches a URL with query parameters and decodes the body as JSON
    pub async fn fetch_json(&self, url: &str, query: &[(&str, String)]) -> FetchResult<Value> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query);

        let result = match send(request).await {
            Ok(response) => {
                let final_url = response.url().to_string();
                match response.json::<Value>().await {
                    Ok(body) => FetchResult::Success { final_url, body },
                    Err(e) => FetchResult::NetworkError {
                        error: format!("invalid JSON body: {}", e),
                        timed_out: false,
                    },
                }
            }
            Err(failure) => failure,
        };
        log_outcome(url, &result);
        result
    }
}

/// Sends a request and decodes the body as text
///
/// The charset comes from a byte order mark, then the Content-Type header, then
/// sniffing the bytes, so undeclared GBK pages still decode.
pub async fn fetch_url(request: RequestBuilder) -> FetchResult {
    match send(request).await {
        Ok(response) => {
            let final_url = response.url().to_string();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            match response.bytes().await {
                Ok(bytes) => {
                    let (body, encoding) = decode_body(&bytes, content_type.as_deref());
                    tracing::trace!("Decoded {} as {}", final_url, encoding.name());
                    FetchResult::Success { final_url, body }
                }
                Err(e) => classify_error(&e),
            }
        }
        Err(failure) => failure,
    }
}

/// Sends a request, keeping only 200 responses
async fn send<T>(request: RequestBuilder) -> Result<reqwest::Response, FetchResult<T>> {
    match request.send().await {
        Ok(response) if response.status() == StatusCode::OK => Ok(response),
        Ok(response) => Err(FetchResult::HttpError {
            status_code: response.status().as_u16(),
        }),
        Err(e) => Err(classify_error(&e)),
    }
}

fn classify_error<T>(e: &reqwest::Error) -> FetchResult<T> {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}

fn log_outcome<T>(url: &str, result: &FetchResult<T>) {
    match result {
        FetchResult::Success { final_url, .. } if without_query(final_url) != without_query(url) => {
            tracing::debug!("{} redirected to {}", url, final_url);
        }
        FetchResult::Success { .. } => {}
        FetchResult::HttpError { status_code: 403 } => {
            tracing::warn!(
                "{} was blocked with 403; try again from a different network egress",
                url
            );
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Fetch failed for {}: HTTP {}", url, status_code);
        }
        FetchResult::NetworkError {
            timed_out: true, ..
        } => {
            tracing::warn!("Fetch timed out for {}; consider raising fetch.timeout-secs", url);
        }
        FetchResult::NetworkError { error, .. } => {
            tracing::warn!("Fetch failed for {}: {}", url, error);
        }
    }
}

fn without_query(url: &str) -> &str {
    url.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
}
