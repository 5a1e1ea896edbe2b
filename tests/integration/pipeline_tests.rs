//! Integration tests for both pipelines
//!
//! These tests use wiremock to stand in for the target sites and run each
//! pipeline end-to-end into temporary directories.

use serde_json::json;
use site_scribe::config::{BlogConfig, CatalogConfig, FetchConfig};
use site_scribe::crawler::{BlogCoordinator, CatalogCoordinator, Fetcher, NoDelay};
use site_scribe::extract::CONTENT_NOT_FOUND;
use site_scribe::images::ImageLocalizer;
use site_scribe::ScribeError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_config(base_url: &str, output_dir: &Path) -> CatalogConfig {
    CatalogConfig {
        base_url: base_url.to_string(),
        listing_url: format!("{}/products", base_url),
        link_selector: ".grid a".to_string(),
        path_marker: "/products/".to_string(),
        title_selector: "h1, .product-title".to_string(),
        content_selector: ".product-content".to_string(),
        output_dir: output_dir.to_string_lossy().into_owned(),
    }
}

fn blog_config(site_url: &str, root: &Path) -> BlogConfig {
    BlogConfig {
        site_url: site_url.to_string(),
        output_dir: root.join("md").to_string_lossy().into_owned(),
        image_dir: root.join("images").to_string_lossy().into_owned(),
        per_page: 100,
        image_timeout_secs: 5,
    }
}

fn fetcher(site: &str) -> Fetcher {
    Fetcher::new(&FetchConfig::default(), site).expect("Failed to build fetcher")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn mount_posts(server: &MockServer, pages: Vec<serde_json::Value>) {
    for (idx, posts) in pages.into_iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(query_param("page", (idx + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(posts))
            .mount(server)
            .await;
    }
}

async fn mount_tags(server: &MockServer, tags: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_catalog_run_end_to_end() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(
            r#"<div class="grid">
                <a href="/products/alpha">Alpha</a>
                <a href="/products/alpha">Alpha again</a>
                <a href="/products/beta">Beta</a>
                <a href="/products/gone">Gone</a>
                <a href="https://other.example.com/products/x">Elsewhere</a>
                <a href="/about">About</a>
            </div>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/alpha"))
        .respond_with(html(
            r#"<h1>Alpha</h1>
               <div class="product-content">
                 <p>Alpha is a fine product</p>
                 <p>Tiny</p>
                 <table><tr><th>Spec</th><th>Value</th></tr><tr><td>Weight</td><td>2kg</td></tr></table>
               </div>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/beta"))
        .respond_with(html("<h1>Beta</h1><div>no content region</div>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let coordinator = CatalogCoordinator::with_parts(
        catalog_config(&base_url, out.path()),
        fetcher(&base_url),
        Box::new(NoDelay),
    );
    let stats = coordinator.run().await.expect("Catalog run failed");

    assert_eq!(stats.items_found, 3);
    assert_eq!(stats.items_written, 2);
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(file_names(out.path()), vec!["Alpha.md", "Beta.md"]);

    let alpha = std::fs::read_to_string(out.path().join("Alpha.md")).unwrap();
    assert_eq!(
        alpha,
        format!(
            "# Alpha\n\n> 来源：{}/products/alpha\n\n## 产品详情\n\n\
             Alpha is a fine product\n\n\
             | Spec | Value |\n| --- | --- |\n| Weight | 2kg |\n\n",
            base_url
        )
    );

    let beta = std::fs::read_to_string(out.path().join("Beta.md")).unwrap();
    assert!(beta.contains(CONTENT_NOT_FOUND));
}

#[tokio::test]
async fn test_catalog_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let coordinator = CatalogCoordinator::with_parts(
        catalog_config(&base_url, out.path()),
        fetcher(&base_url),
        Box::new(NoDelay),
    );
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScribeError::ListingUnavailable { .. })));
}

#[tokio::test]
async fn test_catalog_without_links_ends_quietly() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html("<p>Coming soon</p>"))
        .mount(&server)
        .await;

    let coordinator = CatalogCoordinator::with_parts(
        catalog_config(&base_url, out.path()),
        fetcher(&base_url),
        Box::new(NoDelay),
    );
    let stats = coordinator.run().await.expect("Empty listing should not fail");

    assert_eq!(stats.items_found, 0);
    assert!(file_names(out.path()).is_empty());
}

#[tokio::test]
async fn test_blog_post_without_tags_or_images() {
    let server = MockServer::start().await;
    let site_url = server.uri();
    let root = TempDir::new().unwrap();

    mount_posts(
        &server,
        vec![
            json!([{
                "id": 7,
                "title": {"rendered": "Hello"},
                "content": {"rendered": "<p>Hi</p>"},
                "slug": "hello"
            }]),
            json!([]),
        ],
    )
    .await;
    mount_tags(&server, json!([])).await;

    let config = blog_config(&site_url, root.path());
    let output_dir = root.path().join("md");
    let coordinator = BlogCoordinator::with_parts(config, fetcher(&site_url), Box::new(NoDelay));
    let stats = coordinator.run().await.expect("Blog run failed");

    assert_eq!(stats.items_found, 1);
    assert_eq!(stats.items_written, 1);
    assert_eq!(file_names(&output_dir), vec!["Hello_hello.md"]);

    let markdown = std::fs::read_to_string(output_dir.join("Hello_hello.md")).unwrap();
    assert!(markdown.starts_with("---\ntitle: \"Hello\"\n"));
    assert!(markdown.contains("keywords: []\n"));
    assert!(markdown.contains("image: \"\"\n"));
    assert!(markdown.contains("url: \"hello\"\n"));

    let (_, body) = markdown.split_once("---\n\n").expect("Missing front matter");
    assert_eq!(body.trim(), "Hi");
}

#[tokio::test]
async fn test_blog_localizes_first_image_and_tags() {
    let server = MockServer::start().await;
    let site_url = server.uri();
    let root = TempDir::new().unwrap();

    mount_posts(
        &server,
        vec![
            json!([{
                "id": 9,
                "title": {"rendered": "Cats: a guide"},
                "content": {"rendered": "<p>Look</p><img src=\"/wp-content/uploads/cat.jpg\" alt=\"cat\"><img src=\"/wp-content/uploads/dog.jpg\">"},
                "date": "2024-05-01T10:00:00",
                "link": format!("{}/cats/", site_url),
                "slug": "cats",
                "excerpt": {"rendered": "<p>All about <b>cats</b></p>"}
            }]),
            json!([]),
        ],
    )
    .await;
    mount_tags(&server, json!([{"name": "pets"}, {"name": "cats"}])).await;

    Mock::given(method("GET"))
        .and(path("/wp-content/uploads/cat.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .mount(&server)
        .await;

    let config = blog_config(&site_url, root.path());
    let coordinator = BlogCoordinator::with_parts(config, fetcher(&site_url), Box::new(NoDelay));
    let stats = coordinator.run().await.expect("Blog run failed");

    assert_eq!(stats.images_localized, 1);

    let images = file_names(&root.path().join("images"));
    assert_eq!(images.len(), 1);
    assert!(images[0].starts_with("cat_"));
    assert!(images[0].ends_with(".jpg"));
    let bytes = std::fs::read(root.path().join("images").join(&images[0])).unwrap();
    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);

    let output_dir = root.path().join("md");
    assert_eq!(file_names(&output_dir), vec!["Cats_ a guide_cats.md"]);
    let markdown = std::fs::read_to_string(output_dir.join("Cats_ a guide_cats.md")).unwrap();

    let local = format!("../images/{}", images[0]);
    assert!(markdown.contains("title: \"Cats: a guide\"\n"));
    assert!(markdown.contains("date: 2024-05-01T10:00:00\n"));
    assert!(markdown.contains("keywords: [\"pets\", \"cats\"]\n"));
    assert!(markdown.contains("description: \"All about cats\"\n"));
    assert!(markdown.contains(&format!("image: \"{}\"\n", local)));
    assert!(markdown.contains(&format!("source: {}/cats/\n", site_url)));

    let (_, body) = markdown.split_once("---\n\n").expect("Missing front matter");
    assert!(body.contains(&local));
    assert!(!body.contains("/wp-content/uploads/cat.jpg"));
    assert!(body.contains("/wp-content/uploads/dog.jpg"));
}

#[tokio::test]
async fn test_blog_rewrites_image_src_as_written_in_markup() {
    let server = MockServer::start().await;
    let site_url = server.uri();
    let root = TempDir::new().unwrap();

    let src = "/wp-content/uploads/产品 图.jpg?resize=640%2C480&#038;ssl=1";
    mount_posts(
        &server,
        vec![
            json!([{
                "id": 11,
                "title": {"rendered": "Valve"},
                "content": {"rendered": format!("<figure><img src=\"{}\" alt=\"v\"></figure>", src)},
                "slug": "valve"
            }]),
            json!([]),
        ],
    )
    .await;
    mount_tags(&server, json!([])).await;

    Mock::given(method("GET"))
        .and(path("/wp-content/uploads/%E4%BA%A7%E5%93%81%20%E5%9B%BE.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let config = blog_config(&site_url, root.path());
    let coordinator = BlogCoordinator::with_parts(config, fetcher(&site_url), Box::new(NoDelay));
    let stats = coordinator.run().await.expect("Blog run failed");
    assert_eq!(stats.images_localized, 1);

    let images = file_names(&root.path().join("images"));
    assert_eq!(images.len(), 1);
    assert!(images[0].starts_with("产品 图_"), "{}", images[0]);

    let markdown =
        std::fs::read_to_string(root.path().join("md").join("Valve_valve.md")).unwrap();
    let (_, body) = markdown.split_once("---\n\n").expect("Missing front matter");
    // the converter percent-encodes link targets containing spaces
    let suffix = images[0].rsplit('_').next().unwrap();
    assert!(body.contains("](../images/"), "{}", body);
    assert!(body.contains(suffix), "{}", body);
    assert!(!body.contains("wp-content"), "{}", body);
    assert!(!body.contains("ssl=1"), "{}", body);
}

#[tokio::test]
async fn test_blog_image_failure_keeps_remote_url() {
    let server = MockServer::start().await;
    let site_url = server.uri();
    let root = TempDir::new().unwrap();

    mount_posts(
        &server,
        vec![
            json!([{
                "id": 3,
                "title": {"rendered": "Broken"},
                "content": {"rendered": "<img src=\"/wp-content/uploads/missing.jpg\">"},
                "slug": "broken"
            }]),
            json!([]),
        ],
    )
    .await;
    mount_tags(&server, json!([])).await;

    let config = blog_config(&site_url, root.path());
    let coordinator = BlogCoordinator::with_parts(config, fetcher(&site_url), Box::new(NoDelay));
    let stats = coordinator.run().await.expect("Blog run failed");

    assert_eq!(stats.image_failures, 1);
    assert!(file_names(&root.path().join("images")).is_empty());

    let markdown =
        std::fs::read_to_string(root.path().join("md").join("Broken_broken.md")).unwrap();
    assert!(markdown.contains("image: \"\"\n"));
    assert!(markdown.contains("/wp-content/uploads/missing.jpg"));
}

#[tokio::test]
async fn test_blog_first_page_failure_is_fatal() {
    let server = MockServer::start().await;
    let site_url = server.uri();
    let root = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = blog_config(&site_url, root.path());
    let coordinator = BlogCoordinator::with_parts(config, fetcher(&site_url), Box::new(NoDelay));
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScribeError::ListingUnavailable { .. })));
}

#[tokio::test]
async fn test_blog_later_page_failure_keeps_collected_posts() {
    let server = MockServer::start().await;
    let site_url = server.uri();
    let root = TempDir::new().unwrap();

    mount_posts(
        &server,
        vec![json!([{
            "title": {"rendered": "Only"},
            "content": {"rendered": "<p>Only post</p>"},
            "slug": "only"
        }])],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let config = blog_config(&site_url, root.path());
    let coordinator = BlogCoordinator::with_parts(config, fetcher(&site_url), Box::new(NoDelay));
    let stats = coordinator.run().await.expect("Blog run failed");

    assert_eq!(stats.items_written, 1);
    assert_eq!(
        file_names(&root.path().join("md")),
        vec!["Only_only.md"]
    );
}

#[tokio::test]
async fn test_images_with_same_name_do_not_collide() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/a/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"first".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
        .mount(&server)
        .await;

    let localizer = ImageLocalizer::new(
        reqwest::Client::new(),
        dir.path(),
        Duration::from_secs(5),
    );

    let first = localizer
        .localize(&format!("{}/a/photo.jpg", server.uri()))
        .await
        .expect("First download failed");
    let second = localizer
        .localize(&format!("{}/b/photo.jpg", server.uri()))
        .await
        .expect("Second download failed");

    assert_ne!(first, second);
    assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"first");
    assert_eq!(std::fs::read(dir.path().join(&second)).unwrap(), b"second");
}

#[tokio::test]
async fn test_image_download_failure_returns_none() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let localizer = ImageLocalizer::new(
        reqwest::Client::new(),
        dir.path(),
        Duration::from_secs(5),
    );

    let result = localizer
        .localize(&format!("{}/missing.png", server.uri()))
        .await;

    assert!(result.is_none());
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_page_detects_undeclared_gbk() {
    let server = MockServer::start().await;
    let page = "<html><body><h1>不锈钢球阀</h1>\
        <p>本产品采用优质不锈钢材料制造，具有耐腐蚀、耐高温、密封性能好等特点，\
        广泛应用于石油、化工、食品、医药等行业的管道系统中。</p></body></html>";
    let (bytes, _, _) = encoding_rs::GBK.encode(page);

    Mock::given(method("GET"))
        .and(path("/products/valve"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html"))
        .mount(&server)
        .await;

    let body = fetcher(&server.uri())
        .fetch_page(&format!("{}/products/valve", server.uri()))
        .await
        .into_body()
        .expect("Fetch failed");

    assert_eq!(body, page);
}

#[tokio::test]
async fn test_fetch_sends_browser_navigation_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("sec-fetch-dest", "document"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("sec-fetch-site", "same-origin"))
        .and(header("sec-fetch-user", "?1"))
        .respond_with(html("<p>ok</p>"))
        .mount(&server)
        .await;

    let result = fetcher(&server.uri())
        .fetch_page(&format!("{}/", server.uri()))
        .await;

    assert!(result.is_success());
}
