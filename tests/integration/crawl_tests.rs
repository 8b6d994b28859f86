//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small shop and run the full crawl
//! cycle end-to-end: configuration, traversal, pagination and persistence.

use ecomm_crawler::config::{parse_config, Config};
use ecomm_crawler::crawler::run_crawl;
use ecomm_crawler::storage::{JsonStore, SqliteStore, TreeStore};
use ecomm_crawler::tree::{CategoryPath, SiteTree};
use ecomm_crawler::CrawlError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a test configuration for the `demo` site served by `base_url`
fn create_test_config(base_url: &str, data_path: &Path, extra_site: &str, extra_crawler: &str) -> Config {
    let toml = format!(
        r#"
[crawler]
page_delay_ms = 0
request_timeout_secs = 5
{extra_crawler}

[user_agent]
crawler_name = "TestBot"
crawler_version = "1.0.0"
contact_url = "https://example.com/contact"
contact_email = "test@example.com"

[output]
data_path = "{data_path}"

[sites.demo]
base_url = "{base_url}/"
ignore_classes = ["sponsored"]
{extra_site}

[sites.demo.categories.Shoes]
url = "/shoes"

[sites.demo.selectors]
category_container = "ul.categories"
subcategory_items = "li"
product_container = "div.results"
product_item = "div.item"
product_link = "a"
next_page = "a.next"
"#,
        extra_crawler = extra_crawler,
        data_path = data_path.display(),
        base_url = base_url,
        extra_site = extra_site,
    );
    parse_config(&toml).expect("test config should parse")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

fn load_json(path: &Path) -> SiteTree {
    JsonStore::new(path).load().expect("stored tree should load")
}

fn node_path(segments: &[&str]) -> CategoryPath {
    CategoryPath::from_segments(segments.iter().map(|s| s.to_string()))
}

#[tokio::test]
async fn test_leaf_category_products() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<div class="results">
             <div class="item"><a href="/p/1">Runner</a></div>
             <div class="item sponsored"><a href="/p/ad">Promo</a></div>
             <div class="item"><a href="/p/2">Trail</a></div>
             <div class="item"><span>Coming soon</span></div>
           </div>"#,
    )
    .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.products_appended, 2);
    assert_eq!(stats.items_ignored, 1);
    assert_eq!(stats.items_unlinked, 1);
    assert_eq!(stats.pages_fetched, 1);

    let data = load_json(&data_path);
    let tree = data.site("demo").expect("site should be stored");
    let shoes = tree.resolve(&node_path(&["Shoes"])).unwrap();
    let node = tree.node(shoes);

    assert_eq!(node.url.as_deref(), Some("/shoes"));
    assert!(node.subcategories().is_empty());
    assert!(node.crawled_at.is_some());

    let names: Vec<&str> = node.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Runner", "Trail"]);
    assert_eq!(node.products[0].url, format!("{}/p/1", server.uri()));
}

#[tokio::test]
async fn test_demo_scenario_single_surviving_product() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<div class="results">
             <div class="item"><a href="/p/1">Runner</a></div>
             <div class="item sponsored"><a href="/p/ad">Promo</a></div>
           </div>"#,
    )
    .await;

    let config = create_test_config(
        &server.uri(),
        &data_path,
        "max_subcategory_depth = 1",
        "",
    );
    run_crawl(&config, "demo").await.unwrap();

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    assert_eq!(tree.len(), 1);

    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    assert_eq!(shoes.products.len(), 1);
    assert_eq!(shoes.products[0].name, "Runner");
    assert!(shoes.crawled_at.is_some());
    assert!(shoes.subcategories().is_empty());
}

#[tokio::test]
async fn test_subcategories_are_registered_and_visited() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<ul class="categories">
             <li><a href="/shoes/boots">Boots</a></li>
             <li><a href="/shoes/sandals">Sandals</a></li>
           </ul>"#,
    )
    .await;
    mount_page(
        &server,
        "/shoes/boots",
        r#"<div class="results"><div class="item"><a href="/p/hiker">Hiker</a></div></div>"#,
    )
    .await;
    mount_page(
        &server,
        "/shoes/sandals",
        r#"<div class="results"><div class="item"><a href="/p/flip">Flip</a></div></div>"#,
    )
    .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.categories_visited, 3);
    assert_eq!(stats.products_appended, 2);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();

    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    assert!(shoes.products.is_empty());
    assert!(shoes.crawled_at.is_none());
    assert_eq!(shoes.subcategories().len(), 2);

    let boots = tree.node(tree.resolve(&node_path(&["Shoes", "Boots"])).unwrap());
    assert_eq!(boots.url.as_deref(), Some("/shoes/boots"));
    assert_eq!(boots.products.len(), 1);
    assert_eq!(boots.products[0].name, "Hiker");

    let sandals = tree.node(tree.resolve(&node_path(&["Shoes", "Sandals"])).unwrap());
    assert_eq!(sandals.products[0].name, "Flip");
}

#[tokio::test]
async fn test_pagination_follows_next_link() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    // Query-specific pages first so they take precedence over the bare path
    Mock::given(method("GET"))
        .and(path("/shoes"))
        .and(query_param("page", "2"))
        .respond_with(html(
            r##"<div class="results"><div class="item"><a href="/p/2">Second</a></div></div>
               <a class="next disabled" href="#">Next</a>"##,
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/shoes",
        r#"<div class="results"><div class="item"><a href="/p/1">First</a></div></div>
           <a class="next" href="?page=2">Next</a>"#,
    )
    .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.listing_pages, 2);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    let names: Vec<&str> = shoes.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[1].url.query(), Some("page=2"));
}

#[tokio::test]
async fn test_page_limit_bounds_fetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    // Every page advertises a next page
    mount_page(
        &server,
        "/shoes",
        r#"<div class="results"><div class="item"><a href="/p/x">Endless</a></div></div>
           <a class="next" href="?page=n">Next</a>"#,
    )
    .await;

    let config = create_test_config(
        &server.uri(),
        &data_path,
        "max_pages_per_category = 3",
        "",
    );
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(request_count(&server).await, 3);
    assert_eq!(stats.listing_pages, 3);
    assert_eq!(stats.products_appended, 3);
}

#[tokio::test]
async fn test_missing_container_leaves_node_uncrawled() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(&server, "/shoes", "<p>Nothing to see here</p>").await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.products_appended, 0);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    assert!(shoes.products.is_empty());
    assert!(shoes.crawled_at.is_none());
}

#[tokio::test]
async fn test_all_items_ignored_still_marks_crawled() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<div class="results">
             <div class="item sponsored"><a href="/p/ad">Promo</a></div>
           </div>"#,
    )
    .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.items_ignored, 1);
    assert_eq!(stats.products_appended, 0);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    assert!(shoes.products.is_empty());
    assert!(shoes.crawled_at.is_some());
}

#[tokio::test]
async fn test_pagination_stops_when_later_page_has_no_container() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    Mock::given(method("GET"))
        .and(path("/shoes"))
        .and(query_param("page", "2"))
        .respond_with(html(r#"<p>Out of stock</p><a class="next" href="?page=3">Next</a>"#))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/shoes",
        r#"<div class="results"><div class="item"><a href="/p/1">First</a></div></div>
           <a class="next" href="?page=2">Next</a>"#,
    )
    .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(request_count(&server).await, 2);
    assert_eq!(stats.products_appended, 1);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    assert_eq!(shoes.products.len(), 1);
    assert_eq!(shoes.products[0].name, "First");
    assert!(shoes.crawled_at.is_some());
}

#[tokio::test]
async fn test_run_deadline_fails_without_persisting() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    Mock::given(method("GET"))
        .and(path("/shoes"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &data_path, "", "run_timeout_secs = 1");
    let err = run_crawl(&config, "demo").await.unwrap_err();

    assert!(matches!(err, CrawlError::Deadline { seconds: 1 }));
    assert!(!data_path.exists());
}

#[tokio::test]
async fn test_depth_limit_registers_without_fetching() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<ul class="categories"><li><a href="/shoes/boots">Boots</a></li></ul>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shoes/boots"))
        .respond_with(html("<p>unreachable</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(
        &server.uri(),
        &data_path,
        "max_subcategory_depth = 0",
        "",
    );
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.depth_truncated, 1);
    assert_eq!(request_count(&server).await, 1);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    let boots = tree.node(tree.resolve(&node_path(&["Shoes", "Boots"])).unwrap());
    assert_eq!(boots.url.as_deref(), Some("/shoes/boots"));
    assert!(boots.crawled_at.is_none());
}

#[tokio::test]
async fn test_fetch_error_aborts_without_persisting() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<ul class="categories">
             <li><a href="/shoes/boots">Boots</a></li>
             <li><a href="/shoes/sandals">Sandals</a></li>
           </ul>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shoes/boots"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    let err = run_crawl(&config, "demo").await.unwrap_err();

    assert!(matches!(err, CrawlError::Fetch(_)));
    assert!(!data_path.exists());
}

#[tokio::test]
async fn test_skip_failed_branches_continues_with_siblings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<ul class="categories">
             <li><a href="/shoes/boots">Boots</a></li>
             <li><a href="/shoes/sandals">Sandals</a></li>
           </ul>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shoes/boots"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/shoes/sandals",
        r#"<div class="results"><div class="item"><a href="/p/flip">Flip</a></div></div>"#,
    )
    .await;

    let config = create_test_config(
        &server.uri(),
        &data_path,
        "",
        "skip_failed_branches = true",
    );
    let stats = run_crawl(&config, "demo").await.unwrap();

    assert_eq!(stats.branches_failed, 1);
    assert_eq!(stats.products_appended, 1);

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    let boots = tree.node(tree.resolve(&node_path(&["Shoes", "Boots"])).unwrap());
    assert!(boots.crawled_at.is_none());
    let sandals = tree.node(tree.resolve(&node_path(&["Shoes", "Sandals"])).unwrap());
    assert_eq!(sandals.products.len(), 1);
}

#[tokio::test]
async fn test_rerun_appends_duplicate_products() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.json");

    mount_page(
        &server,
        "/shoes",
        r#"<div class="results"><div class="item"><a href="/p/1">Runner</a></div></div>"#,
    )
    .await;

    let config = create_test_config(&server.uri(), &data_path, "", "");
    run_crawl(&config, "demo").await.unwrap();
    run_crawl(&config, "demo").await.unwrap();

    let data = load_json(&data_path);
    let tree = data.site("demo").unwrap();
    assert_eq!(tree.len(), 1);
    let shoes = tree.node(tree.resolve(&node_path(&["Shoes"])).unwrap());
    assert_eq!(shoes.products.len(), 2);
    assert_eq!(shoes.products[0], shoes.products[1]);
}

#[tokio::test]
async fn test_sqlite_backend_round_trip() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("tree.db");

    mount_page(
        &server,
        "/shoes",
        r#"<ul class="categories"><li><a href="/shoes/boots">Boots</a></li></ul>"#,
    )
    .await;
    mount_page(
        &server,
        "/shoes/boots",
        r#"<div class="results"><div class="item"><a href="/p/hiker">Hiker</a></div></div>"#,
    )
    .await;

    let mut config = create_test_config(&server.uri(), &data_path, "", "");
    config.output.format = ecomm_crawler::config::StoreFormat::Sqlite;
    run_crawl(&config, "demo").await.unwrap();

    let data = SqliteStore::new(&data_path).unwrap().load().unwrap();
    let tree = data.site("demo").unwrap();
    let boots = tree.node(tree.resolve(&node_path(&["Shoes", "Boots"])).unwrap());
    assert_eq!(boots.url.as_deref(), Some("/shoes/boots"));
    assert_eq!(boots.products.len(), 1);
    assert!(boots.crawled_at.is_some());
}
