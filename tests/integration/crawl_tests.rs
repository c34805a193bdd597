//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock documentation sites and a mock
//! summarization service, and test the full crawl cycle end-to-end.

use docs_harvester::config::{ApiCredentials, BackoffConfig, Config, FilterMode};
use docs_harvester::crawler::crawl;
use docs_harvester::output::{prepare_output_dir, CrawlReport};
use docs_harvester::HarvestError;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCS: &str = "/developers/es/docs";

/// Creates a test configuration: no pacing, fast retries
fn create_test_config(max_depth: u32, mode: FilterMode) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.pacing_ms = 0;
    config.filter.mode = mode;
    config.summarizer.backoff = BackoffConfig::Fixed { delay_ms: 10 };
    config
}

fn test_credentials() -> ApiCredentials {
    ApiCredentials {
        api_key: "test-key".to_string(),
        agent_id: "agent-1".to_string(),
        org_id: None,
    }
}

fn docs_path(rest: &str) -> String {
    if rest.is_empty() {
        DOCS.to_string()
    } else {
        format!("{}/{}", DOCS, rest)
    }
}

/// Serves `html` as a text/html page at `route`
async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// Answers `route` with a 301 to `location`
async fn mount_redirect(server: &MockServer, route: &str, location: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(301).insert_header("location", location))
        .mount(server)
        .await;
}

/// A page with one paragraph of text and links to the given routes
fn page(text: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
        text, text, anchors
    )
}

/// Number of requests the server received for `route`
async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

/// All output files of a site, concatenated in index order
fn read_output(dir: &Path, site: &str) -> String {
    let mut output = String::new();
    let mut index = 1;
    loop {
        let file = dir.join(format!("{}_{}.txt", site, index));
        if !file.exists() {
            return output;
        }
        output.push_str(&fs::read_to_string(file).unwrap());
        index += 1;
    }
}

async fn run_raw(server: &MockServer, dir: &Path, config: &Config) -> CrawlReport {
    let base = format!("{}{}", server.uri(), DOCS);
    crawl(&base, dir, "acme", config, None).await.unwrap()
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, DOCS, page("Root page", &[docs_path("a")])).await;
    mount_page(&server, &docs_path("a"), page("Depth one", &[docs_path("a/b")])).await;
    mount_page(&server, &docs_path("a/b"), page("Depth two", &[docs_path("a/b/c")])).await;
    mount_page(&server, &docs_path("a/b/c"), page("Depth three", &[])).await;

    let config = create_test_config(2, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(hits(&server, DOCS).await, 1);
    assert_eq!(hits(&server, &docs_path("a")).await, 1);
    assert_eq!(hits(&server, &docs_path("a/b")).await, 1);
    assert_eq!(hits(&server, &docs_path("a/b/c")).await, 0);
    assert_eq!(report.pages_visited, 3);

    let text = read_output(output.path(), "acme");
    assert!(text.contains("Depth two"));
    assert!(!text.contains("Depth three"));
}

#[tokio::test]
async fn test_depth_zero_fetches_only_base() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, DOCS, page("Root page", &[docs_path("a")])).await;
    mount_page(&server, &docs_path("a"), page("Child", &[])).await;

    let config = create_test_config(0, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(report.pages_visited, 1);
    assert_eq!(hits(&server, &docs_path("a")).await, 0);
}

#[tokio::test]
async fn test_cycle_and_aliases_fetched_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let a = docs_path("a");
    mount_page(
        &server,
        DOCS,
        page(
            "Root page",
            &[
                a.clone(),
                format!("{}/", a),
                format!("{}#section", a),
                format!("{}?utm_source=newsletter", a),
            ],
        ),
    )
    .await;
    mount_page(&server, &a, page("Page A", &[DOCS.to_string(), a.clone()])).await;

    let config = create_test_config(3, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(hits(&server, DOCS).await, 1);
    assert_eq!(hits(&server, &a).await, 1);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_persisted, 2);
}

#[tokio::test]
async fn test_duplicate_content_persisted_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        DOCS,
        page("Index page", &[docs_path("en"), docs_path("es")]),
    )
    .await;
    mount_page(&server, &docs_path("en"), page("Same content", &[])).await;
    mount_page(&server, &docs_path("es"), page("Same content", &[])).await;

    let config = create_test_config(2, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_persisted, 2);
    assert_eq!(report.duplicates, 1);

    let text = read_output(output.path(), "acme");
    assert_eq!(text, "Index page\n\nSame content\n\n");
}

#[tokio::test]
async fn test_not_found_and_non_html_contribute_nothing() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        DOCS,
        page("Root page", &[docs_path("missing"), docs_path("spec.pdf")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(docs_path("spec.pdf")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/developers/es/docs/hidden">x</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;

    let config = create_test_config(3, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(hits(&server, &docs_path("hidden")).await, 0);
    assert_eq!(read_output(output.path(), "acme"), "Root page\n\n");
}

#[tokio::test]
async fn test_server_error_is_dropped_and_crawl_continues() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        DOCS,
        page("Root page", &[docs_path("broken"), docs_path("fine")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(docs_path("broken")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, &docs_path("fine"), page("Fine page", &[])).await;

    let config = create_test_config(3, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    // Crawl-level fetches are not retried
    assert_eq!(hits(&server, &docs_path("broken")).await, 1);
    assert_eq!(report.fetch_failures, 1);
    assert!(read_output(output.path(), "acme").contains("Fine page"));
}

#[tokio::test]
async fn test_redirect_target_also_linked_is_fetched_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let old = docs_path("old");
    let new = docs_path("new");
    mount_page(&server, DOCS, page("Root page", &[old.clone(), new.clone()])).await;
    mount_redirect(&server, &old, &new).await;
    mount_page(&server, &new, page("New page", &[])).await;

    let config = create_test_config(3, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(hits(&server, &old).await, 1);
    assert_eq!(hits(&server, &new).await, 1);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.redirects, 1);
    assert_eq!(
        read_output(output.path(), "acme"),
        "Root page\n\nNew page\n\n"
    );
}

#[tokio::test]
async fn test_redirect_off_site_is_not_followed() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let away = docs_path("away");
    mount_page(&server, DOCS, page("Root page", &[away.clone()])).await;
    mount_redirect(&server, &away, &format!("{}{}", elsewhere.uri(), docs_path("a"))).await;
    mount_page(&elsewhere, &docs_path("a"), page("Foreign page", &[])).await;

    let config = create_test_config(3, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert!(elsewhere.received_requests().await.unwrap().is_empty());
    assert_eq!(report.redirects, 1);
    assert_eq!(report.pages_visited, 1);
    assert_eq!(read_output(output.path(), "acme"), "Root page\n\n");
}

#[tokio::test]
async fn test_trailing_slash_redirect_is_followed() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let a = docs_path("a");
    let a_slash = format!("{}/", a);
    mount_page(&server, DOCS, page("Root page", &[a.clone()])).await;
    mount_redirect(&server, &a, &a_slash).await;
    mount_page(&server, &a_slash, page("Slash page", &[])).await;

    let config = create_test_config(3, FilterMode::Standard);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(hits(&server, &a_slash).await, 1);
    assert_eq!(report.redirects, 0);
    assert!(read_output(output.path(), "acme").contains("Slash page"));
}

#[tokio::test]
async fn test_strict_filter() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        DOCS,
        page(
            "Root page",
            &[
                docs_path("api-reference"),
                docs_path("guides"),
                docs_path("terms-api"),
                "/login".to_string(),
                "/developers/en/docs/api".to_string(),
                "https://other.invalid/developers/es/docs/api".to_string(),
            ],
        ),
    )
    .await;
    mount_page(&server, &docs_path("api-reference"), page("Reference", &[])).await;
    mount_page(&server, &docs_path("guides"), page("Guides", &[])).await;

    let config = create_test_config(3, FilterMode::Strict);
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(hits(&server, &docs_path("api-reference")).await, 1);
    assert_eq!(hits(&server, &docs_path("guides")).await, 0);
    assert_eq!(hits(&server, &docs_path("terms-api")).await, 0);
    assert_eq!(hits(&server, "/login").await, 0);
    assert_eq!(hits(&server, "/developers/en/docs/api").await, 0);
    assert_eq!(report.pages_visited, 2);
}

#[tokio::test]
async fn test_full_pipeline_with_summarizer() {
    let site = MockServer::start().await;
    let summarizer = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let html = r#"<html><body>
        <nav>Menu</nav>
        <h1>Alpha</h1>
        <p>Alpha body</p>
        <p>Base: <strong>https://api.example.com/v1</strong></p>
        <table>
            <tr><th>Method</th><th>Path</th></tr>
            <tr><td>GET</td><td>/v1/items</td></tr>
        </table>
    </body></html>"#;
    mount_page(&site, DOCS, html.to_string()).await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("Alpha body"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "# Alpha\nRewritten alpha" } }]
        })))
        .expect(1)
        .mount(&summarizer)
        .await;

    let mut config = create_test_config(0, FilterMode::Standard);
    config.summarizer.endpoint = format!("{}/chat", summarizer.uri());

    let base = format!("{}{}", site.uri(), DOCS);
    let report = crawl(&base, output.path(), "acme", &config, Some(&test_credentials()))
        .await
        .unwrap();

    assert_eq!(report.pages_persisted, 1);
    assert_eq!(report.endpoints_found, 2);
    assert_eq!(report.tables_found, 1);
    assert_eq!(report.files, vec![output.path().join("acme_1.txt")]);

    assert_eq!(
        read_output(output.path(), "acme"),
        "# Alpha\nRewritten alpha\n\n\
         API Endpoints:\nhttps://api.example.com/v1\n/v1/items\n\n\
         Tables:\n\nTable 1:\nMethod | Path\nGET | /v1/items\n\n"
    );
}

#[tokio::test]
async fn test_summarizer_failure_still_follows_links() {
    let site = MockServer::start().await;
    let summarizer = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let root = format!(
        r#"<html><body><p>Root text</p>
        <table><tr><td>key</td><td>value</td></tr></table>
        <a href="{}">child</a></body></html>"#,
        docs_path("child")
    );
    mount_page(&site, DOCS, root).await;
    mount_page(&site, &docs_path("child"), page("Child text", &[])).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&summarizer)
        .await;

    let mut config = create_test_config(2, FilterMode::Standard);
    config.summarizer.endpoint = format!("{}/chat", summarizer.uri());
    config.summarizer.max_attempts = 2;

    let base = format!("{}{}", site.uri(), DOCS);
    let report = crawl(&base, output.path(), "acme", &config, Some(&test_credentials()))
        .await
        .unwrap();

    assert_eq!(hits(&site, &docs_path("child")).await, 1);
    assert_eq!(report.summary_failures, 2);
    assert_eq!(report.pages_persisted, 0);
    // Two pages, two attempts each
    assert_eq!(summarizer.received_requests().await.unwrap().len(), 4);

    let text = read_output(output.path(), "acme");
    assert!(!text.contains("Root text"));
    assert!(text.contains("Table 1:\nkey | value"));
}

#[tokio::test]
async fn test_empty_page_skips_summarizer() {
    let site = MockServer::start().await;
    let summarizer = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &site,
        DOCS,
        "<html><body><header>Cookie notice</header><div>layout only</div></body></html>"
            .to_string(),
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&summarizer)
        .await;

    let mut config = create_test_config(0, FilterMode::Standard);
    config.summarizer.endpoint = format!("{}/chat", summarizer.uri());

    let base = format!("{}{}", site.uri(), DOCS);
    let report = crawl(&base, output.path(), "acme", &config, Some(&test_credentials()))
        .await
        .unwrap();

    assert_eq!(report.empty_pages, 1);
    assert!(report.files.is_empty());
}

#[tokio::test]
async fn test_output_rolls_over() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        DOCS,
        page("Page number 0 text", &[docs_path("one"), docs_path("two")]),
    )
    .await;
    mount_page(&server, &docs_path("one"), page("Page number 1 text", &[])).await;
    mount_page(&server, &docs_path("two"), page("Page number 2 text", &[])).await;

    let mut config = create_test_config(1, FilterMode::Standard);
    // Each unit is 20 bytes; two fit under the cap, the third rolls over
    config.output.max_file_size = 50;
    let report = run_raw(&server, output.path(), &config).await;

    let first = output.path().join("acme_1.txt");
    let second = output.path().join("acme_2.txt");
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        "Page number 0 text\n\nPage number 1 text\n\n"
    );
    assert_eq!(fs::read_to_string(&second).unwrap(), "Page number 2 text\n\n");
    assert_eq!(report.files, vec![first, second]);
}

#[tokio::test]
async fn test_worker_pool_visits_each_page_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let children: Vec<String> = (0..6).map(|i| docs_path(&format!("p{}", i))).collect();
    mount_page(&server, DOCS, page("Hub page", &children)).await;
    for (i, child) in children.iter().enumerate() {
        // Every child links back to its siblings
        mount_page(&server, child, page(&format!("Child {}", i), &children)).await;
    }

    let mut config = create_test_config(3, FilterMode::Standard);
    config.crawler.workers = 4;
    let report = run_raw(&server, output.path(), &config).await;

    assert_eq!(report.pages_visited, 7);
    assert_eq!(report.pages_persisted, 7);
    for child in &children {
        assert_eq!(hits(&server, child).await, 1);
    }
}

#[tokio::test]
async fn test_output_dir_occupied_by_file() {
    let dir = TempDir::new().unwrap();
    let occupied = dir.path().join("output");
    fs::write(&occupied, "I am a file").unwrap();

    let result = prepare_output_dir(&occupied);
    assert!(matches!(result, Err(HarvestError::OutputDir { .. })));
}
