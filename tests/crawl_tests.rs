//! Integration tests for the site crawl
//!
//! These tests run the full crawl against wiremock servers: robots.txt
//! handling, breadth-first traversal, depth and page limits, the in-domain
//! gate and the body cache.

use page_harvest::config::{Config, CrawlerConfig, SiteEntry, StorageConfig, UserAgentConfig};
use page_harvest::output::{page_list_path, read_jsonl};
use page_harvest::records::PageRecord;
use page_harvest::{run_crawl, HarvestError};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for one site rooted at the mock server
fn test_config(base_url: &str, dir: &TempDir, max_depth: u32, page_limit: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            page_limit,
            target_file_types: vec!["html".to_string()],
            refetch_pages: false,
            log_interval: 100,
            max_workers: 4,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            raw_folder: dir.path().join("raw").to_string_lossy().into_owned(),
            dataset_folder: dir.path().join("dataset").to_string_lossy().into_owned(),
        },
        site: vec![SiteEntry {
            name: "Example".to_string(),
            url: format!("{}/", base_url),
            split: "dev".to_string(),
            // No sleeping between fetches in tests
            crawl_delay: Some(0.0),
        }],
    }
}

/// Mounts a permissive robots.txt (body long enough to count as a fetch)
async fn mount_robots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(server)
        .await;
}

/// Mounts an HTML page at the given route
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts a page the crawl must never request
async fn mount_never(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>should not be fetched</body></html>"),
        )
        .expect(0)
        .mount(server)
        .await;
}

fn page_with_links(title: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!("<a href=\"{}\">{}</a>\n", link, link))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>\n{}</body></html>",
        title, anchors
    )
}

fn leaf_page(title: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>Article body text.</body></html>",
        title
    )
}

#[tokio::test]
async fn test_crawl_records_pages_breadth_first() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_robots(&mock_server).await;

    // Root links one page twice, plus an image the extension filter skips
    mount_page(
        &mock_server,
        "/",
        page_with_links(
            "Home",
            &[
                format!("{}/news/a", base_url),
                format!("{}/news/b", base_url),
                format!("{}/news/a", base_url),
                format!("{}/pic.jpg", base_url),
            ],
        ),
    )
    .await;
    // A child's own links must not be expanded at the last level
    mount_page(
        &mock_server,
        "/news/a",
        page_with_links("A", &[format!("{}/news/c", base_url)]),
    )
    .await;
    mount_page(&mock_server, "/news/b", leaf_page("B")).await;
    mount_never(&mock_server, "/pic.jpg").await;
    mount_never(&mock_server, "/news/c").await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 2, 100);

    let records = run_crawl(&config).await.expect("crawl failed");

    // Breadth-first, duplicates collapsed: root, then a, then b
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].url, format!("{}/", base_url));
    assert_eq!(records[1].url, format!("{}/news/a", base_url));
    assert_eq!(records[2].url, format!("{}/news/b", base_url));

    // Root record shape
    assert_eq!(records[0].parent_url, "");
    assert_eq!(records[0].page_depth, 0);
    assert_eq!(records[0].file_type, "html");
    assert_eq!(records[0].encoding.as_deref(), Some("UTF-8"));
    // The duplicate link is dropped; the image link is kept in the child
    // list even though it is never fetched
    assert_eq!(
        records[0].child_url_list,
        vec![
            format!("{}/news/a", base_url),
            format!("{}/news/b", base_url),
            format!("{}/pic.jpg", base_url),
        ]
    );

    // Pages on the last level are recorded but not expanded
    assert_eq!(records[1].parent_url, format!("{}/", base_url));
    assert_eq!(records[1].page_depth, 1);
    assert!(records[1].child_url_list.is_empty());

    // The crawl also wrote its records to the dataset folder
    let written: Vec<PageRecord> =
        read_jsonl(&page_list_path(&PathBuf::from(&config.storage.dataset_folder)))
            .expect("page list");
    assert_eq!(written.len(), 3);
    assert_eq!(written[0].url, records[0].url);
}

#[tokio::test]
async fn test_max_depth_one_fetches_only_the_root() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_robots(&mock_server).await;

    mount_page(
        &mock_server,
        "/",
        page_with_links("Home", &[format!("{}/news/a", base_url)]),
    )
    .await;
    mount_never(&mock_server, "/news/a").await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 1, 100);

    let records = run_crawl(&config).await.expect("crawl failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].page_depth, 0);
    assert!(records[0].child_url_list.is_empty());
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/",
        page_with_links(
            "Home",
            &[
                format!("{}/allowed", base_url),
                format!("{}/admin", base_url),
            ],
        ),
    )
    .await;
    mount_page(&mock_server, "/allowed", leaf_page("Allowed")).await;
    mount_never(&mock_server, "/admin").await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 2, 100);

    let records = run_crawl(&config).await.expect("crawl failed");

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/allowed", base_url)
        ]
    );
    // The disallowed link is still discovered, just never fetched
    assert!(records[0]
        .child_url_list
        .contains(&format!("{}/admin", base_url)));
}

#[tokio::test]
async fn test_page_limit_stops_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_robots(&mock_server).await;

    mount_page(
        &mock_server,
        "/",
        page_with_links(
            "Home",
            &[
                format!("{}/one", base_url),
                format!("{}/two", base_url),
                format!("{}/three", base_url),
            ],
        ),
    )
    .await;
    mount_page(&mock_server, "/one", leaf_page("One")).await;
    // Queue order is strict FIFO, so with a limit of 2 nothing past /one
    // is ever requested
    mount_never(&mock_server, "/two").await;
    mount_never(&mock_server, "/three").await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 3, 2);

    let records = run_crawl(&config).await.expect("crawl failed");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].url, format!("{}/one", base_url));
}

#[tokio::test]
async fn test_non_target_types_are_not_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_robots(&mock_server).await;

    mount_page(
        &mock_server,
        "/",
        page_with_links(
            "Home",
            &[
                format!("{}/report.pdf", base_url),
                format!("{}/page", base_url),
            ],
        ),
    )
    .await;
    // .pdf is not an excluded extension, so the body is fetched and sniffed
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("%PDF-1.4 report content"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/page", leaf_page("Page")).await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 2, 100);

    let records = run_crawl(&config).await.expect("crawl failed");

    // Only HTML pages are retained when the target type is html
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![format!("{}/", base_url), format!("{}/page", base_url)]
    );
    assert!(records.iter().all(|r| r.file_type == "html"));
}

#[tokio::test]
async fn test_cached_bodies_are_not_refetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // robots.txt is fetched fresh on every engine construction
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_with_links(
            "Home",
            &[format!("{}/news/a", base_url)],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(leaf_page("A")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 2, 100);

    let first = run_crawl(&config).await.expect("first crawl failed");
    let second = run_crawl(&config).await.expect("second crawl failed");

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(first[0].url, second[0].url);
    assert_eq!(first[1].save_path, second[1].save_path);
    assert!(std::path::Path::new(&first[1].save_path).exists());
}

#[tokio::test]
async fn test_missing_robots_aborts_the_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    // No robots.txt mock: wiremock answers 404 with an empty body, which
    // the retry loop treats as a failed fetch

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 2, 100);

    match run_crawl(&config).await {
        Err(HarvestError::Robots { site, .. }) => assert_eq!(site, "Example"),
        other => panic!("expected a robots error, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_offsite_links_are_skipped() {
    let mock_server = MockServer::start().await;
    let offsite_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let offsite_url = offsite_server.uri();

    mount_robots(&mock_server).await;
    mount_page(
        &mock_server,
        "/",
        page_with_links(
            "Home",
            &[
                format!("{}/story", offsite_url),
                format!("{}/local", base_url),
            ],
        ),
    )
    .await;
    mount_page(&mock_server, "/local", leaf_page("Local")).await;
    mount_never(&offsite_server, "/story").await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 2, 100);

    let records = run_crawl(&config).await.expect("crawl failed");

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![format!("{}/", base_url), format!("{}/local", base_url)]
    );
    // Off-site links are discovered and enqueued, then dropped at dequeue
    assert!(records[0]
        .child_url_list
        .contains(&format!("{}/story", offsite_url)));
}

#[tokio::test]
async fn test_non_utf8_body_records_its_encoding() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_robots(&mock_server).await;

    // A Shift_JIS page: invalid as UTF-8, so the resolver must fall back to
    // the sniffed candidate
    let text = "<html><head><title>ニュース</title></head><body>"
        .to_string()
        + &"東京で新しい美術館が開館しました。入場は無料です。".repeat(10)
        + "</body></html>";
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(&text);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(encoded.into_owned()))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&base_url, &dir, 1, 100);

    let records = run_crawl(&config).await.expect("crawl failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_type, "html");
    assert_eq!(records[0].encoding.as_deref(), Some("Shift_JIS"));
}
