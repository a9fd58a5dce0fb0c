//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch, strip, classify and persist cycle end-to-end.

use std::path::Path;
use std::sync::Arc;
use sumi_harvest::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use sumi_harvest::crawler::{run_harvest, Dispatcher};
use sumi_harvest::storage::{url_hash, CheckpointStore, FileSink};
use sumi_harvest::VisitedRegistry;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &Path, seeds: Vec<String>) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_workers: 4,
            launch_delay_ms: 0,
            max_visited_urls: 100,
            raw_buffer_capacity: 10_000,
            request_timeout_secs: 5,
            abort_in_flight: false,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            directory: dir.join("out"),
            checkpoint_path: dir.join("crawler_state.dat"),
        },
        seeds,
    }
}

fn read_output(config: &Config, url: &str) -> String {
    let sink = FileSink::new(&config.output.directory);
    std::fs::read_to_string(sink.path_for(url)).unwrap()
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_writes_classified_text() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/tech",
        "<html><head><style>p { color: red; }</style></head>\
         <body><p>New Technology release</p></body></html>",
    )
    .await;
    mount_page(
        &server,
        "/sport",
        "<html><body><script>var x = '<p>';</script><h1>Sports roundup</h1></body></html>",
    )
    .await;

    let dir = TempDir::new().unwrap();
    let tech = format!("{}/tech", base);
    let sport = format!("{}/sport", base);
    let config = create_test_config(dir.path(), vec![tech.clone(), sport.clone()]);

    let summary = run_harvest(&config, false, CancellationToken::new())
        .await
        .expect("harvest failed");

    assert_eq!(summary.launched, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
    assert!(!summary.cancelled);

    assert_eq!(
        read_output(&config, &tech),
        format!("URL: {}\n\nExtracted Text:\nNew Technology release\n\n", tech)
    );
    assert_eq!(
        read_output(&config, &sport),
        format!("URL: {}\n\nExtracted Text:\nSports roundup\n\n", sport)
    );

    // Uninterrupted runs leave no checkpoint behind
    assert!(!config.output.checkpoint_path.exists());
}

#[tokio::test]
async fn test_output_file_named_by_url_hash() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>plain</p>").await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/", server.uri());
    let config = create_test_config(dir.path(), vec![url.clone()]);

    run_harvest(&config, false, CancellationToken::new())
        .await
        .unwrap();

    let expected = config
        .output
        .directory
        .join(format!("output_{}.txt", url_hash(&url)));
    assert!(expected.exists());
}

#[tokio::test]
async fn test_repeated_runs_append() {
    let server = MockServer::start().await;
    mount_page(&server, "/news", "<p>Evening news</p>").await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/news", server.uri());
    let config = create_test_config(dir.path(), vec![url.clone()]);

    for _ in 0..2 {
        run_harvest(&config, false, CancellationToken::new())
            .await
            .unwrap();
    }

    let block = format!("URL: {}\n\nExtracted Text:\nEvening news\n\n", url);
    assert_eq!(read_output(&config, &url), format!("{}{}", block, block));
}

#[tokio::test]
async fn test_failed_fetch_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<p>still here</p>").await;

    let dir = TempDir::new().unwrap();
    let gone = format!("{}/gone", server.uri());
    let ok = format!("{}/ok", server.uri());
    let config = create_test_config(dir.path(), vec![gone.clone(), ok.clone()]);

    let summary = run_harvest(&config, false, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.processed, 1);
    let sink = FileSink::new(&config.output.directory);
    assert!(!sink.path_for(&gone).exists());
    assert!(sink.path_for(&ok).exists());
}

#[tokio::test]
async fn test_user_agent_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_regex("user-agent", r"^TestBot/1\.0\.0 \(\+https://example\.com/contact; test@example\.com\)$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), vec![format!("{}/", server.uri())]);

    let summary = run_harvest(&config, false, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
}

#[tokio::test]
async fn test_resume_skips_checkpointed_seeds() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "<p>a</p>").await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>b</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let a = format!("{}/a", server.uri());
    let b = format!("{}/b", server.uri());
    let config = create_test_config(dir.path(), vec![a.clone(), b.clone()]);

    // A previous run fetched `a` and was interrupted
    let store = CheckpointStore::new(&config.output.checkpoint_path, 100);
    store.save(&[a.clone()]).unwrap();

    let summary = run_harvest(&config, false, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.launched, 1);
    let sink = FileSink::new(&config.output.directory);
    assert!(!sink.path_for(&a).exists());
    assert!(sink.path_for(&b).exists());
}

#[tokio::test]
async fn test_cancelled_harvest_saves_checkpoint() {
    let server = MockServer::start().await;
    mount_page(&server, "/first", "<p>first</p>").await;

    let dir = TempDir::new().unwrap();
    let first = format!("{}/first", server.uri());
    let mut config = create_test_config(
        dir.path(),
        vec![first.clone(), format!("{}/second", server.uri())],
    );
    config.crawler.launch_delay_ms = 60_000;
    std::fs::create_dir_all(&config.output.directory).unwrap();

    let cancel = CancellationToken::new();
    let registry = Arc::new(VisitedRegistry::new(100));
    let dispatcher =
        Dispatcher::from_config(&config, registry.clone(), cancel.clone()).unwrap();

    // The second launch waits a minute; cancel once the first page is in
    let trigger = cancel.clone();
    let watched = registry.clone();
    let watched_url = first.clone();
    tokio::spawn(async move {
        while !watched.contains(&watched_url) {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        trigger.cancel();
    });

    let summary = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        dispatcher.run(&config.seeds),
    )
    .await
    .expect("cancellation did not stop the dispatcher");

    assert_eq!(summary.launched, 1);
    assert!(summary.cancelled);
    assert!(summary.checkpoint_saved);
    assert_eq!(dispatcher.checkpoint().load(), Some(vec![first]));
}
