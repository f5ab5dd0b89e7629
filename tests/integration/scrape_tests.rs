//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for the Apify API and the image CDN
//! and exercise the HTTP clients and the full submit/poll/normalize cycle.

use insta_scraper::apify::{ActorBackend, ActorInput, RunStatus};
use insta_scraper::config::{ApiConfig, MediaConfig, PollingConfig, Settings};
use insta_scraper::media::{download_post_media, MediaFetcher, MediaOutcome};
use insta_scraper::{ApifyClient, Normalizer, ScrapeError, ScrapeRequest, Scraper, ValidationError};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";
const ACTOR: &str = "apify~instagram-scraper";

/// Creates settings pointing at the mock server
fn create_test_settings(server: &MockServer) -> Settings {
    Settings {
        api: ApiConfig {
            base_url: format!("{}/v2", server.uri()),
            actor_id: ACTOR.to_string(),
        },
        polling: PollingConfig {
            interval_secs: 1,
            timeout_secs: 5,
        },
        api_token: TOKEN.to_string(),
        ..Settings::default()
    }
}

fn create_test_client(server: &MockServer) -> ApifyClient {
    let settings = create_test_settings(server);
    ApifyClient::new(&settings.api, TOKEN.to_string()).expect("Failed to build client")
}

fn natgeo_request(limit: u32) -> ScrapeRequest {
    ScrapeRequest::builder(["https://www.instagram.com/natgeo/"])
        .results_limit(limit)
        .build()
        .expect("Request should be valid")
}

async fn mount_run_started(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/v2/acts/{}/runs", ACTOR)))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "run-1", "defaultDatasetId": "ds-1", "status": "READY"}
        })))
        .mount(server)
        .await;
}

async fn mount_dataset(server: &MockServer, items: Value) {
    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds-1/items"))
        .and(query_param("format", "json"))
        .and(query_param("clean", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
}

async fn mount_run_status(server: &MockServer, run: Value) {
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/run-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": run })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_start_run_sends_actor_input() {
    let server = MockServer::start().await;
    mount_run_started(&server).await;

    let client = create_test_client(&server);
    let request = ScrapeRequest::builder(["https://www.instagram.com/natgeo/"])
        .results_limit(5)
        .add_parent_data(true)
        .build()
        .unwrap();

    let handle = client
        .start_run(&ActorInput::from(&request))
        .await
        .unwrap()
        .expect("Run handle should be present");
    assert_eq!(handle.id, "run-1");
    assert_eq!(handle.default_dataset_id, "ds-1");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);

    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "directUrls": ["https://www.instagram.com/natgeo/"],
            "resultsType": "posts",
            "resultsLimit": 5,
            "searchType": "user",
            "searchLimit": 1,
            "addParentData": true
        })
    );
}

#[tokio::test]
async fn test_start_run_without_id_yields_no_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/acts/{}/runs", ACTOR)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let handle = client
        .start_run(&ActorInput::from(&natgeo_request(5)))
        .await
        .unwrap();
    assert!(handle.is_none());
}

#[tokio::test]
async fn test_run_without_dataset_is_submission_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/acts/{}/runs", ACTOR)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "run-1", "defaultDatasetId": ""}
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let handle = client
        .start_run(&ActorInput::from(&natgeo_request(5)))
        .await
        .unwrap();
    assert!(handle.is_none());

    let scraper = Scraper::from_settings(&create_test_settings(&server)).unwrap();
    let result = scraper.scrape_posts(&natgeo_request(5)).await;
    assert!(matches!(result, Err(ScrapeError::Submission(_))));

    let dataset_reads = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().contains("/datasets/"))
        .count();
    assert_eq!(dataset_reads, 0);
}

#[tokio::test]
async fn test_run_info_and_api_errors() {
    let server = MockServer::start().await;
    mount_run_status(&server, json!({"id": "run-1", "status": "RUNNING"})).await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("record not found"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    let info = client.run_info("run-1").await.unwrap();
    assert_eq!(info.status, RunStatus::Running);

    match client.run_info("missing").await {
        Err(ScrapeError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "record not found");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scrape_end_to_end() {
    let server = MockServer::start().await;
    mount_run_started(&server).await;

    let items: Vec<Value> = (1..=5)
        .map(|i| {
            json!({
                "inputUrl": "https://www.instagram.com/natgeo/",
                "shortCode": format!("CODE{}", i),
                "type": "Image",
                "caption": format!("Post {} #nature", i),
                "hashtags": ["nature"],
                "likesCount": i * 100,
                "commentsCount": i,
                "ownerUsername": "natgeo",
                "timestamp": "2024-03-01T12:00:00.000Z"
            })
        })
        .collect();
    mount_dataset(&server, Value::Array(items)).await;

    let scraper = Scraper::from_settings(&create_test_settings(&server)).unwrap();
    let posts = scraper.scrape_posts(&natgeo_request(5)).await.unwrap();

    assert_eq!(posts.len(), 5);
    for post in &posts {
        assert!(!post.url.is_empty());
        assert!(!post.short_code.is_empty());
        assert_eq!(post.url, format!("https://www.instagram.com/p/{}/", post.short_code));
        assert_eq!(post.owner_username, "natgeo");
    }
    assert_eq!(posts[4].likes_count, 500);
}

#[tokio::test]
async fn test_scrape_skips_unusable_items() {
    let server = MockServer::start().await;
    mount_run_started(&server).await;
    mount_dataset(
        &server,
        json!([
            {"shortCode": "GOOD1"},
            {"caption": "no url or short code"},
            {"shortCode": "BAD", "likesCount": "lots"},
            "not an object",
            {"url": "https://www.instagram.com/reel/GOOD2/"}
        ]),
    )
    .await;

    let scraper = Scraper::from_settings(&create_test_settings(&server)).unwrap();
    let posts = scraper.scrape_posts(&natgeo_request(5)).await.unwrap();

    let codes: Vec<&str> = posts.iter().map(|p| p.short_code.as_str()).collect();
    assert_eq!(codes, vec!["GOOD1", "GOOD2"]);
}

#[tokio::test]
async fn test_failed_run_surfaces_message() {
    let server = MockServer::start().await;
    mount_run_started(&server).await;
    mount_dataset(&server, json!([])).await;
    mount_run_status(
        &server,
        json!({"id": "run-1", "status": "FAILED", "errorMessage": "Actor crashed"}),
    )
    .await;

    let scraper = Scraper::from_settings(&create_test_settings(&server)).unwrap();
    match scraper.scrape_posts(&natgeo_request(5)).await {
        Err(ScrapeError::RunFailed { run_id, message }) => {
            assert_eq!(run_id, "run-1");
            assert_eq!(message, "Actor crashed");
        }
        other => panic!("Expected RunFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/acts/{}/runs", ACTOR)))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let scraper = Scraper::from_settings(&create_test_settings(&server)).unwrap();
    let result = scraper.scrape_posts(&natgeo_request(5)).await;

    assert!(matches!(result, Err(ScrapeError::Submission(_))));
}

#[tokio::test]
async fn test_invalid_urls_rejected_before_any_request() {
    let server = MockServer::start().await;

    let result = ScrapeRequest::builder([
        "https://www.instagram.com/natgeo/",
        "https://example.com/natgeo",
    ])
    .build();

    assert_eq!(
        result.unwrap_err(),
        ValidationError::InvalidProfileUrls(vec!["https://example.com/natgeo".to_string()])
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

fn create_test_media_config() -> MediaConfig {
    MediaConfig {
        timeout_secs: 5,
        max_attempts: 3,
        backoff_factor_ms: 1,
        cdn_fallback_hosts: vec![],
    }
}

#[tokio::test]
async fn test_media_retries_on_503() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.jpg"))
        .and(header("referer", "https://www.instagram.com/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = MediaFetcher::new(&create_test_media_config()).unwrap();
    let bytes = fetcher.fetch(&format!("{}/img.jpg", server.uri())).await.unwrap();

    assert_eq!(bytes, b"jpeg-bytes");
}

#[tokio::test]
async fn test_media_does_not_retry_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = MediaFetcher::new(&create_test_media_config()).unwrap();
    let result = fetcher.fetch(&format!("{}/gone.jpg", server.uri())).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_media_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy.jpg"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = MediaFetcher::new(&create_test_media_config()).unwrap();
    let result = fetcher.fetch(&format!("{}/busy.jpg", server.uri())).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_media_unresolvable_host_uses_cdn_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v/t51/img.jpg"))
        .and(query_param("stp", "dst-jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"from-fallback".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config = MediaConfig {
        cdn_fallback_hosts: vec!["nonexistent-edge.invalid".to_string(), "127.0.0.1".to_string()],
        ..create_test_media_config()
    };
    let fetcher = MediaFetcher::new(&config).unwrap();
    let url = format!(
        "http://nonexistent.invalid:{}/v/t51/img.jpg?stp=dst-jpg",
        server.address().port()
    );

    let bytes = fetcher.fetch(&url).await.unwrap();
    assert_eq!(bytes, b"from-fallback");
}

#[tokio::test]
async fn test_media_unresolvable_host_without_fallbacks_fails() {
    let fetcher = MediaFetcher::new(&create_test_media_config()).unwrap();
    let result = fetcher.fetch("http://nonexistent.invalid/img.jpg").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_download_post_media_falls_back_to_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ok_url = format!("{}/ok.jpg", server.uri());
    let missing_url = format!("{}/missing.png", server.uri());
    let posts = Normalizer::new().normalize_batch(&[json!({
        "shortCode": "MEDIA1",
        "displayUrl": ok_url,
        "images": [ok_url, missing_url]
    })]);

    let dir = TempDir::new().unwrap();
    let fetcher = MediaFetcher::new(&create_test_media_config()).unwrap();
    let outcomes = download_post_media(&fetcher, &posts, dir.path()).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    match &outcomes[0] {
        MediaOutcome::Saved { path, .. } => {
            assert_eq!(path, &dir.path().join("MEDIA1_1.jpg"));
            assert_eq!(std::fs::read(path).unwrap(), b"ok");
        }
        other => panic!("Expected Saved, got {:?}", other),
    }
    match &outcomes[1] {
        MediaOutcome::Link { url, .. } => assert_eq!(url, &missing_url),
        other => panic!("Expected Link, got {:?}", other),
    }
}
