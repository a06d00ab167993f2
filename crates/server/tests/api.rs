//! HTTP API tests against the in-process router.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use common::fixtures::{candidate, catalog_item, magnet, torrent_record};
use common::TestFixture;

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const HASH_C: &str = "cccccccccccccccccccccccccccccccccccccccc";

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_api_keys() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["catalog"]["api_key_configured"], true);
    assert_eq!(response.body["searcher"]["api_key_configured"], false);
    assert!(!response.text.contains("test-tmdb-key"));
}

#[tokio::test]
async fn test_data_on_empty_store() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/data").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["torrents"].as_array().unwrap().len(), 0);
    assert_eq!(response.body["stats"]["total_count"], 0);
}

#[tokio::test]
async fn test_data_returns_newest_first_with_stats() {
    let fixture = TestFixture::new().await;

    let mut older = torrent_record(HASH_A, 50);
    older.upload_date = Utc::now() - Duration::days(2);
    let newer = torrent_record(HASH_B, 5);
    fixture.seed(&[older, newer]);

    let response = fixture.get("/api/v1/data").await;

    assert_status!(response, StatusCode::OK);
    let torrents = response.body["torrents"].as_array().unwrap();
    assert_eq!(torrents.len(), 2);
    assert_eq!(torrents[0]["info_hash"], HASH_B);
    assert_eq!(torrents[1]["info_hash"], HASH_A);
    assert_eq!(torrents[0]["type"], "series");
    assert_eq!(response.body["stats"]["total_count"], 2);
    assert_eq!(response.body["stats"]["total_seeders"], 55);
}

#[tokio::test]
async fn test_list_torrents_respects_limit() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[
        torrent_record(HASH_A, 1),
        torrent_record(HASH_B, 2),
        torrent_record(HASH_C, 3),
    ]);

    let response = fixture.get("/api/v1/torrents?limit=2").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["torrents"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_torrents_rejects_bad_limit() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/torrents?limit=lots").await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_torrent_found() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[torrent_record(HASH_A, 12)]);

    let response = fixture.get(&format!("/api/v1/torrents/{}", HASH_A)).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["info_hash"], HASH_A);
    assert_eq!(response.body["seeders"], 12);
    assert_eq!(response.body["imdb_id"], "tt0000001");
}

#[tokio::test]
async fn test_get_torrent_is_case_insensitive() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[torrent_record(HASH_A, 12)]);

    let response = fixture
        .get(&format!("/api/v1/torrents/{}", HASH_A.to_uppercase()))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["info_hash"], HASH_A);
}

#[tokio::test]
async fn test_get_torrent_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get(&format!("/api/v1/torrents/{}", HASH_C)).await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert!(response.body["error"].as_str().unwrap().contains(HASH_C));
}

#[tokio::test]
async fn test_stats() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[torrent_record(HASH_A, 7), torrent_record(HASH_B, 3)]);

    let response = fixture.get("/api/v1/stats").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total_count"], 2);
    assert_eq!(response.body["series_count"], 2);
    assert_eq!(response.body["total_seeders"], 10);
}

#[tokio::test]
async fn test_crawler_status_when_disabled() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/crawler/status").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["available"], false);
    assert!(response.body.get("crawl").is_none());
}

#[tokio::test]
async fn test_crawler_status_follows_the_loop() {
    let mut fixture = TestFixture::with_crawler().await;
    fixture
        .catalog
        .set_page(1, vec![catalog_item(1396, "Breaking Bad")])
        .await;

    let response = fixture.get("/api/v1/crawler/status").await;
    assert_eq!(response.body["available"], true);
    assert_eq!(response.body["crawl"]["state"], "paging");
    assert_eq!(response.body["crawl"]["page"], 1);
    assert_eq!(response.body["scheduler"]["concurrency"], 1);

    fixture.crawl().step().await;

    let response = fixture.get("/api/v1/crawler/status").await;
    assert_eq!(response.body["crawl"]["state"], "dispatching");
}

#[tokio::test]
async fn test_crawled_torrents_are_served() {
    let mut fixture = TestFixture::with_crawler().await;
    fixture
        .catalog
        .set_page(1, vec![catalog_item(1396, "Breaking Bad")])
        .await;
    fixture.catalog.add_external_id(1396, "tt0903747").await;
    fixture
        .searcher
        .set_results(vec![candidate(
            "Breaking Bad S01 1080p",
            Some(&magnet(HASH_A)),
            Some(30),
        )])
        .await;

    // fetch, dispatch, drain
    for _ in 0..3 {
        fixture.crawl().step().await;
    }

    let response = fixture.get(&format!("/api/v1/torrents/{}", HASH_A)).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["imdb_id"], "tt0903747");
    assert_eq!(response.body["tmdb_id"], 1396);
    assert_eq!(response.body["provider"], "mock-indexer");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[torrent_record(HASH_A, 4)]);

    // one request so the HTTP counters have a sample
    fixture.get("/api/v1/health").await;
    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("trawler_http_requests_total"));
    assert!(response.text.contains("trawler_stored_torrents"));
    assert!(response.text.contains("trawler_crawler_running 0"));
}
