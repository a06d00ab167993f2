//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process over
//! an in-memory store, optionally with a crawl loop wired to mock backends.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use trawler_core::{
    testing::{MockSearcher, MockSeriesCatalog},
    Config, CrawlLoop, CrawlerConfig, ItemProcessor, SqliteTorrentStore, TorrentRecord,
    TorrentStore,
};

/// Re-export fixtures for test convenience
pub use trawler_core::testing::fixtures;

/// Test fixture for API testing.
///
/// The crawl loop, when enabled, is built but never run: tests drive it with
/// `step` through [`TestFixture::crawl`].
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// In-memory store shared with the router
    pub store: Arc<SqliteTorrentStore>,
    /// Mock catalog - configure pages and external ids
    pub catalog: Arc<MockSeriesCatalog>,
    /// Mock searcher - configure search results
    pub searcher: Arc<MockSearcher>,
    /// Crawl loop, when enabled
    pub crawl: Option<CrawlLoop>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with the crawler disabled.
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Create a fixture with a crawl loop over mock backends.
    pub async fn with_crawler() -> Self {
        Self::build(true).await
    }

    async fn build(with_crawler: bool) -> Self {
        let store = Arc::new(SqliteTorrentStore::in_memory().expect("Failed to create store"));
        let catalog = Arc::new(MockSeriesCatalog::new());
        let searcher = Arc::new(MockSearcher::new());

        let mut config = Config::default();
        config.catalog.api_key = "test-tmdb-key".to_string();
        config.crawler = CrawlerConfig {
            enabled: with_crawler,
            start_delay_secs: 0,
            ..Default::default()
        };

        let crawl = with_crawler.then(|| {
            let processor = Arc::new(ItemProcessor::new(
                catalog.clone(),
                searcher.clone(),
                store.clone(),
            ));
            CrawlLoop::new(config.crawler.clone(), catalog.clone(), processor)
        });
        let monitor = crawl.as_ref().map(CrawlLoop::monitor);

        let state = Arc::new(trawler_server::state::AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn TorrentStore>,
            monitor,
        ));

        let router = trawler_server::api::create_router(state);

        Self {
            router,
            store,
            catalog,
            searcher,
            crawl,
        }
    }

    /// Insert records straight into the store.
    pub fn seed(&self, records: &[TorrentRecord]) {
        self.store
            .batch_upsert(records)
            .expect("Failed to seed store");
    }

    /// Mutable access to the crawl loop. Panics when the crawler is disabled.
    pub fn crawl(&mut self) -> &mut CrawlLoop {
        self.crawl.as_mut().expect("crawler not enabled")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
