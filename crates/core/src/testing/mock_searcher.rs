//! Mock searcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::searcher::{CandidateResult, SearchError, SearchRequest, Searcher};

/// A request handler that produces results dynamically based on the request.
type RequestHandler = Box<dyn Fn(&SearchRequest) -> Option<Vec<CandidateResult>> + Send + Sync>;

/// Mock implementation of the Searcher trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track search requests for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use trawler_core::testing::{MockSearcher, fixtures};
///
/// let searcher = MockSearcher::new();
/// searcher.set_results(vec![
///     fixtures::candidate("Dark S01", Some(&fixtures::magnet(HASH)), Some(10)),
/// ]).await;
///
/// let results = searcher.search(&SearchRequest::series("Dark", "2017", None)).await?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(searcher.search_count().await, 1);
/// ```
pub struct MockSearcher {
    /// Configured results to return.
    results: Arc<RwLock<Vec<CandidateResult>>>,
    /// Recorded search requests.
    requests: Arc<RwLock<Vec<SearchRequest>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
    /// Request handler for per-request results.
    handler: Arc<RwLock<Option<RequestHandler>>>,
}

impl std::fmt::Debug for MockSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearcher")
            .field("results", &"<results>")
            .field("requests", &"<requests>")
            .field("next_error", &"<next_error>")
            .field("handler", &"<handler>")
            .finish()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a new mock searcher with empty results.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<CandidateResult>) {
        *self.results.write().await = results;
    }

    /// Get recorded search requests.
    pub async fn recorded_requests(&self) -> Vec<SearchRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a handler that chooses results per request.
    ///
    /// Returning `None` falls back to the configured results.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&SearchRequest) -> Option<Vec<CandidateResult>> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateResult>, SearchError> {
        self.requests.write().await.push(request.clone());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(handler) = self.handler.read().await.as_ref() {
            if let Some(results) = handler(request) {
                return Ok(results);
            }
        }

        Ok(self.results.read().await.clone())
    }
}
