//! Crawler API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use trawler_core::{CrawlStatus, SchedulerStatus};

use crate::state::AppState;

/// Crawler status response
#[derive(Debug, Serialize)]
pub struct CrawlerStatusResponse {
    /// Whether the crawl loop was started (enabled in config)
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl: Option<CrawlStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerStatus>,
}

/// Get crawl loop and scheduler status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<CrawlerStatusResponse> {
    match state.crawler_status() {
        Some(status) => Json(CrawlerStatusResponse {
            available: true,
            crawl: Some(status.crawl),
            scheduler: Some(status.scheduler),
        }),
        None => Json(CrawlerStatusResponse {
            available: false,
            crawl: None,
            scheduler: None,
        }),
    }
}
