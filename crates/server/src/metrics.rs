//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Trawler server:
//! - HTTP request metrics (latency, counts)
//! - Store contents and crawl loop status (collected dynamically)
//! - Crawl pipeline counters from `trawler_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trawler_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trawler_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Store and Crawler Gauges
// =============================================================================

/// Torrents in the store.
pub static STORED_TORRENTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trawler_stored_torrents", "Torrents in the store").unwrap()
});

/// Sum of seeders across stored torrents.
pub static STORED_SEEDERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trawler_stored_seeders",
        "Sum of seeders across stored torrents",
    )
    .unwrap()
});

/// Whether the crawl loop is running (1) or not (0).
pub static CRAWLER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trawler_crawler_running", "Whether the crawl loop is running").unwrap()
});

/// Crawl jobs currently running.
pub static SCHEDULER_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trawler_scheduler_active_jobs", "Crawl jobs currently running").unwrap()
});

/// Crawl jobs waiting for a slot.
pub static SCHEDULER_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trawler_scheduler_queued_jobs", "Crawl jobs waiting for a slot").unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Store and crawler
    registry
        .register(Box::new(STORED_TORRENTS.clone()))
        .unwrap();
    registry
        .register(Box::new(STORED_SEEDERS.clone()))
        .unwrap();
    registry
        .register(Box::new(CRAWLER_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_QUEUED.clone()))
        .unwrap();

    // Core metrics (crawl loop, processing, persistence)
    trawler_core::metrics::register_metrics(registry).unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the store and crawl loop as they
/// are now.
pub fn collect_dynamic_metrics(state: &AppState) {
    if let Ok(stats) = state.store().stats() {
        STORED_TORRENTS.set(stats.total_count as i64);
        STORED_SEEDERS.set(stats.total_seeders as i64);
    }

    match state.crawler_status() {
        Some(status) => {
            CRAWLER_RUNNING.set(if status.crawl.running { 1 } else { 0 });
            SCHEDULER_ACTIVE.set(status.scheduler.active as i64);
            SCHEDULER_QUEUED.set(status.scheduler.queued as i64);
        }
        None => CRAWLER_RUNNING.set(0),
    }
}

static HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-fA-F]{40}").unwrap());
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = HASH_RE.replace_all(path, "{hash}");
    let result = NUMERIC_RE.replace_all(&result, "/{id}$1");
    result.to_string()
}
