//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Crawl loop (pages, cycles, backoffs)
//! - Item processing (outcomes, stored records, job failures)
//! - Persistence (upserted records, store failures)

use once_cell::sync::Lazy;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

// =============================================================================
// Crawl Loop Metrics
// =============================================================================

/// Catalog pages fetched successfully.
pub static PAGES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("trawler_pages_fetched_total", "Catalog pages fetched").unwrap()
});

/// Catalog page fetches that failed and triggered a backoff.
pub static PAGE_FETCH_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trawler_page_fetch_failures_total",
        "Catalog page fetches that failed",
    )
    .unwrap()
});

/// Full passes over the configured page range.
pub static CRAWL_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trawler_crawl_cycles_total",
        "Completed passes over the catalog page range",
    )
    .unwrap()
});

/// Page currently targeted by the crawl loop.
pub static CURRENT_PAGE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trawler_current_page", "Catalog page targeted by the crawl loop").unwrap()
});

// =============================================================================
// Processing Metrics
// =============================================================================

/// Items processed by outcome.
pub static ITEMS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_items_processed_total", "Catalog items processed"),
        &["outcome"], // "no_external_id", "no_results", "nothing_to_store", "stored"
    )
    .unwrap()
});

/// Scheduler jobs that did not complete successfully.
pub static JOB_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_job_failures_total", "Failed crawl jobs"),
        &["kind"], // "error", "panic", "timeout"
    )
    .unwrap()
});

/// Job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("trawler_job_duration_seconds", "Duration of crawl jobs")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Persistence Metrics
// =============================================================================

/// Records written by merge-upsert.
pub static RECORDS_UPSERTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("trawler_records_upserted_total", "Torrent records upserted").unwrap()
});

/// Batches that failed and were rolled back.
pub static STORE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trawler_store_failures_total",
        "Upsert batches rolled back after a failure",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Crawl loop
        Box::new(PAGES_FETCHED.clone()),
        Box::new(PAGE_FETCH_FAILURES.clone()),
        Box::new(CRAWL_CYCLES.clone()),
        Box::new(CURRENT_PAGE.clone()),
        // Processing
        Box::new(ITEMS_PROCESSED.clone()),
        Box::new(JOB_FAILURES.clone()),
        Box::new(JOB_DURATION.clone()),
        // Persistence
        Box::new(RECORDS_UPSERTED.clone()),
        Box::new(STORE_FAILURES.clone()),
    ]
}

/// Register every core metric in `registry`.
pub fn register_metrics(registry: &Registry) -> prometheus::Result<()> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();

        ITEMS_PROCESSED.with_label_values(&["stored"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();

        assert!(names.contains(&"trawler_items_processed_total".to_string()));
        assert!(names.contains(&"trawler_pages_fetched_total".to_string()));
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
        assert!(register_metrics(&registry).is_err());
    }
}
