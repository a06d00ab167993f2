//! Types for the crawl pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external_catalog::CatalogItem;
use crate::searcher::SearchError;
use crate::store::StoreError;

use super::scheduler::SchedulerStatus;

/// Errors that fail a single crawl job.
///
/// Resolution misses and empty searches are outcomes, not errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Search aggregator failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// Batch upsert failed and was rolled back.
    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    /// Blocking store task did not complete.
    #[error("internal error: {0}")]
    Internal(String),
}

/// How processing a catalog item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// The catalog has no IMDB id for the item (or the lookup failed).
    NoExternalId,
    /// The aggregator returned nothing.
    NoResults,
    /// Every candidate was discarded by the normalizer.
    NothingToStore,
    /// Records were written.
    Stored { candidates: usize, stored: usize },
}

impl ProcessOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessOutcome::NoExternalId => "no_external_id",
            ProcessOutcome::NoResults => "no_results",
            ProcessOutcome::NothingToStore => "nothing_to_store",
            ProcessOutcome::Stored { .. } => "stored",
        }
    }
}

/// State of the crawl loop state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlState {
    /// Fetch the current catalog page.
    Paging,
    /// Hand every item of the fetched page to the scheduler.
    Dispatching(Vec<CatalogItem>),
    /// Wait for every dispatched job to finish.
    Draining,
    /// Move to the next page, wrapping after the last one.
    Advance,
    /// Pause after a full cycle.
    Cooldown,
    /// Pause after a failed page fetch; the page is retried.
    ErrorBackoff,
}

impl CrawlState {
    pub fn name(&self) -> &'static str {
        match self {
            CrawlState::Paging => "paging",
            CrawlState::Dispatching(_) => "dispatching",
            CrawlState::Draining => "draining",
            CrawlState::Advance => "advance",
            CrawlState::Cooldown => "cooldown",
            CrawlState::ErrorBackoff => "error_backoff",
        }
    }
}

/// Snapshot of the crawl loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrawlStatus {
    /// Whether `run` is currently driving the loop.
    pub running: bool,
    /// Current state name.
    pub state: String,
    /// Page the loop is on (1-based).
    pub page: u32,
    pub max_pages: u32,
    /// Full passes over the page range.
    pub cycles_completed: u64,
    /// Page fetch failures since the last success.
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Combined crawl loop and scheduler status, as served by the read API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrawlerStatus {
    pub crawl: CrawlStatus,
    pub scheduler: SchedulerStatus,
}
