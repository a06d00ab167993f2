//! The crawl loop: walks catalog pages forever, one state transition at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::external_catalog::SeriesCatalog;
use crate::metrics;

use super::config::CrawlerConfig;
use super::processor::ItemProcessor;
use super::scheduler::JobScheduler;
use super::types::{CrawlState, CrawlStatus, CrawlerStatus};

/// Drives the crawl pipeline.
///
/// `step` performs exactly one transition and reports how long the caller
/// should wait before the next one. `run` is the production driver: it
/// applies those waits and stops on shutdown.
pub struct CrawlLoop {
    config: CrawlerConfig,
    catalog: Arc<dyn SeriesCatalog>,
    processor: Arc<ItemProcessor>,
    scheduler: JobScheduler,

    state: CrawlState,
    page: u32,
    cycles_completed: u64,
    consecutive_failures: u32,
    last_error: Option<String>,
    running: bool,
    status_tx: watch::Sender<CrawlStatus>,
}

impl CrawlLoop {
    /// Create a loop positioned at page 1 in `Paging`.
    ///
    /// Spawns the scheduler's dispatcher, so it must be called inside a
    /// tokio runtime.
    pub fn new(
        config: CrawlerConfig,
        catalog: Arc<dyn SeriesCatalog>,
        processor: Arc<ItemProcessor>,
    ) -> Self {
        let scheduler = JobScheduler::new(config.scheduler_config());
        let (status_tx, _) = watch::channel(CrawlStatus::default());

        let crawl = Self {
            config,
            catalog,
            processor,
            scheduler,
            state: CrawlState::Paging,
            page: 1,
            cycles_completed: 0,
            consecutive_failures: 0,
            last_error: None,
            running: false,
            status_tx,
        };
        crawl.publish();
        crawl
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn status(&self) -> CrawlStatus {
        CrawlStatus {
            running: self.running,
            state: self.state.name().to_string(),
            page: self.page,
            max_pages: self.config.max_pages,
            cycles_completed: self.cycles_completed,
            consecutive_failures: self.consecutive_failures,
            last_error: self.last_error.clone(),
        }
    }

    /// A cloneable read-only view for the HTTP layer.
    pub fn monitor(&self) -> CrawlMonitor {
        CrawlMonitor {
            status: self.status_tx.subscribe(),
            scheduler: self.scheduler.clone(),
        }
    }

    /// Perform one transition. Returns the pause the new state asks for.
    pub async fn step(&mut self) -> Option<Duration> {
        let state = std::mem::replace(&mut self.state, CrawlState::Paging);

        let (next, pause) = match state {
            CrawlState::Paging => self.fetch_page().await,
            CrawlState::Dispatching(items) => {
                for item in items {
                    let processor = Arc::clone(&self.processor);
                    let label = format!("{} ({})", item.name, item.catalog_id);
                    self.scheduler.enqueue(label, async move {
                        processor.process(&item).await.map(|_| ())
                    });
                }
                (CrawlState::Draining, None)
            }
            CrawlState::Draining => {
                self.scheduler.drain().await;
                (CrawlState::Advance, None)
            }
            CrawlState::Advance => self.advance(),
            CrawlState::Cooldown | CrawlState::ErrorBackoff => (CrawlState::Paging, None),
        };

        self.state = next;
        self.publish();
        pause
    }

    /// Run until `shutdown` fires. Jobs already handed to the scheduler are
    /// left to finish on their own.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        self.running = true;
        self.publish();

        let delay = self.config.start_delay();
        info!(delay_secs = delay.as_secs(), "Crawl loop starting");

        if !Self::pause(delay, &mut shutdown).await {
            self.stopped();
            return;
        }

        loop {
            let pause = tokio::select! {
                _ = shutdown.recv() => break,
                pause = self.step() => pause,
            };

            if let Some(duration) = pause {
                if !Self::pause(duration, &mut shutdown).await {
                    break;
                }
            }
        }

        self.stopped();
    }

    /// Sleep for `duration`. Returns false if shutdown fired first.
    async fn pause(duration: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
        if duration.is_zero() {
            return true;
        }
        tokio::select! {
            _ = shutdown.recv() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn stopped(&mut self) {
        self.running = false;
        self.publish();
        info!("Crawl loop stopped");
    }

    async fn fetch_page(&mut self) -> (CrawlState, Option<Duration>) {
        metrics::CURRENT_PAGE.set(self.page as i64);

        match self
            .catalog
            .list_popular(&self.config.language, self.page)
            .await
        {
            Ok(items) => {
                metrics::PAGES_FETCHED.inc();
                self.consecutive_failures = 0;
                self.last_error = None;

                if items.is_empty() {
                    info!(page = self.page, "Catalog page is empty");
                    (CrawlState::Advance, None)
                } else {
                    info!(page = self.page, items = items.len(), "Fetched catalog page");
                    (CrawlState::Dispatching(items), None)
                }
            }
            Err(e) => {
                metrics::PAGE_FETCH_FAILURES.inc();
                self.consecutive_failures += 1;
                self.last_error = Some(e.to_string());

                let backoff = self.config.error_backoff();
                warn!(
                    page = self.page,
                    attempt = self.consecutive_failures,
                    retry_in_secs = backoff.as_secs(),
                    error = %e,
                    "Failed to fetch catalog page"
                );
                (CrawlState::ErrorBackoff, Some(backoff))
            }
        }
    }

    fn advance(&mut self) -> (CrawlState, Option<Duration>) {
        self.page += 1;
        if self.page > self.config.max_pages {
            self.page = 1;
            self.cycles_completed += 1;
            metrics::CRAWL_CYCLES.inc();

            let cooldown = self.config.cooldown();
            info!(
                cycles = self.cycles_completed,
                cooldown_secs = cooldown.as_secs(),
                "Crawl cycle complete"
            );
            (CrawlState::Cooldown, Some(cooldown))
        } else {
            (CrawlState::Paging, None)
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }
}

/// Read-only view of a running crawl loop.
#[derive(Clone)]
pub struct CrawlMonitor {
    status: watch::Receiver<CrawlStatus>,
    scheduler: JobScheduler,
}

impl CrawlMonitor {
    pub fn status(&self) -> CrawlerStatus {
        CrawlerStatus {
            crawl: self.status.borrow().clone(),
            scheduler: self.scheduler.status(),
        }
    }
}
