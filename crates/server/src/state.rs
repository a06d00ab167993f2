use std::sync::Arc;

use trawler_core::{Config, CrawlMonitor, CrawlerStatus, SanitizedConfig, TorrentStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn TorrentStore>,
    crawler: Option<CrawlMonitor>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn TorrentStore>, crawler: Option<CrawlMonitor>) -> Self {
        Self {
            config,
            store,
            crawler,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn TorrentStore {
        self.store.as_ref()
    }

    /// Crawl loop status, `None` when the crawler is disabled.
    pub fn crawler_status(&self) -> Option<CrawlerStatus> {
        self.crawler.as_ref().map(CrawlMonitor::status)
    }
}
