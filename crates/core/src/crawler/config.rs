//! Crawl loop configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::scheduler::SchedulerConfig;

/// Configuration for the crawl loop and its job scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Enable/disable the crawl loop.
    /// When disabled, the server only serves what is already stored.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Language requested from the catalog (e.g. "it-IT").
    #[serde(default = "default_language")]
    pub language: String,

    /// Last catalog page of a cycle. The loop wraps to page 1 after it.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Pause after a full cycle (seconds).
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,

    /// Pause before retrying a page that failed to load (seconds).
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,

    /// Maximum crawl jobs running at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-job timeout (seconds). No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_timeout_secs: Option<u64>,

    /// Delay between server start and the first page fetch (seconds).
    #[serde(default = "default_start_delay")]
    pub start_delay_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_language() -> String {
    "it-IT".to_string()
}

fn default_max_pages() -> u32 {
    20
}

fn default_cooldown() -> u64 {
    300 // 5 minutes
}

fn default_error_backoff() -> u64 {
    10
}

fn default_concurrency() -> usize {
    1
}

fn default_start_delay() -> u64 {
    5
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            language: default_language(),
            max_pages: default_max_pages(),
            cooldown_secs: default_cooldown(),
            error_backoff_secs: default_error_backoff(),
            concurrency: default_concurrency(),
            job_timeout_secs: None,
            start_delay_secs: default_start_delay(),
        }
    }
}

impl CrawlerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_secs)
    }

    /// Scheduler settings derived from this config.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            concurrency: self.concurrency,
            job_timeout: self.job_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrawlerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.language, "it-IT");
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.cooldown(), Duration::from_secs(300));
        assert_eq!(config.error_backoff(), Duration::from_secs(10));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.job_timeout_secs, None);
        assert_eq!(config.start_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            max_pages = 3
        "#;
        let config: CrawlerConfig = toml::from_str(toml).unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.cooldown_secs, 300);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            enabled = false
            language = "en-US"
            max_pages = 5
            cooldown_secs = 60
            error_backoff_secs = 2
            concurrency = 4
            job_timeout_secs = 120
            start_delay_secs = 0
        "#;
        let config: CrawlerConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.language, "en-US");
        assert_eq!(config.concurrency, 4);

        let scheduler = config.scheduler_config();
        assert_eq!(scheduler.concurrency, 4);
        assert_eq!(scheduler.job_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_serialize_skips_unset_timeout() {
        let json = serde_json::to_string(&CrawlerConfig::default()).unwrap();
        assert!(!json.contains("job_timeout_secs"));
    }
}
