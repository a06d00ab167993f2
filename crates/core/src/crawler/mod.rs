//! Crawl pipeline.
//!
//! Control flows one way: [`CrawlLoop`] fetches catalog pages and hands each
//! item to the [`JobScheduler`], which runs [`ItemProcessor::process`] under a
//! concurrency limit. Nothing below the processor reaches the loop.

mod config;
mod controller;
mod processor;
mod scheduler;
mod types;

pub use config::CrawlerConfig;
pub use controller::{CrawlLoop, CrawlMonitor};
pub use processor::ItemProcessor;
pub use scheduler::{JobScheduler, SchedulerConfig, SchedulerStatus};
pub use types::*;
