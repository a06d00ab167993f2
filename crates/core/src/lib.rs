pub mod config;
pub mod crawler;
pub mod external_catalog;
pub mod metrics;
pub mod normalizer;
pub mod searcher;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use crawler::{
    CrawlLoop, CrawlMonitor, CrawlState, CrawlStatus, CrawlerConfig, CrawlerStatus, ItemProcessor,
    JobScheduler, ProcessError, ProcessOutcome, SchedulerConfig, SchedulerStatus,
};
pub use external_catalog::{
    CatalogItem, ExternalCatalogError, SeriesCatalog, TmdbClient, TmdbConfig,
};
pub use normalizer::{extract_info_hash, normalize, release_year, NormalizeContext};
pub use searcher::{CandidateResult, JackettSearcher, SearchError, SearchRequest, Searcher};
pub use store::{
    DatabasePool, MediaType, SqliteTorrentStore, StoreError, StoreStats, TorrentRecord,
    TorrentStore,
};
