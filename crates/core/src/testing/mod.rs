//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing the crawl pipeline to be tested end to end without TMDB or Jackett.
//!
//! # Example
//!
//! ```rust,ignore
//! use trawler_core::testing::{fixtures, MockSearcher, MockSeriesCatalog};
//!
//! let catalog = MockSeriesCatalog::new();
//! let searcher = MockSearcher::new();
//!
//! // Configure mock responses
//! catalog.set_page(1, vec![fixtures::catalog_item(1, "Dark")]).await;
//! catalog.add_external_id(1, "tt5753856").await;
//! searcher.set_results(vec![/* candidates */]).await;
//! ```

mod mock_searcher;
mod mock_series_catalog;

pub use mock_searcher::MockSearcher;
pub use mock_series_catalog::MockSeriesCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::external_catalog::CatalogItem;
    use crate::searcher::CandidateResult;
    use crate::store::{MediaType, TorrentRecord};

    /// Create a catalog item without an air date.
    pub fn catalog_item(catalog_id: u32, name: &str) -> CatalogItem {
        CatalogItem::new(catalog_id, name)
    }

    /// Build a magnet URI for an info hash.
    pub fn magnet(info_hash: &str) -> String {
        format!(
            "magnet:?xt=urn:btih:{}&dn=test&tr=udp%3A%2F%2Ftracker.example%3A1337",
            info_hash
        )
    }

    /// Create a search candidate from the mock indexer.
    pub fn candidate(title: &str, magnet_uri: Option<&str>, seeders: Option<u32>) -> CandidateResult {
        CandidateResult {
            title: title.to_string(),
            magnet_uri: magnet_uri.map(str::to_string),
            source: "mock-indexer".to_string(),
            size_bytes: Some(1024 * 1024 * 700), // 700 MB
            seeders,
        }
    }

    /// Create a stored series record with reasonable defaults.
    pub fn torrent_record(info_hash: &str, seeders: u32) -> TorrentRecord {
        TorrentRecord {
            info_hash: info_hash.to_string(),
            provider: "mock-indexer".to_string(),
            title: format!("Series {}", &info_hash[..info_hash.len().min(6)]),
            size: 1024 * 1024 * 700,
            media_type: MediaType::Series,
            seeders,
            imdb_id: Some("tt0000001".to_string()),
            tmdb_id: Some(1),
            upload_date: Utc::now(),
        }
    }
}
