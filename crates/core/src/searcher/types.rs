//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::MediaType;

/// Parameters for a single aggregator search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    /// Title to look for.
    pub name: String,
    /// Release year, empty when unknown.
    #[serde(default)]
    pub year: String,
    /// Kind of content being searched.
    pub media_type: MediaType,
    /// IMDB id passed through to indexers that support it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl SearchRequest {
    pub fn series(
        name: impl Into<String>,
        year: impl Into<String>,
        external_id: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            year: year.into(),
            media_type: MediaType::Series,
            external_id,
        }
    }

    /// Free-text query sent to the aggregator: `"{name} {year}"`, trimmed.
    pub fn query_text(&self) -> String {
        format!("{} {}", self.name, self.year).trim().to_string()
    }
}

/// One candidate release returned by the aggregator.
///
/// Nothing about it is trusted: the locator may be missing or malformed,
/// and size/seeders may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateResult {
    pub title: String,
    /// Magnet URI, if the indexer returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// Indexer/tracker that reported the result.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for torrent search backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Run one search and return the raw candidates.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateResult>, SearchError>;
}
