//! External catalog integration (TMDB).
//!
//! The crawler only needs two things from the catalog: a paged listing of
//! popular series and a way to turn a series into its IMDB id.

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with external catalogs.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Source of popular series and their cross-reference ids.
#[async_trait]
pub trait SeriesCatalog: Send + Sync {
    /// List one page (1-based) of popular series.
    async fn list_popular(
        &self,
        language: &str,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ExternalCatalogError>;

    /// Resolve the IMDB id of a series. `Ok(None)` when the catalog has none.
    async fn resolve_external_id(
        &self,
        catalog_id: u32,
    ) -> Result<Option<String>, ExternalCatalogError>;
}
