//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::CatalogItem;
use super::{ExternalCatalogError, SeriesCatalog};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB API client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required for crawling). `TMDB_KEY` overrides it.
    #[serde(default)]
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, ExternalCatalogError> {
        if config.api_key.is_empty() {
            return Err(ExternalCatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// List a page of popular TV series.
    pub async fn tv_popular(
        &self,
        language: &str,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ExternalCatalogError> {
        let url = format!("{}/tv/popular", self.base_url);

        debug!("TMDB popular TV: language={}, page={}", language, page);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", language),
                ("page", &page.to_string()),
            ])
            .send()
            .await?;

        let popular: TmdbPageResponse<TmdbTvResult> =
            parse_json(check_status(response, || format!("popular page {}", page)).await?)
                .await?;

        Ok(popular.results.into_iter().map(Into::into).collect())
    }

    /// Get the external ids of a TV series.
    pub async fn tv_external_ids(
        &self,
        tmdb_id: u32,
    ) -> Result<TmdbExternalIds, ExternalCatalogError> {
        let url = format!("{}/tv/{}/external_ids", self.base_url, tmdb_id);

        debug!("TMDB TV external ids: id={}", tmdb_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        parse_json(check_status(response, || format!("TV series ID {}", tmdb_id)).await?).await
    }
}

#[async_trait]
impl SeriesCatalog for TmdbClient {
    async fn list_popular(
        &self,
        language: &str,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ExternalCatalogError> {
        self.tv_popular(language, page).await
    }

    async fn resolve_external_id(
        &self,
        catalog_id: u32,
    ) -> Result<Option<String>, ExternalCatalogError> {
        let ids = self.tv_external_ids(catalog_id).await?;
        Ok(ids.imdb_id.filter(|id| !id.trim().is_empty()))
    }
}

/// Map TMDB status codes onto catalog errors.
async fn check_status(
    response: Response,
    what: impl FnOnce() -> String,
) -> Result<Response, ExternalCatalogError> {
    let status = response.status();
    if status == 401 {
        return Err(ExternalCatalogError::NotConfigured(
            "Invalid TMDB API key".to_string(),
        ));
    }
    if status == 404 {
        return Err(ExternalCatalogError::NotFound(what()));
    }
    if status == 429 {
        return Err(ExternalCatalogError::RateLimitExceeded);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ExternalCatalogError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ExternalCatalogError> {
    response.json().await.map_err(|e| {
        ExternalCatalogError::ParseError(format!("Failed to parse TMDB response: {}", e))
    })
}

// ============================================================================
// TMDB API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
struct TmdbPageResponse<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    id: u32,
    name: String,
    first_air_date: Option<String>,
}

impl From<TmdbTvResult> for CatalogItem {
    fn from(r: TmdbTvResult) -> Self {
        CatalogItem {
            catalog_id: r.id,
            name: r.name,
            // TMDB sends "" for unknown dates
            first_air_date: r.first_air_date.filter(|d| !d.is_empty()),
        }
    }
}

/// External ids of a TMDB series.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tvdb_id: Option<u64>,
}
