//! Jackett search backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::JackettConfig;
use crate::store::MediaType;

use super::{CandidateResult, SearchError, SearchRequest, Searcher};

/// Jackett's aggregate indexer, which fans the query out to every configured tracker.
const ALL_INDEXERS: &str = "all";

/// Jackett search backend implementation.
pub struct JackettSearcher {
    client: Client,
    config: JackettConfig,
}

impl JackettSearcher {
    /// Create a new JackettSearcher with the given configuration.
    pub fn new(config: JackettConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}",
            self.config.url.trim_end_matches('/'),
            ALL_INDEXERS,
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&request.query_text())
        );

        for cat_id in media_type_to_jackett_ids(request.media_type) {
            url.push_str(&format!("&Category[]={}", cat_id));
        }

        if let Some(imdb_id) = &request.external_id {
            url.push_str(&format!("&imdbid={}", urlencoding::encode(imdb_id)));
        }

        url
    }
}

#[async_trait]
impl Searcher for JackettSearcher {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateResult>, SearchError> {
        let start = Instant::now();
        let url = self.build_search_url(request);

        debug!(
            query = %request.query_text(),
            media_type = request.media_type.query_type(),
            "Searching Jackett"
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else if e.is_connect() {
                SearchError::ConnectionFailed(e.to_string())
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("Failed to parse response: {}", e)))?;

        debug!(
            results = jackett_response.Results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Jackett search complete"
        );

        Ok(jackett_response
            .Results
            .into_iter()
            .map(CandidateResult::from)
            .collect())
    }
}

impl From<JackettResult> for CandidateResult {
    fn from(r: JackettResult) -> Self {
        let magnet_uri = r
            .MagnetUri
            .filter(|m| !m.is_empty())
            .or_else(|| r.Link.filter(|l| l.starts_with("magnet:")));

        CandidateResult {
            title: r.Title,
            magnet_uri,
            source: r
                .Tracker
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "jackett".to_string()),
            size_bytes: r.Size.and_then(|s| u64::try_from(s).ok()),
            seeders: r.Seeders.map(|s| s.max(0) as u32),
        }
    }
}

/// Map our media types to Jackett category IDs.
fn media_type_to_jackett_ids(media_type: MediaType) -> Vec<i32> {
    match media_type {
        MediaType::Series => vec![5000], // TV
        MediaType::Movie => vec![2000],  // Movies
    }
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    #[serde(default)]
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    MagnetUri: Option<String>,
    Link: Option<String>,
    Tracker: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i32>,
}
