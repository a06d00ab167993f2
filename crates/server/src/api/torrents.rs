//! Stored torrent API handlers.
//!
//! Read-only: the crawl loop is the only writer.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use trawler_core::{StoreError, StoreStats, TorrentRecord};

use crate::state::AppState;

/// Records returned by the combined dashboard endpoint.
const DATA_LIMIT: u32 = 200;
const MAX_LIMIT: u32 = 1000;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TorrentQueryParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

#[derive(Debug, Serialize)]
pub struct TorrentListResponse {
    pub torrents: Vec<TorrentRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub torrents: Vec<TorrentRecord>,
    pub stats: StoreStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: StoreError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/data
///
/// Latest series torrents plus aggregate stats, in one response.
pub async fn get_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    let store = state.store();

    let torrents = store.latest(DATA_LIMIT).map_err(internal_error)?;
    let stats = store.stats().map_err(internal_error)?;

    Ok(Json(DataResponse { torrents, stats }))
}

/// GET /api/v1/torrents
///
/// Latest series torrents, newest first.
pub async fn list_torrents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TorrentQueryParams>,
) -> Result<Json<TorrentListResponse>, impl IntoResponse> {
    let limit = params.limit.min(MAX_LIMIT);

    match state.store().latest(limit) {
        Ok(torrents) => {
            let total = torrents.len();
            Ok(Json(TorrentListResponse { torrents, total }))
        }
        Err(e) => Err(internal_error(e)),
    }
}

/// GET /api/v1/torrents/{hash}
///
/// Get a specific torrent by info hash.
pub async fn get_torrent(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<TorrentRecord>, impl IntoResponse> {
    match state.store().get(&hash) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Torrent not found: {}", hash),
            }),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// GET /api/v1/stats
///
/// Aggregate counts over the stored torrents.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StoreStats>, ApiError> {
    state.store().stats().map(Json).map_err(internal_error)
}
