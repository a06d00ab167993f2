//! Types for the torrent store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of content a stored torrent belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Series,
    Movie,
}

impl MediaType {
    /// Value stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Series => "series",
            MediaType::Movie => "movie",
        }
    }

    /// Value the search aggregator expects for this kind of content.
    pub fn query_type(&self) -> &'static str {
        match self {
            MediaType::Series => "tv",
            MediaType::Movie => "movie",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown media type: {0}")]
pub struct UnknownMediaType(pub String);

impl FromStr for MediaType {
    type Err = UnknownMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "series" => Ok(MediaType::Series),
            "movie" => Ok(MediaType::Movie),
            other => Err(UnknownMediaType(other.to_string())),
        }
    }
}

/// A persisted torrent, keyed by info hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TorrentRecord {
    /// Info hash (40 lowercase hex characters).
    pub info_hash: String,
    /// Source the torrent was found on.
    pub provider: String,
    /// Release title.
    pub title: String,
    /// Size in bytes (0 when unknown).
    pub size: u64,
    /// Content kind.
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Highest seeder count observed.
    pub seeders: u32,
    /// IMDB title id (e.g. "tt0903747").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// TMDB id of the series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    /// When the torrent was first seen. Never updated after insert.
    pub upload_date: DateTime<Utc>,
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreStats {
    /// Total stored torrents.
    pub total_count: u64,
    /// Torrents of type `series`.
    pub series_count: u64,
    /// Sum of seeders across all torrents.
    pub total_seeders: u64,
}

/// Errors for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection pool is closed")]
    PoolClosed,

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_round_trip_through_str() {
        assert_eq!("series".parse::<MediaType>().unwrap(), MediaType::Series);
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert!("anime".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_media_type_query_type() {
        assert_eq!(MediaType::Series.query_type(), "tv");
        assert_eq!(MediaType::Movie.query_type(), "movie");
    }

    #[test]
    fn test_record_serializes_type_field() {
        let record = TorrentRecord {
            info_hash: "a".repeat(40),
            provider: "Knaben".to_string(),
            title: "Show S01 1080p".to_string(),
            size: 0,
            media_type: MediaType::Series,
            seeders: 3,
            imdb_id: None,
            tmdb_id: Some(1396),
            upload_date: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "series");
        assert_eq!(json["tmdb_id"], 1396);
        assert!(json.get("imdb_id").is_none());
    }
}
