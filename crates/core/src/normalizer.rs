//! Turns untrusted search candidates into storable torrent records.
//!
//! Everything here is pure: no I/O, no clock, no shared state.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::searcher::CandidateResult;
use crate::store::{MediaType, TorrentRecord};

/// Exactly 40 hex digits after `xt=urn:btih:`, not followed by another alphanumeric.
static BTIH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)xt=urn:btih:([0-9a-f]{40})(?:[^0-9a-z]|$)").unwrap()
});

/// Per-item values stamped onto every record derived from one catalog item.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub external_id: Option<String>,
    pub catalog_id: Option<u32>,
    pub media_type: MediaType,
    pub observed_at: DateTime<Utc>,
}

/// Extract the lowercase info hash from a magnet locator.
pub fn extract_info_hash(locator: &str) -> Option<String> {
    BTIH_RE
        .captures(locator)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Build a record from a candidate, or `None` if it has no usable hash.
pub fn normalize(candidate: &CandidateResult, ctx: &NormalizeContext) -> Option<TorrentRecord> {
    let locator = candidate.magnet_uri.as_deref()?;
    let info_hash = extract_info_hash(locator)?;

    Some(TorrentRecord {
        info_hash,
        provider: candidate.source.clone(),
        title: candidate.title.clone(),
        size: candidate.size_bytes.unwrap_or(0),
        media_type: ctx.media_type,
        seeders: candidate.seeders.unwrap_or(0),
        imdb_id: ctx.external_id.clone(),
        tmdb_id: ctx.catalog_id,
        upload_date: ctx.observed_at,
    })
}

/// Year part of a `YYYY-MM-DD` date, or an empty string.
pub fn release_year(first_air_date: Option<&str>) -> String {
    first_air_date
        .and_then(|d| d.get(..4))
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .unwrap_or_default()
}
