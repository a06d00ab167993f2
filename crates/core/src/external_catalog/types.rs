//! Types for external catalog API responses.

use serde::{Deserialize, Serialize};

/// A series listed by the catalog provider.
///
/// Fetched one page at a time and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Provider id (TMDB series id).
    pub catalog_id: u32,
    /// Display name, in the requested language.
    pub name: String,
    /// First air date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
}

impl CatalogItem {
    pub fn new(catalog_id: u32, name: impl Into<String>) -> Self {
        Self {
            catalog_id,
            name: name.into(),
            first_air_date: None,
        }
    }

    pub fn with_first_air_date(mut self, date: impl Into<String>) -> Self {
        self.first_air_date = Some(date.into());
        self
    }
}
