//! Per-item processing: resolve, search, normalize, persist.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::external_catalog::{CatalogItem, SeriesCatalog};
use crate::metrics;
use crate::normalizer::{self, NormalizeContext};
use crate::searcher::{SearchRequest, Searcher};
use crate::store::{MediaType, TorrentRecord, TorrentStore};

use super::types::{ProcessError, ProcessOutcome};

/// Turns one catalog item into stored torrent records.
///
/// Holds only shared handles to its collaborators, so one instance can serve
/// every job the scheduler runs.
pub struct ItemProcessor {
    catalog: Arc<dyn SeriesCatalog>,
    searcher: Arc<dyn Searcher>,
    store: Arc<dyn TorrentStore>,
}

impl ItemProcessor {
    pub fn new(
        catalog: Arc<dyn SeriesCatalog>,
        searcher: Arc<dyn Searcher>,
        store: Arc<dyn TorrentStore>,
    ) -> Self {
        Self {
            catalog,
            searcher,
            store,
        }
    }

    /// Process a single catalog item.
    pub async fn process(&self, item: &CatalogItem) -> Result<ProcessOutcome, ProcessError> {
        let result = self.process_inner(item).await;
        if let Ok(outcome) = &result {
            metrics::ITEMS_PROCESSED
                .with_label_values(&[outcome.label()])
                .inc();
        }
        result
    }

    async fn process_inner(&self, item: &CatalogItem) -> Result<ProcessOutcome, ProcessError> {
        let external_id = match self.catalog.resolve_external_id(item.catalog_id).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!(series = %item.name, tmdb_id = item.catalog_id, "No IMDB id, skipping");
                return Ok(ProcessOutcome::NoExternalId);
            }
            Err(e) => {
                debug!(
                    series = %item.name,
                    tmdb_id = item.catalog_id,
                    error = %e,
                    "External id lookup failed, skipping"
                );
                return Ok(ProcessOutcome::NoExternalId);
            }
        };

        let year = normalizer::release_year(item.first_air_date.as_deref());
        let request = SearchRequest::series(&item.name, year, Some(external_id.clone()));
        let candidates = self.searcher.search(&request).await?;

        if candidates.is_empty() {
            debug!(series = %item.name, "No search results");
            return Ok(ProcessOutcome::NoResults);
        }

        let ctx = NormalizeContext {
            external_id: Some(external_id),
            catalog_id: Some(item.catalog_id),
            media_type: MediaType::Series,
            observed_at: Utc::now(),
        };
        let records: Vec<TorrentRecord> = candidates
            .iter()
            .filter_map(|c| normalizer::normalize(c, &ctx))
            .collect();

        if records.is_empty() {
            debug!(
                series = %item.name,
                candidates = candidates.len(),
                "No candidate had a usable info hash"
            );
            return Ok(ProcessOutcome::NothingToStore);
        }

        let stored = self.upsert(records).await?;
        metrics::RECORDS_UPSERTED.inc_by(stored as u64);

        info!(
            series = %item.name,
            candidates = candidates.len(),
            stored = stored,
            "Stored torrents"
        );

        Ok(ProcessOutcome::Stored {
            candidates: candidates.len(),
            stored,
        })
    }

    /// Run the blocking batch upsert off the async runtime.
    async fn upsert(&self, records: Vec<TorrentRecord>) -> Result<usize, ProcessError> {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || store.batch_upsert(&records))
            .await
            .map_err(|e| ProcessError::Internal(format!("upsert task failed: {}", e)))?;

        // Logged once, by the scheduler, as the job's failure.
        result.map_err(|e| {
            metrics::STORE_FAILURES.inc();
            ProcessError::Store(e)
        })
    }
}
