//! Mock series catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::external_catalog::{CatalogItem, ExternalCatalogError, SeriesCatalog};

/// Mock implementation of the SeriesCatalog trait.
///
/// Pages and IMDB ids are configured up front; unknown pages come back empty
/// and unknown series have no IMDB id. Every call is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use trawler_core::testing::{MockSeriesCatalog, fixtures};
///
/// let catalog = MockSeriesCatalog::new();
/// catalog.set_page(1, vec![fixtures::catalog_item(1396, "Breaking Bad")]).await;
/// catalog.add_external_id(1396, "tt0903747").await;
///
/// let items = catalog.list_popular("it-IT", 1).await?;
/// assert_eq!(catalog.page_requests().await, vec![1]);
/// ```
#[derive(Debug)]
pub struct MockSeriesCatalog {
    /// Popular series by page number.
    pages: Arc<RwLock<HashMap<u32, Vec<CatalogItem>>>>,
    /// IMDB ids by catalog id.
    external_ids: Arc<RwLock<HashMap<u32, String>>>,
    /// Pages requested, in order.
    page_requests: Arc<RwLock<Vec<u32>>>,
    /// Catalog ids resolved, in order.
    resolve_calls: Arc<RwLock<Vec<u32>>>,
    /// Number of upcoming page fetches that fail with a 503.
    page_failures: Arc<RwLock<u32>>,
    /// If set, the next page fetch fails with this error.
    next_page_error: Arc<RwLock<Option<ExternalCatalogError>>>,
    /// If set, the next id lookup fails with this error.
    next_resolve_error: Arc<RwLock<Option<ExternalCatalogError>>>,
}

impl Default for MockSeriesCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSeriesCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            external_ids: Arc::new(RwLock::new(HashMap::new())),
            page_requests: Arc::new(RwLock::new(Vec::new())),
            resolve_calls: Arc::new(RwLock::new(Vec::new())),
            page_failures: Arc::new(RwLock::new(0)),
            next_page_error: Arc::new(RwLock::new(None)),
            next_resolve_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the items returned for a page.
    pub async fn set_page(&self, page: u32, items: Vec<CatalogItem>) {
        self.pages.write().await.insert(page, items);
    }

    /// Give a series an IMDB id.
    pub async fn add_external_id(&self, catalog_id: u32, imdb_id: &str) {
        self.external_ids
            .write()
            .await
            .insert(catalog_id, imdb_id.to_string());
    }

    /// Make the next `count` page fetches fail.
    pub async fn fail_next_pages(&self, count: u32) {
        *self.page_failures.write().await = count;
    }

    /// Configure the next page fetch to fail with the given error.
    pub async fn set_next_page_error(&self, error: ExternalCatalogError) {
        *self.next_page_error.write().await = Some(error);
    }

    /// Configure the next id lookup to fail with the given error.
    pub async fn set_next_resolve_error(&self, error: ExternalCatalogError) {
        *self.next_resolve_error.write().await = Some(error);
    }

    /// Pages requested so far, in order.
    pub async fn page_requests(&self) -> Vec<u32> {
        self.page_requests.read().await.clone()
    }

    /// Catalog ids resolved so far, in order.
    pub async fn resolve_calls(&self) -> Vec<u32> {
        self.resolve_calls.read().await.clone()
    }
}

#[async_trait]
impl SeriesCatalog for MockSeriesCatalog {
    async fn list_popular(
        &self,
        _language: &str,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ExternalCatalogError> {
        self.page_requests.write().await.push(page);

        if let Some(err) = self.next_page_error.write().await.take() {
            return Err(err);
        }

        {
            let mut failures = self.page_failures.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(ExternalCatalogError::ApiError {
                    status: 503,
                    message: "mock outage".to_string(),
                });
            }
        }

        Ok(self
            .pages
            .read()
            .await
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn resolve_external_id(
        &self,
        catalog_id: u32,
    ) -> Result<Option<String>, ExternalCatalogError> {
        self.resolve_calls.write().await.push(catalog_id);

        if let Some(err) = self.next_resolve_error.write().await.take() {
            return Err(err);
        }

        Ok(self.external_ids.read().await.get(&catalog_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::catalog_item;

    #[tokio::test]
    async fn test_pages_and_ids() {
        let catalog = MockSeriesCatalog::new();
        catalog.set_page(2, vec![catalog_item(5, "Five")]).await;
        catalog.add_external_id(5, "tt5").await;

        assert!(catalog.list_popular("it-IT", 1).await.unwrap().is_empty());
        assert_eq!(catalog.list_popular("it-IT", 2).await.unwrap().len(), 1);
        assert_eq!(
            catalog.resolve_external_id(5).await.unwrap().as_deref(),
            Some("tt5")
        );
        assert_eq!(catalog.resolve_external_id(6).await.unwrap(), None);
        assert_eq!(catalog.page_requests().await, vec![1, 2]);
        assert_eq!(catalog.resolve_calls().await, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_fail_next_pages() {
        let catalog = MockSeriesCatalog::new();
        catalog.fail_next_pages(2).await;

        assert!(catalog.list_popular("it-IT", 1).await.is_err());
        assert!(catalog.list_popular("it-IT", 1).await.is_err());
        assert!(catalog.list_popular("it-IT", 1).await.is_ok());
    }
}
