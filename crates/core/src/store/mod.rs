//! Torrent store - the durable, deduplicated set of discovered torrents.
//!
//! Rows are keyed by info hash and only ever change through the merge-upsert
//! in [`TorrentStore::batch_upsert`].

mod pool;
mod sqlite;
mod types;

pub use pool::{DatabasePool, PooledConnection};
pub use sqlite::SqliteTorrentStore;
pub use types::*;

/// Trait for torrent storage.
pub trait TorrentStore: Send + Sync {
    /// Insert or merge a batch of records in a single transaction.
    ///
    /// Records whose info hash is not 40 hex characters are skipped before
    /// the transaction opens. On conflict each column merges independently:
    /// seeders keep the maximum, external ids keep the first known value,
    /// size only fills a zero size, upload date never changes. Either the
    /// whole batch commits or nothing does.
    ///
    /// Returns the number of records written.
    fn batch_upsert(&self, records: &[TorrentRecord]) -> Result<usize, StoreError>;

    /// Most recently discovered series torrents, newest first, then by seeders.
    fn latest(&self, limit: u32) -> Result<Vec<TorrentRecord>, StoreError>;

    /// Aggregate counts.
    fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Get a specific torrent by info hash.
    fn get(&self, info_hash: &str) -> Result<Option<TorrentRecord>, StoreError>;
}
