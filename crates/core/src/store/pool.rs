//! SQLite connection pool.
//!
//! A thin owner around an `r2d2` pool of rusqlite connections. It is created
//! explicitly at startup and handed to the store. A checked-out
//! [`PooledConnection`] goes back to the pool when dropped, whatever path the
//! caller took (commit, rollback, early return).

use std::path::Path;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use super::StoreError;

/// A connection checked out of a [`DatabasePool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long `acquire` waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded SQLite connection pool.
///
/// Every connection is opened up front and kept until [`shutdown`], so a
/// shared-cache in-memory database lives as long as the pool does.
///
/// [`shutdown`]: DatabasePool::shutdown
pub struct DatabasePool {
    inner: RwLock<Option<Pool<SqliteConnectionManager>>>,
    max_connections: usize,
}

impl DatabasePool {
    /// Open a pool backed by a database file, creating it if needed.
    pub fn open(path: &Path, max_connections: usize) -> Result<Self, StoreError> {
        // Fail fast on a bad path, and switch the file to WAL once; the
        // journal mode sticks to the database file.
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(|e| StoreError::Database(e.to_string()))?;
        drop(conn);

        let pool = Self::build(SqliteConnectionManager::file(path), max_connections)?;
        info!(path = %path.display(), max_connections = pool.max_connections, "Database pool opened");
        Ok(pool)
    }

    /// Open a pool backed by a private in-memory database (useful for testing).
    pub fn in_memory(max_connections: usize) -> Result<Self, StoreError> {
        let uri = format!(
            "file:trawler-{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4().simple()
        );
        let manager = SqliteConnectionManager::file(uri).with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        );
        Self::build(manager, max_connections)
    }

    fn build(
        manager: SqliteConnectionManager,
        max_connections: usize,
    ) -> Result<Self, StoreError> {
        let max_connections = max_connections.max(1);
        let manager = manager.with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));

        let pool = Pool::builder()
            .max_size(u32::try_from(max_connections).unwrap_or(u32::MAX))
            .connection_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        Ok(Self {
            inner: RwLock::new(Some(pool)),
            max_connections,
        })
    }

    /// Maximum number of simultaneously open connections.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Number of currently open connections (idle or checked out).
    pub fn open_connections(&self) -> usize {
        self.with_pool(|pool| pool.state().connections as usize)
    }

    /// Number of connections waiting in the pool.
    pub fn idle_connections(&self) -> usize {
        self.with_pool(|pool| pool.state().idle_connections as usize)
    }

    /// Check out a connection, waiting for one to be returned if the pool is
    /// at capacity.
    pub fn acquire(&self) -> Result<PooledConnection, StoreError> {
        let pool = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StoreError::PoolClosed)?;

        pool.get().map_err(|e| StoreError::Pool(e.to_string()))
    }

    /// Close the pool. Idle connections close now, checked-out ones when they
    /// are returned. Later `acquire` calls fail with `PoolClosed`.
    pub fn shutdown(&self) {
        let pool = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(pool) = pool {
            let state = pool.state();
            info!(
                idle = state.idle_connections,
                in_use = state.connections - state.idle_connections,
                "Database pool shut down"
            );
        }
    }

    fn with_pool(&self, f: impl FnOnce(&Pool<SqliteConnectionManager>) -> usize) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, f)
    }
}
