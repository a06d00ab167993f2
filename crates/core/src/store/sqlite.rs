//! SQLite-backed torrent store implementation.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::pool::DatabasePool;
use super::{MediaType, StoreError, StoreStats, TorrentRecord, TorrentStore};

/// Insert, or merge column by column into the existing row.
///
/// - seeders: highest observation wins
/// - imdb_id / tmdb_id: first known value wins, never nulled
/// - size: only fills a zero or missing size
/// - provider, title, type, upload_date: untouched after first insert
const UPSERT_SQL: &str = "
    INSERT INTO torrents (info_hash, provider, title, size, type, seeders, imdb_id, tmdb_id, upload_date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(info_hash) DO UPDATE SET
        seeders = MAX(excluded.seeders, torrents.seeders),
        imdb_id = COALESCE(torrents.imdb_id, excluded.imdb_id),
        tmdb_id = COALESCE(torrents.tmdb_id, excluded.tmdb_id),
        size = CASE
            WHEN torrents.size = 0 OR torrents.size IS NULL THEN excluded.size
            ELSE torrents.size
        END";

const SELECT_COLUMNS: &str =
    "info_hash, provider, title, size, type, seeders, imdb_id, tmdb_id, upload_date";

/// SQLite-backed torrent store.
pub struct SqliteTorrentStore {
    pool: Arc<DatabasePool>,
}

impl SqliteTorrentStore {
    /// Create a store on top of an existing pool, creating tables if needed.
    pub fn new(pool: Arc<DatabasePool>) -> Result<Self, StoreError> {
        {
            let conn = pool.acquire()?;
            Self::initialize_schema(&conn)?;
        }
        Ok(Self { pool })
    }

    /// Create a store over a fresh in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(Arc::new(DatabasePool::in_memory(4)?))
    }

    /// The pool this store draws connections from.
    pub fn pool(&self) -> &Arc<DatabasePool> {
        &self.pool
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per unique info_hash
            CREATE TABLE IF NOT EXISTS torrents (
                info_hash TEXT PRIMARY KEY CHECK (length(info_hash) = 40),
                provider TEXT,
                title TEXT,
                size INTEGER DEFAULT 0 CHECK (size >= 0),
                type TEXT NOT NULL,
                seeders INTEGER NOT NULL DEFAULT 0 CHECK (seeders >= 0),
                imdb_id TEXT,
                tmdb_id INTEGER,
                upload_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_torrents_type_upload ON torrents(type, upload_date);
            CREATE INDEX IF NOT EXISTS idx_torrents_imdb ON torrents(imdb_id);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<TorrentRecord> {
        let size: Option<i64> = row.get(3)?;
        let type_str: String = row.get(4)?;
        let media_type = type_str.parse::<MediaType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let seeders: i64 = row.get(5)?;
        let upload_date_str: String = row.get(8)?;
        let upload_date = DateTime::parse_from_rfc3339(&upload_date_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(TorrentRecord {
            info_hash: row.get(0)?,
            provider: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            size: size.unwrap_or(0).max(0) as u64,
            media_type,
            seeders: seeders.clamp(0, u32::MAX as i64) as u32,
            imdb_id: row.get(6)?,
            tmdb_id: row.get(7)?,
            upload_date,
        })
    }
}

/// 40 hex characters, either case.
fn is_info_hash(value: &str) -> bool {
    value.len() == 40 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Timestamps are stored in one fixed-width UTC format so that text ordering
/// matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl TorrentStore for SqliteTorrentStore {
    fn batch_upsert(&self, records: &[TorrentRecord]) -> Result<usize, StoreError> {
        // Records without a usable key are dropped here, before the
        // transaction, so they can never abort the batch.
        let valid: Vec<&TorrentRecord> = records
            .iter()
            .filter(|r| is_info_hash(&r.info_hash))
            .collect();

        if valid.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.acquire()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        // Any error drops `tx` uncommitted, which rolls the batch back.
        let written = {
            let mut stmt = tx
                .prepare_cached(UPSERT_SQL)
                .map_err(|e| StoreError::Database(e.to_string()))?;

            for record in &valid {
                stmt.execute(params![
                    record.info_hash.to_lowercase(),
                    &record.provider,
                    &record.title,
                    record.size as i64,
                    record.media_type.as_str(),
                    record.seeders as i64,
                    &record.imdb_id,
                    record.tmdb_id,
                    format_timestamp(&record.upload_date),
                ])
                .map_err(|e| {
                    StoreError::Database(format!("upsert of {} failed: {}", record.info_hash, e))
                })?;
            }
            valid.len()
        };

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(
            received = records.len(),
            written = written,
            "Batch upsert committed"
        );
        Ok(written)
    }

    fn latest(&self, limit: u32) -> Result<Vec<TorrentRecord>, StoreError> {
        let conn = self.pool.acquire()?;

        let mut stmt = conn
            .prepare_cached(&format!(
                "SELECT {SELECT_COLUMNS} FROM torrents
                 WHERE type = ?1
                 ORDER BY upload_date DESC, seeders DESC
                 LIMIT ?2"
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![MediaType::Series.as_str(), limit as i64],
                Self::row_to_record,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(records)
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.pool.acquire()?;

        let (total_count, series_count, total_seeders): (i64, i64, i64) = conn
            .query_row(
                "SELECT
                    (SELECT COUNT(*) FROM torrents),
                    (SELECT COUNT(*) FROM torrents WHERE type = ?1),
                    (SELECT COALESCE(SUM(seeders), 0) FROM torrents)",
                params![MediaType::Series.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(StoreStats {
            total_count: total_count as u64,
            series_count: series_count as u64,
            total_seeders: total_seeders as u64,
        })
    }

    fn get(&self, info_hash: &str) -> Result<Option<TorrentRecord>, StoreError> {
        let conn = self.pool.acquire()?;
        let info_hash = info_hash.to_lowercase();

        conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM torrents WHERE info_hash = ?1"),
            params![&info_hash],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}
