//! SQLite-backed key-value store
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::KvStore;
use crate::error::{KvError, KvResult};

/// Hash store in a single SQLite table
#[derive(Clone)]
pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKvStore {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: &Path) -> KvResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!("Failed to create key-value store directory: {}", e);
                }
            }
        }

        let conn = Connection::open(path)?;
        log::info!("Opened key-value database: {}", path.display());
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> KvResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> KvResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> KvResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| KvError::Poisoned)
    }
}

/// Create the hash table if it doesn't exist
///
/// Composite primary key `(hash_key, field)`: one value per field per hash.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_hash (
            hash_key TEXT NOT NULL,
            field TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (hash_key, field)
        );
        ",
    )
}

#[async_trait]
impl KvStore for SqliteKvStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn hlen(&self, key: &str) -> KvResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv_hash WHERE hash_key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn hget(&self, key: &str, field: &str) -> KvResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_hash WHERE hash_key = ?1 AND field = ?2",
                params![key, field],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn hgetall(&self, key: &str) -> KvResult<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT field, value FROM kv_hash WHERE hash_key = ?1 ORDER BY field",
        )?;
        let rows = stmt.query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let pairs = rows.collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(pairs)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> KvResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_hash (hash_key, field, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))",
            params![key, field, value],
        )?;
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> KvResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM kv_hash WHERE hash_key = ?1 AND field = ?2",
            params![key, field],
        )?;
        Ok(removed > 0)
    }

    async fn del(&self, key: &str) -> KvResult<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM kv_hash WHERE hash_key = ?1", params![key])?;
        log::debug!("Deleted hash {} ({} fields)", key, removed);
        Ok(())
    }
}
