//! Device-local key-value backend.
//!
//! # Invariants
//! - `set_items` commits every pair in one SQLite transaction.
//! - Missing keys read as `None`, never as an empty string.

use crate::db::DbResult;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// String key-value storage with atomic multi-key writes.
pub trait KvStore {
    fn get_item(&self, key: &str) -> DbResult<Option<String>>;
    fn set_items(&mut self, items: &[(&str, String)]) -> DbResult<()>;
}

/// SQLite-backed key-value store over the `kv_items` table.
///
/// Expects a connection returned by `open_db` / `open_db_in_memory`.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrowed access for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvStore for SqliteKvStore {
    fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_items WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_items(&mut self, items: &[(&str, String)]) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in items {
            tx.execute(
                "INSERT INTO kv_items (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
        }
        tx.commit()?;
        debug!(
            "event=kv_write module=store status=ok key_count={}",
            items.len()
        );
        Ok(())
    }
}
