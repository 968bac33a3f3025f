use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::{FlagStore, StoreError};
use crate::app_dirs::AppDirs;

/// Flags kept in a single SQLite table keyed by flag name.
#[derive(Debug)]
pub struct SqliteFlagStore {
    conn: Connection,
}

impl SqliteFlagStore {
    /// Open (or create) the database under the state directory
    pub fn new() -> Result<Self, StoreError> {
        let db_path =
            AppDirs::flags_db_path().unwrap_or_else(|| PathBuf::from("bannerpop_flags.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS shown_flags (
                key TEXT PRIMARY KEY,
                value BOOLEAN NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl FlagStore for SqliteFlagStore {
    fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM shown_flags WHERE key = ?1",
                [key],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO shown_flags (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM shown_flags WHERE key = ?1", [key])?;
        Ok(())
    }
}
