use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

const UPSERT: &str = "INSERT INTO entries (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Durable string entries, the desktop stand-in for browser storage.
///
/// Backed by a single-table SQLite file. The default location is the
/// user's data directory:
/// - Linux: ~/.local/share/shipyard-admin/session.db
/// - macOS: ~/Library/Application Support/shipyard-admin/session.db
/// - Windows: %APPDATA%\shipyard-admin\session.db
pub struct Storage {
    conn: Connection,
    db_path: PathBuf,
}

impl Storage {
    /// Open (or create) the storage file and make sure the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let db_path = path.into();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&db_path)?;
        let storage = Storage { conn, db_path };
        storage.init_schema()?;

        tracing::info!(path = %storage.path().display(), "storage opened");
        Ok(storage)
    }

    /// In-memory storage, nothing survives the process
    pub fn in_memory() -> Result<Self, StorageError> {
        let storage = Storage {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    #[cfg(test)]
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(UPSERT, [key, value])?;
        Ok(())
    }

    /// Write several entries in one transaction: all of them or none
    pub fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for &(key, value) in entries {
            tx.execute(UPSERT, [key, value])?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("db_path", &self.db_path)
            .finish()
    }
}
