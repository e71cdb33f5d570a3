//! Persistent key/value storage for the emergency contact.
//!
//! Only one value is ever stored, under [`CONTACT_KEY`], but the contract is a
//! plain key/value store so platform stores can back it directly.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::StorageError;

/// Key under which the emergency contact is stored.
pub const CONTACT_KEY: &str = "emergencyContact";

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// SQLite-backed store (`safezone.db` in the data directory).
pub struct SqliteContactStore {
    conn: Mutex<Connection>,
}

impl SqliteContactStore {
    /// Open the store in the default data directory.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::DataDir(e.to_string()))?;
        Self::open_at(&dir.join("safezone.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests and throwaway sessions).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::QueryFailed("connection mutex poisoned".into()))?;
        Ok(f(&conn)?)
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
            let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
            match result {
                Ok(v) => Ok(Some(v)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.kv_get(key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.kv_set(key, value)
    }
}
