use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key/value storage shared by the session and the menu cache.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        let db = Database {
            conn: Mutex::new(conn),
        };
        db.initialize()?;

        Ok(db)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Database {
            conn: Mutex::new(conn),
        };
        db.initialize()?;

        Ok(db)
    }

    /// Opens `db_path` inside the app data directory. An absolute path is
    /// used as given.
    #[cfg(feature = "desktop")]
    pub fn for_app(app_handle: &tauri::AppHandle, db_path: &Path) -> Result<Self, String> {
        use tauri::Manager;

        let app_dir = app_handle
            .path()
            .app_data_dir()
            .map_err(|e| e.to_string())?;

        std::fs::create_dir_all(&app_dir).map_err(|e| e.to_string())?;

        Self::open(app_dir.join(db_path)).map_err(|e| e.to_string())
    }

    pub fn initialize(&self) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        conn.execute_batch(
            "
            -- Persistent client-side state (auth token, per-language menu cache)
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;

        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            rusqlite::params![key, value],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;

        Ok(())
    }
}

/// Volatile store, used when no database file is wanted.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store(store: &dyn KeyValueStore) {
        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap(), Some("abc".to_string()));

        store.set("token", "def").unwrap();
        assert_eq!(store.get("token").unwrap(), Some("def".to_string()));

        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);

        // Removing a missing key is not an error
        store.remove("token").unwrap();
    }

    #[test]
    fn test_memory_store_roundtrip() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let db = Database::open_in_memory().expect("Failed to create in-memory database");
        exercise_store(&db);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.set("menu_cache_en", "[]").unwrap();

        db.initialize().unwrap();

        assert_eq!(db.get("menu_cache_en").unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.db");

        {
            let db = Database::open(&path).unwrap();
            db.set("token", "persisted").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get("token").unwrap(), Some("persisted".to_string()));
    }
}
