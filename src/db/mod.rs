//! Durable key/value storage.
//!
//! Values are stored as JSON text under string keys in a single SQLite table,
//! mirroring the get/set semantics of browser local storage.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct Storage {
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Storage path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open storage at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("storage lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Raw text operations
    // ============================================================

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("storage lock poisoned");
        let value = conn
            .query_row("SELECT value FROM storage WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("storage lock poisoned");
        conn.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("storage lock poisoned");
        let rows = conn.execute("DELETE FROM storage WHERE key = ?", [key])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Typed operations
    // ============================================================

    /// Read and decode the value stored under `key`.
    ///
    /// Returns `default` when nothing is stored, when the stored text does not
    /// decode as `T`, or when the read itself fails.
    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!("Failed to read '{}', using default: {}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Stored value for '{}' is corrupt, using default: {}", key, e);
                default
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize value for '{}'", key))?;
        self.set_item(key, &json)
    }
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Location of the storage file in the platform data directory.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "techtracker")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("techtracker.db"))
}
