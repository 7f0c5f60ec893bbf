//! tabsweep Storage Layer
//!
//! Implements the TimestampStore trait. Three backends share one contract:
//! the whole timestamp map is replaced on every save, and a failed save
//! leaves the previously persisted value intact.
//!
//! # Backends
//!
//! - [`SqliteStore`]: SQLite tables, whole-map replace inside one transaction
//! - [`JsonFileStore`]: the `tabTimestamps` / `settings.maxAgeDays` JSON
//!   document, written to a temp file and atomically renamed into place
//! - [`MemoryStore`]: in-process, with failure injection for tests
//!
//! # Examples
//!
//! ```no_run
//! use tabsweep_domain::traits::TimestampStore;
//! use tabsweep_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! let (timestamps, settings) = store.load().unwrap();
//! assert!(timestamps.is_empty());
//! assert_eq!(settings.max_age_days(), 7.0);
//! ```

#![warn(missing_docs)]

mod json;
mod memory;

pub use json::{JsonFileStore, PersistedSettings, PersistedState};
pub use memory::MemoryStore;

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tabsweep_domain::traits::TimestampStore;
use tabsweep_domain::{ResourceId, Settings, TimestampMap};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Backend refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

const MAX_AGE_DAYS_KEY: &str = "maxAgeDays";

/// Validate a stored TTL, falling back to the default
pub(crate) fn settings_or_default(max_age_days: Option<f64>) -> Settings {
    match max_age_days {
        None => Settings::default(),
        Some(days) => Settings::new(days).unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored max age ({}), using default", e);
            Settings::default()
        }),
    }
}

/// SQLite-based implementation of TimestampStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a SqliteStore by moving it
/// into the janitor's service, which serializes all access.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn load_max_age_days(&self) -> Result<Option<f64>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![MAX_AGE_DAYS_KEY],
                |row| row.get::<_, f64>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl TimestampStore for SqliteStore {
    type Error = StoreError;

    fn load(&self) -> Result<(TimestampMap, Settings), Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT tab_id, last_active_ms FROM tab_timestamps")?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let last_active: i64 = row.get(1)?;
                Ok((id, last_active))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut timestamps = TimestampMap::with_capacity(rows.len());
        for (id, last_active) in rows {
            let last_active = u64::try_from(last_active).map_err(|_| {
                StoreError::InvalidData(format!(
                    "Negative timestamp {} for tab {}",
                    last_active, id
                ))
            })?;
            timestamps.insert(ResourceId::new(id), last_active);
        }

        let settings = settings_or_default(self.load_max_age_days()?);
        Ok((timestamps, settings))
    }

    fn save(&mut self, timestamps: &TimestampMap) -> Result<(), Self::Error> {
        // Dropping the transaction without commit rolls back.
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM tab_timestamps", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO tab_timestamps (tab_id, last_active_ms) VALUES (?1, ?2)",
            )?;
            for (id, last_active) in timestamps {
                let last_active = i64::try_from(*last_active).map_err(|_| {
                    StoreError::InvalidData(format!("Timestamp out of range for tab {}", id))
                })?;
                insert.execute(params![id.as_str(), last_active])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![MAX_AGE_DAYS_KEY, settings.max_age_days()],
        )?;
        Ok(())
    }
}
