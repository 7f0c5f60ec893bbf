//! Backend selection for the timestamp store.

use std::path::Path;
use tabsweep_domain::traits::TimestampStore;
use tabsweep_domain::{Settings, TimestampMap};
use tabsweep_store::{JsonFileStore, SqliteStore, StoreError};

/// The store picked from the configured database path.
pub enum AppStore {
    /// SQLite database
    Sqlite(SqliteStore),
    /// `tabTimestamps` JSON document
    Json(JsonFileStore),
}

impl AppStore {
    /// Open the backend implied by the file extension.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            tracing::debug!("Using JSON store at {}", path.display());
            Ok(Self::Json(JsonFileStore::new(path)))
        } else {
            tracing::debug!("Using SQLite store at {}", path.display());
            Ok(Self::Sqlite(SqliteStore::new(path)?))
        }
    }
}

impl TimestampStore for AppStore {
    type Error = StoreError;

    fn load(&self) -> Result<(TimestampMap, Settings), StoreError> {
        match self {
            Self::Sqlite(store) => store.load(),
            Self::Json(store) => store.load(),
        }
    }

    fn save(&mut self, timestamps: &TimestampMap) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(store) => store.save(timestamps),
            Self::Json(store) => store.save(timestamps),
        }
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(store) => store.save_settings(settings),
            Self::Json(store) => store.save_settings(settings),
        }
    }
}
