//! JSON document store
//!
//! Persists the state document
//!
//! ```json
//! { "tabTimestamps": { "12": 1700000000000 }, "settings": { "maxAgeDays": 7 } }
//! ```

use crate::{settings_or_default, StoreError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tabsweep_domain::traits::TimestampStore;
use tabsweep_domain::{ResourceId, Settings, TimestampMap};
use tempfile::NamedTempFile;

/// On-disk state document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Tab id → last-active epoch millis
    #[serde(default)]
    pub tab_timestamps: BTreeMap<String, u64>,

    /// Settings record
    #[serde(default)]
    pub settings: PersistedSettings,
}

/// On-disk settings record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSettings {
    /// TTL in days; `None` when the stored value is not a number
    #[serde(
        default = "default_max_age_days",
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_age_days: Option<f64>,
}

fn default_max_age_days() -> Option<f64> {
    Some(Settings::DEFAULT_MAX_AGE_DAYS)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = value.as_f64();
    if number.is_none() {
        tracing::warn!("Ignoring non-numeric stored max age ({}), using default", value);
    }
    Ok(number)
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
        }
    }
}

/// TimestampStore backed by a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use `path` as the state file; it is created on first save
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw document, or the default one if the file does not exist
    pub fn read_state(&self) -> Result<PersistedState, StoreError> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Atomically replace the document
    fn write_state(&self, state: &PersistedState) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, state)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl TimestampStore for JsonFileStore {
    type Error = StoreError;

    fn load(&self) -> Result<(TimestampMap, Settings), Self::Error> {
        let state = self.read_state()?;
        let timestamps = state
            .tab_timestamps
            .into_iter()
            .map(|(id, ts)| (ResourceId::new(id), ts))
            .collect();
        let settings = settings_or_default(state.settings.max_age_days);
        Ok((timestamps, settings))
    }

    fn save(&mut self, timestamps: &TimestampMap) -> Result<(), Self::Error> {
        let mut state = self.read_state()?;
        state.tab_timestamps = timestamps
            .iter()
            .map(|(id, ts)| (id.as_str().to_string(), *ts))
            .collect();
        self.write_state(&state)
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        let mut state = self.read_state()?;
        state.settings.max_age_days = Some(settings.max_age_days());
        self.write_state(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let (timestamps, settings) = store.load().unwrap();
        assert!(timestamps.is_empty());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_document_uses_stable_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = JsonFileStore::new(&path);

        let mut timestamps = TimestampMap::new();
        timestamps.insert(ResourceId::new("12"), 1_700_000_000_000);
        store.save(&timestamps).unwrap();
        store.save_settings(&Settings::new(2.5).unwrap()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["tabTimestamps"]["12"], 1_700_000_000_000u64);
        assert_eq!(raw["settings"]["maxAgeDays"], 2.5);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"tabTimestamps": {"3": 99}}"#).unwrap();

        let (timestamps, settings) = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(timestamps.get(&ResourceId::new("3")), Some(&99));
        assert_eq!(settings.max_age_days(), 7.0);
    }

    #[test]
    fn test_invalid_stored_ttl_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"settings": {"maxAgeDays": -4}}"#).unwrap();

        let (_, settings) = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_non_numeric_stored_ttl_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        for raw in [r#""7""#, "null", "[]"] {
            fs::write(
                &path,
                format!(r#"{{"tabTimestamps": {{"1": 5}}, "settings": {{"maxAgeDays": {}}}}}"#, raw),
            )
            .unwrap();
            let mut store = JsonFileStore::new(&path);

            let (timestamps, settings) = store.load().unwrap();
            assert_eq!(settings, Settings::default(), "stored {}", raw);
            assert_eq!(timestamps.len(), 1);

            // The document stays writable and a new TTL replaces the bad one
            store.save(&timestamps).unwrap();
            store.save_settings(&Settings::new(3.0).unwrap()).unwrap();
            let (_, settings) = store.load().unwrap();
            assert_eq!(settings.max_age_days(), 3.0);
        }
    }

    #[test]
    fn test_corrupt_file_is_an_error_and_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
        assert!(store.save(&TimestampMap::new()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }
}
