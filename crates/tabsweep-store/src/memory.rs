//! In-memory store

use crate::StoreError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tabsweep_domain::traits::TimestampStore;
use tabsweep_domain::{Settings, TimestampMap};

#[derive(Debug, Default)]
struct MemoryState {
    timestamps: TimestampMap,
    settings: Settings,
    fail_loads: bool,
    fail_saves: bool,
    saves: usize,
}

/// TimestampStore kept in process memory
///
/// Clones share the same state, so a test can keep a handle while the
/// janitor service owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Empty store with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with timestamps and settings
    pub fn with_state(timestamps: TimestampMap, settings: Settings) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            state.timestamps = timestamps;
            state.settings = settings;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current timestamp map
    pub fn timestamps(&self) -> TimestampMap {
        self.lock().timestamps.clone()
    }

    /// Current settings
    pub fn settings(&self) -> Settings {
        self.lock().settings
    }

    /// Number of successful saves (timestamps or settings)
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Make every subsequent load fail
    pub fn fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    /// Make every subsequent save fail
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }
}

impl TimestampStore for MemoryStore {
    type Error = StoreError;

    fn load(&self) -> Result<(TimestampMap, Settings), Self::Error> {
        let state = self.lock();
        if state.fail_loads {
            return Err(StoreError::Unavailable("load refused".to_string()));
        }
        Ok((state.timestamps.clone(), state.settings))
    }

    fn save(&mut self, timestamps: &TimestampMap) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StoreError::Unavailable("save refused".to_string()));
        }
        state.timestamps = timestamps.clone();
        state.saves += 1;
        Ok(())
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StoreError::Unavailable("save refused".to_string()));
        }
        state.settings = *settings;
        state.saves += 1;
        Ok(())
    }
}
