//! Shared fixtures for unit tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tabsweep_domain::traits::{Removal, ResourceProvider};
use tabsweep_domain::{Resource, ResourceId};

pub const HOUR: u64 = 3_600_000;
pub const DAY: u64 = 24 * HOUR;

/// Epoch millis used as "T0" throughout the tests
pub const T0: u64 = 1_700_000_000_000;

// Mock host for testing
#[derive(Default)]
pub struct MockProvider {
    tabs: Mutex<Vec<Resource>>,
    removed: Mutex<Vec<ResourceId>>,
    failing: Mutex<HashSet<ResourceId>>,
    vanishing: Mutex<HashSet<ResourceId>>,
    snapshot_fails: AtomicBool,
}

impl MockProvider {
    pub fn with_tabs(tabs: Vec<Resource>) -> Self {
        let provider = Self::default();
        *provider.tabs.lock().unwrap() = tabs;
        provider
    }

    pub fn push(&self, tab: Resource) {
        self.tabs.lock().unwrap().push(tab);
    }

    /// The user closes a tab; no removal request is recorded
    pub fn close(&self, id: &str) {
        self.tabs.lock().unwrap().retain(|t| t.id.as_str() != id);
    }

    pub fn live_ids(&self) -> Vec<String> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.id.as_str().to_string())
            .collect()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed
            .lock()
            .unwrap()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    pub fn fail_removal_of(&self, id: &str) {
        self.failing.lock().unwrap().insert(ResourceId::new(id));
    }

    /// The tab disappears on its own just before the removal request
    pub fn vanish_on_removal(&self, id: &str) {
        self.vanishing.lock().unwrap().insert(ResourceId::new(id));
    }

    pub fn fail_snapshots(&self, fail: bool) {
        self.snapshot_fails.store(fail, Ordering::SeqCst);
    }
}

impl ResourceProvider for MockProvider {
    type Error = String;

    fn snapshot(&self) -> Result<Vec<Resource>, Self::Error> {
        if self.snapshot_fails.load(Ordering::SeqCst) {
            return Err("host unavailable".to_string());
        }
        Ok(self.tabs.lock().unwrap().clone())
    }

    fn remove(&self, id: &ResourceId) -> Result<Removal, Self::Error> {
        if self.failing.lock().unwrap().contains(id) {
            return Err(format!("host refused to close {}", id));
        }
        let mut tabs = self.tabs.lock().unwrap();
        let before = tabs.len();
        tabs.retain(|t| &t.id != id);
        if self.vanishing.lock().unwrap().contains(id) || tabs.len() == before {
            return Ok(Removal::AlreadyGone);
        }
        self.removed.lock().unwrap().push(id.clone());
        Ok(Removal::Removed)
    }
}
