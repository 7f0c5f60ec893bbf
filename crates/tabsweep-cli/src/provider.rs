//! File-backed tab provider.
//!
//! The host writes its live tabs to a JSON array; tabsweep reads it for
//! every snapshot and rewrites it to close a tab.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tabsweep_domain::traits::{Removal, ResourceProvider};
use tabsweep_domain::{Resource, ResourceId};

/// One tab as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    /// Tab id
    pub id: String,

    /// Canonical URL; tabs sharing it protect each other
    pub url: String,

    /// Page title
    #[serde(default)]
    pub title: String,

    /// Favicon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// Pinned by the user
    #[serde(default)]
    pub pinned: bool,

    /// Active tab of its window
    #[serde(default)]
    pub active: bool,
}

impl From<TabRecord> for Resource {
    fn from(record: TabRecord) -> Self {
        let mut resource = Resource::new(record.id, record.url).with_title(record.title);
        resource.icon_url = record.icon_url;
        resource.pinned = record.pinned;
        resource.active = record.active;
        resource
    }
}

/// Live tab set stored as a JSON array of [`TabRecord`]s.
#[derive(Debug, Clone)]
pub struct FileTabProvider {
    path: PathBuf,
}

impl FileTabProvider {
    /// Read tabs from `path`; a missing file means no tabs.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the tabs file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw records in file order.
    pub fn records(&self) -> Result<Vec<TabRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replace the file through a temp file in the same directory.
    fn write_records(&self, records: &[TabRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CliError::Io(e.error))?;
        Ok(())
    }
}

impl ResourceProvider for FileTabProvider {
    type Error = CliError;

    fn snapshot(&self) -> Result<Vec<Resource>> {
        Ok(self.records()?.into_iter().map(Resource::from).collect())
    }

    fn remove(&self, id: &ResourceId) -> Result<Removal> {
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|r| r.id != id.as_str());
        if records.len() == before {
            return Ok(Removal::AlreadyGone);
        }
        self.write_records(&records)?;
        tracing::info!("Closed tab {}", id);
        Ok(Removal::Removed)
    }
}
