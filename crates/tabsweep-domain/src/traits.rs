//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates or in the host.

use crate::{Resource, ResourceId, Settings, TimestampMap};
use std::sync::Arc;
use std::time::Duration;

/// Persisted idle-timestamp map plus settings
///
/// Implemented by the infrastructure layer (tabsweep-store). Reads default
/// to an empty map and default settings when nothing is stored. A failed
/// `save` must leave the previously persisted value intact.
pub trait TimestampStore {
    /// Error type for store operations
    type Error;

    /// Load the full timestamp map and the settings record
    fn load(&self) -> Result<(TimestampMap, Settings), Self::Error>;

    /// Replace the persisted timestamp map
    fn save(&mut self, timestamps: &TimestampMap) -> Result<(), Self::Error>;

    /// Replace the persisted settings record
    fn save_settings(&mut self, settings: &Settings) -> Result<(), Self::Error>;
}

/// Outcome of a removal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The host closed the resource
    Removed,

    /// The resource had already vanished; nothing to do
    AlreadyGone,
}

/// Source of truth for the live resource set
///
/// Implemented by the host shim (tabsweep-cli, tests).
pub trait ResourceProvider {
    /// Error type for provider operations
    type Error;

    /// Enumerate every live resource
    fn snapshot(&self) -> Result<Vec<Resource>, Self::Error>;

    /// Close a resource
    ///
    /// An id that no longer exists must map to `Ok(Removal::AlreadyGone)`.
    fn remove(&self, id: &ResourceId) -> Result<Removal, Self::Error>;
}

/// A periodic job body
pub type Job = Arc<dyn Fn() + Send + Sync>;

/// Fires named jobs on a fixed period
pub trait Scheduler {
    /// Create the job unless a live job with this name already exists
    ///
    /// Returns `true` when a job was (re)created, `false` when one was
    /// already running.
    fn ensure_scheduled(&self, name: &str, interval: Duration, job: Job) -> bool;

    /// Whether a live job with this name exists
    fn has_job(&self, name: &str) -> bool;
}

/// RGB color of the warning badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeColor {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl BadgeColor {
    /// Build a color from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// At-a-glance warning indicator
pub trait BadgeSink {
    /// Show a short label
    fn set_label(&self, text: &str, color: BadgeColor);

    /// Remove the label
    fn clear(&self);
}
