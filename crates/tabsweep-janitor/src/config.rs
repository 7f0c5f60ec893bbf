//! Configuration for Janitor operations
//!
//! Defines the sweep interval, the warning window and the badge. The TTL
//! itself is not configured here: it lives in the persisted settings record
//! so the user can change it at runtime.

use crate::JanitorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tabsweep_domain::traits::BadgeColor;

/// Longest accepted interval or window: one year
pub const MAX_MINUTES: u64 = 365 * 24 * 60;

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use tabsweep_janitor::JanitorConfig;
///
/// // Default configuration (hourly sweeps, one hour warning window)
/// let config = JanitorConfig::default();
/// assert_eq!(config.sweep_interval_minutes, 60);
///
/// // Aggressive cleanup
/// let config = JanitorConfig::aggressive();
/// assert_eq!(config.sweep_interval_minutes, 15);
///
/// // Lenient cleanup
/// let config = JanitorConfig::lenient();
/// assert_eq!(config.sweep_interval_minutes, 240);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// How often to run the sweep cycle (in minutes)
    /// Default: Every 60 minutes (hourly)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,

    /// Remaining lifetime under which a tab counts as at risk (in minutes)
    /// Default: 60 minutes
    #[serde(default = "default_warning_window")]
    pub warning_window_minutes: u64,

    /// Name of the periodic job; must be stable across restarts
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// Dry-run mode: Log what would be evicted without actually evicting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Badge color as `#rrggbb`
    #[serde(default = "default_badge_color")]
    pub badge_color: String,
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_warning_window() -> u64 {
    60
}

fn default_job_name() -> String {
    "tab-sweep".to_string()
}

fn default_badge_color() -> String {
    "#d93025".to_string()
}

impl Default for JanitorConfig {
    /// - Sweep interval: 60 minutes (hourly)
    /// - Warning window: 60 minutes
    /// - Job name: `tab-sweep`
    fn default() -> Self {
        Self {
            sweep_interval_minutes: default_sweep_interval(),
            warning_window_minutes: default_warning_window(),
            job_name: default_job_name(),
            dry_run: false,
            badge_color: default_badge_color(),
        }
    }
}

impl JanitorConfig {
    /// Frequent sweeps and an early warning
    ///
    /// - Sweep interval: 15 minutes
    /// - Warning window: 3 hours
    pub fn aggressive() -> Self {
        Self {
            sweep_interval_minutes: 15,
            warning_window_minutes: 180,
            ..Self::default()
        }
    }

    /// Infrequent sweeps and a short warning
    ///
    /// - Sweep interval: 240 minutes (4 hours)
    /// - Warning window: 30 minutes
    pub fn lenient() -> Self {
        Self {
            sweep_interval_minutes: 240,
            warning_window_minutes: 30,
            ..Self::default()
        }
    }

    /// Reject values the worker cannot run with
    pub fn validate(&self) -> Result<(), JanitorError> {
        if self.sweep_interval_minutes == 0 {
            return Err(JanitorError::Config(
                "sweep_interval_minutes must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval_minutes > MAX_MINUTES {
            return Err(JanitorError::Config(format!(
                "sweep_interval_minutes must be at most {}",
                MAX_MINUTES
            )));
        }
        if self.warning_window_minutes > MAX_MINUTES {
            return Err(JanitorError::Config(format!(
                "warning_window_minutes must be at most {}",
                MAX_MINUTES
            )));
        }
        if self.job_name.trim().is_empty() {
            return Err(JanitorError::Config("job_name must not be empty".to_string()));
        }
        if BadgeColor::from_hex(&self.badge_color).is_none() {
            return Err(JanitorError::Config(format!(
                "badge_color '{}' is not a #rrggbb color",
                self.badge_color
            )));
        }
        Ok(())
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.saturating_mul(60))
    }

    /// Get warning window as Duration
    pub fn warning_window(&self) -> Duration {
        Duration::from_secs(self.warning_window_minutes.saturating_mul(60))
    }

    /// Parsed badge color (falls back to the default red)
    pub fn badge_color(&self) -> BadgeColor {
        BadgeColor::from_hex(&self.badge_color).unwrap_or(BadgeColor::rgb(0xd9, 0x30, 0x25))
    }
}
