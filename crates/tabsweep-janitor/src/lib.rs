//! Tabsweep Janitor
//!
//! Tracks when each open tab was last used and closes the ones that have sat
//! idle longer than the configured time-to-live.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Tracking**: Stamping tabs on creation and activation, forgetting them on close
//! - **Reconciliation**: Repairing drift between the timestamp map and the live tab set
//! - **Sweeping**: Closing expired, unprotected tabs and purging orphaned entries
//! - **Estimation**: Counting tabs that will expire within a warning window
//!
//! # Protection
//!
//! A tab is never closed while it, or any live tab sharing its identity key,
//! is pinned or active. Protection is recomputed from a fresh snapshot on
//! every sweep.
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use tabsweep_janitor::Janitor;
//! use tabsweep_store::SqliteStore;
//! # use tabsweep_domain::{Clock, Resource, ResourceId, SystemClock};
//! # use tabsweep_domain::traits::{Removal, ResourceProvider};
//! # struct Host;
//! # impl ResourceProvider for Host {
//! #     type Error = String;
//! #     fn snapshot(&self) -> Result<Vec<Resource>, String> { Ok(vec![]) }
//! #     fn remove(&self, _: &ResourceId) -> Result<Removal, String> { Ok(Removal::Removed) }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("tabsweep.db")?;
//! let mut janitor = Janitor::default_config();
//!
//! // Perform a single sweep
//! let report = janitor.sweep(&mut store, &Host, SystemClock.now_millis())?;
//! println!("Closed {} tabs", report.evicted.len());
//! println!("{}", janitor.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! See [`JanitorWorker`]. It reconciles on start, keeps one named sweep job
//! scheduled and applies host events from an [`event_channel`] in order.
//!
//! ## Configuration Presets
//!
//! ```
//! use tabsweep_janitor::JanitorConfig;
//!
//! // Default: hourly sweeps, one hour warning window
//! let config = JanitorConfig::default();
//!
//! // Aggressive: sweep every 15 minutes, warn three hours ahead
//! let config = JanitorConfig::aggressive();
//!
//! // Lenient: sweep every 4 hours, warn 30 minutes ahead
//! let config = JanitorConfig::lenient();
//! ```
//!
//! # Configuration
//!
//! The Janitor can be configured via TOML:
//!
//! ```toml
//! [janitor]
//! sweep_interval_minutes = 60
//! warning_window_minutes = 60
//! job_name = "tab-sweep"
//! badge_color = "#d93025"
//! dry_run = false
//! ```
//!
//! The TTL itself is not part of this table. It is a persisted setting
//! changed through [`TabService::set_max_age_days`].

#![warn(missing_docs)]

mod error;
mod config;
mod metrics;
mod janitor;
mod service;
mod scheduler;
mod worker;
pub mod events;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use error::JanitorError;
pub use config::JanitorConfig;
pub use metrics::JanitorMetrics;
pub use janitor::{Janitor, ReconcileReport, SweepReport, TabStatus};
pub use service::{SharedBadge, SweepOutcome, TabService};
pub use events::{event_channel, EventSender, HostEvent, TabEvent};
pub use scheduler::TokioScheduler;
pub use worker::JanitorWorker;
