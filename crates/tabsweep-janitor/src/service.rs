//! Serialized access to the store
//!
//! The store is process-wide state mutated by event handlers, the periodic
//! sweep and the settings surface. [`TabService`] owns it behind a mutex and
//! runs every load→mutate→save cycle as one critical section, so two cycles
//! can never interleave and lose an update.

use crate::events::TabEvent;
use crate::janitor::{ReconcileReport, SweepReport, TabStatus};
use crate::{tracker, Janitor, JanitorConfig, JanitorError, JanitorMetrics};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Duration;
use tabsweep_domain::traits::{BadgeSink, ResourceProvider, TimestampStore};
use tabsweep_domain::{Clock, Settings, SystemClock};

/// Badge sink shared between the worker and the event loop
pub type SharedBadge = Arc<dyn BadgeSink + Send + Sync>;

/// Result of a sweep request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The pass ran
    Completed(SweepReport),

    /// Another pass was still running; this one was skipped
    Skipped,
}

struct Inner<S> {
    store: S,
    janitor: Janitor,
}

/// Single-writer front for the store, the provider and the janitor
///
/// Cloning is cheap; clones share the same store.
pub struct TabService<S, P, C = SystemClock> {
    inner: Arc<Mutex<Inner<S>>>,
    sweep_gate: Arc<Mutex<()>>,
    provider: Arc<P>,
    clock: Arc<C>,
    config: JanitorConfig,
}

impl<S, P, C> Clone for TabService<S, P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sweep_gate: Arc::clone(&self.sweep_gate),
            provider: Arc::clone(&self.provider),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S, P> TabService<S, P, SystemClock>
where
    S: TimestampStore,
    S::Error: Display,
    P: ResourceProvider,
    P::Error: Display,
{
    /// Create a service on the system clock
    pub fn new(store: S, provider: P, config: JanitorConfig) -> Self {
        Self::with_clock(store, Arc::new(provider), Arc::new(SystemClock), config)
    }
}

impl<S, P, C> TabService<S, P, C>
where
    S: TimestampStore,
    S::Error: Display,
    P: ResourceProvider,
    P::Error: Display,
    C: Clock,
{
    /// Create a service with an explicit clock and a shared provider
    pub fn with_clock(store: S, provider: Arc<P>, clock: Arc<C>, config: JanitorConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store,
                janitor: Janitor::new(config.clone()),
            })),
            sweep_gate: Arc::new(Mutex::new(())),
            provider,
            clock,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Janitor configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// The resource provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Snapshot of the cumulative metrics
    pub fn metrics(&self) -> JanitorMetrics {
        self.lock().janitor.metrics().clone()
    }

    /// Repair drift between the map and the live tab set
    pub fn reconcile(&self) -> Result<ReconcileReport, JanitorError> {
        let now = self.now();
        let mut inner = self.lock();
        let Inner { store, janitor } = &mut *inner;
        janitor.reconcile(store, self.provider.as_ref(), now)
    }

    /// Run one sweep pass, unless one is already in progress
    pub fn sweep(&self) -> Result<SweepOutcome, JanitorError> {
        let _gate = match self.sweep_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::info!("Sweep already in progress, skipping");
                self.lock().janitor.metrics_mut().record_overlap();
                return Ok(SweepOutcome::Skipped);
            }
        };

        let now = self.now();
        let mut inner = self.lock();
        let Inner { store, janitor } = &mut *inner;
        let report = janitor.sweep(store, self.provider.as_ref(), now)?;
        Ok(SweepOutcome::Completed(report))
    }

    /// Count tabs within `window` of eviction
    pub fn estimate_at_risk(&self, window: Duration) -> Result<usize, JanitorError> {
        let now = self.now();
        let inner = self.lock();
        inner
            .janitor
            .estimate_at_risk(&inner.store, self.provider.as_ref(), now, window)
    }

    /// Count tabs within the configured warning window of eviction
    pub fn at_risk_count(&self) -> Result<usize, JanitorError> {
        self.estimate_at_risk(self.config.warning_window())
    }

    /// Per-tab status listing
    pub fn status(&self) -> Result<Vec<TabStatus>, JanitorError> {
        let now = self.now();
        let inner = self.lock();
        inner.janitor.status(&inner.store, self.provider.as_ref(), now)
    }

    /// Apply one tracker event
    pub fn handle_event(&self, event: &TabEvent) -> Result<(), JanitorError> {
        let now = self.now();
        let mut inner = self.lock();
        tracker::apply(&mut inner.store, self.provider.as_ref(), event, now)
    }

    /// Current settings
    pub fn settings(&self) -> Result<Settings, JanitorError> {
        let inner = self.lock();
        let (_, settings) = inner
            .store
            .load()
            .map_err(|e| JanitorError::Store(e.to_string()))?;
        Ok(settings)
    }

    /// Validate and persist a new TTL given in days
    ///
    /// Rejected input leaves the stored value untouched.
    pub fn set_max_age_days(&self, input: &str) -> Result<Settings, JanitorError> {
        let settings =
            Settings::parse_days(input).map_err(|e| JanitorError::Config(e.to_string()))?;
        self.lock()
            .store
            .save_settings(&settings)
            .map_err(|e| JanitorError::Store(e.to_string()))?;
        tracing::info!("Max age set to {} days", settings.max_age_days());
        Ok(settings)
    }

    /// Recompute the at-risk count and push it to the badge
    ///
    /// Zero clears the badge. Returns the count.
    pub fn refresh_badge(&self, badge: &dyn BadgeSink) -> Result<usize, JanitorError> {
        let count = self.at_risk_count()?;
        if count == 0 {
            badge.clear();
        } else {
            badge.set_label(&count.to_string(), self.config.badge_color());
        }
        Ok(count)
    }
}
