//! Background worker for continuous Janitor operation

use crate::events::{HostEvent, TabEvent};
use crate::janitor::ReconcileReport;
use crate::service::{SharedBadge, SweepOutcome, TabService};
use crate::{JanitorError, JanitorMetrics};
use std::fmt::Display;
use std::sync::Arc;
use tabsweep_domain::traits::{Job, ResourceProvider, Scheduler, TimestampStore};
use tabsweep_domain::Clock;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

/// Background worker that keeps tabs tracked and swept
///
/// On start (and whenever the host signals a restart) it reconciles the
/// timestamp map and makes sure the periodic sweep job exists. While
/// running it applies host events in arrival order and refreshes the badge
/// after every event and every sweep.
///
/// # Examples
///
/// ```no_run
/// use tabsweep_janitor::{event_channel, JanitorConfig, JanitorWorker, TabService, TokioScheduler};
/// # use tabsweep_domain::{Resource, ResourceId};
/// # use tabsweep_domain::traits::{Removal, ResourceProvider};
/// # struct Host;
/// # impl ResourceProvider for Host {
/// #     type Error = String;
/// #     fn snapshot(&self) -> Result<Vec<Resource>, String> { Ok(vec![]) }
/// #     fn remove(&self, _: &ResourceId) -> Result<Removal, String> { Ok(Removal::Removed) }
/// # }
/// use tabsweep_store::SqliteStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteStore::new("tabsweep.db")?;
///     let service = TabService::new(store, Host, JanitorConfig::default());
///     let worker = JanitorWorker::new(service, None);
///     let scheduler = TokioScheduler::current()?;
///     let (_events, rx) = event_channel(64);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(&scheduler, rx).await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker<S, P, C> {
    service: TabService<S, P, C>,
    badge: Option<SharedBadge>,
    interval: Duration,
}

impl<S, P, C> JanitorWorker<S, P, C>
where
    S: TimestampStore + Send + 'static,
    S::Error: Display,
    P: ResourceProvider + Send + Sync + 'static,
    P::Error: Display,
    C: Clock + Send + Sync + 'static,
{
    /// Create a worker around a service
    pub fn new(service: TabService<S, P, C>, badge: Option<SharedBadge>) -> Self {
        let interval = service.config().sweep_interval();
        Self {
            service,
            badge,
            interval,
        }
    }

    /// The underlying service
    pub fn service(&self) -> &TabService<S, P, C> {
        &self.service
    }

    /// Snapshot of the janitor's metrics
    pub fn metrics(&self) -> JanitorMetrics {
        self.service.metrics()
    }

    fn refresh_badge(service: &TabService<S, P, C>, badge: Option<&SharedBadge>) {
        if let Some(badge) = badge {
            if let Err(e) = service.refresh_badge(&**badge) {
                tracing::warn!("Badge refresh failed: {}", e);
            }
        }
    }

    /// One sweep followed by a badge refresh; failures are logged
    fn run_cycle(
        service: &TabService<S, P, C>,
        badge: Option<&SharedBadge>,
    ) -> Result<(), JanitorError> {
        tracing::debug!("Starting sweep cycle");
        let result = match service.sweep() {
            Ok(SweepOutcome::Completed(report)) => {
                tracing::info!(
                    "Sweep completed: {} evicted, {} protected, {} orphans purged",
                    report.evicted.len(),
                    report.protected,
                    report.orphans_purged
                );
                Ok(())
            }
            Ok(SweepOutcome::Skipped) => Ok(()),
            Err(e) => {
                tracing::error!("Sweep failed: {}", e);
                Err(e)
            }
        };
        Self::refresh_badge(service, badge);
        result
    }

    /// The periodic job body handed to the scheduler
    pub fn sweep_job(&self) -> Job {
        let service = self.service.clone();
        let badge = self.badge.clone();
        Arc::new(move || {
            let _ = Self::run_cycle(&service, badge.as_ref());
        })
    }

    /// Reconcile, then make sure the periodic sweep job exists
    ///
    /// Safe to call repeatedly: the job is created only if missing. The job
    /// is ensured even when reconciling fails.
    ///
    /// # Errors
    ///
    /// Returns the reconcile error after the job has been ensured.
    pub fn start(&self, scheduler: &impl Scheduler) -> Result<ReconcileReport, JanitorError> {
        let result = self.service.reconcile();
        if let Err(e) = &result {
            tracing::error!("Reconcile failed: {}", e);
        }

        let name = &self.service.config().job_name;
        if scheduler.ensure_scheduled(name, self.interval, self.sweep_job()) {
            tracing::info!("Sweep job '{}' created (interval: {:?})", name, self.interval);
        }

        Self::refresh_badge(&self.service, self.badge.as_ref());
        result
    }

    /// Host restart signal: same as [`start`](Self::start)
    pub fn recover(&self, scheduler: &impl Scheduler) -> Result<ReconcileReport, JanitorError> {
        tracing::info!("Host restarted, recovering");
        self.start(scheduler)
    }

    fn handle_event(&self, event: &TabEvent) {
        match self.service.handle_event(event) {
            Ok(()) => Self::refresh_badge(&self.service, self.badge.as_ref()),
            Err(e) => tracing::error!("Failed to apply {:?}: {}", event, e),
        }
    }

    fn dispatch(&self, scheduler: &impl Scheduler, event: HostEvent) {
        match event {
            HostEvent::Tab(event) => self.handle_event(&event),
            // start() has already logged the failure
            HostEvent::Restarted => {
                let _ = self.recover(scheduler);
            }
        }
    }

    /// Apply every event until the channel closes
    pub async fn drain_events(
        &self,
        scheduler: &impl Scheduler,
        mut events: mpsc::Receiver<HostEvent>,
    ) {
        while let Some(event) = events.recv().await {
            self.dispatch(scheduler, event);
        }
    }

    /// Run the worker indefinitely
    ///
    /// Starts the worker, then applies host events until a shutdown signal
    /// (Ctrl+C) is received. A closed event channel stops event intake but
    /// not the scheduled sweeps. A failed initial reconcile is logged and
    /// left to the next sweep.
    pub async fn run(
        &self,
        scheduler: &impl Scheduler,
        mut events: mpsc::Receiver<HostEvent>,
    ) -> Result<(), JanitorError> {
        let _ = self.start(scheduler);
        tracing::info!("Janitor worker started (interval: {:?})", self.interval);

        let mut intake_open = true;
        loop {
            tokio::select! {
                event = events.recv(), if intake_open => {
                    match event {
                        Some(event) => self.dispatch(scheduler, event),
                        None => {
                            tracing::info!("Event source closed");
                            intake_open = false;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    break;
                }
            }
        }

        tracing::info!("Janitor stopped. Final metrics:\n{}", self.metrics().summary());
        Ok(())
    }

    /// Run for a specific number of sweep cycles (useful for testing)
    ///
    /// The first cycle runs immediately.
    pub async fn run_cycles(&self, cycles: usize) -> Result<(), JanitorError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Sweep cycle {}/{}", cycle + 1, cycles);
            Self::run_cycle(&self.service, self.badge.as_ref())?;
        }

        tracing::info!(
            "Janitor finished {} cycles. Final metrics:\n{}",
            cycles,
            self.metrics().summary()
        );
        Ok(())
    }
}
