//! Named periodic jobs on the tokio runtime

use crate::JanitorError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tabsweep_domain::traits::{Job, Scheduler};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Scheduler backed by tokio tasks
///
/// Each job runs in its own task. The first run happens one full interval
/// after scheduling; invocations of one job never overlap, and ticks missed
/// while a run is slow are skipped rather than queued.
pub struct TokioScheduler {
    runtime: Handle,
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioScheduler {
    /// Create a scheduler on the given runtime
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Create a scheduler on the runtime the caller is running in
    pub fn current() -> Result<Self, JanitorError> {
        let runtime = Handle::try_current()
            .map_err(|e| JanitorError::Worker(format!("no tokio runtime: {}", e)))?;
        Ok(Self::new(runtime))
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop a job; returns whether it was running
    pub fn cancel(&self, name: &str) -> bool {
        match self.jobs().remove(name) {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                running
            }
            None => false,
        }
    }

    /// Names of the live jobs
    pub fn job_names(&self) -> Vec<String> {
        self.jobs()
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Scheduler for TokioScheduler {
    fn ensure_scheduled(&self, name: &str, interval: Duration, job: Job) -> bool {
        let mut jobs = self.jobs();
        if jobs.get(name).is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!("Job '{}' already scheduled", name);
            return false;
        }

        let job_name = name.to_string();
        let handle = self.runtime.spawn(async move {
            let now = Instant::now();
            let start = now.checked_add(interval).unwrap_or(now);
            let mut ticker = interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                tracing::debug!("Running job '{}'", job_name);
                job();
            }
        });
        jobs.insert(name.to_string(), handle);
        tracing::info!("Scheduled job '{}' every {:?}", name, interval);
        true
    }

    fn has_job(&self, name: &str) -> bool {
        self.jobs()
            .get(name)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.jobs().drain() {
            handle.abort();
        }
    }
}
