//! Core Janitor implementation: reconciliation, sweeping and estimation

use crate::{JanitorConfig, JanitorError, JanitorMetrics};
use std::collections::HashSet;
use std::fmt::Display;
use std::time::{Duration, Instant};
use tabsweep_domain::traits::{Removal, ResourceProvider, TimestampStore};
use tabsweep_domain::{
    is_protected, resolve_protected, Resource, ResourceId, Settings, TimestampMap,
};

/// Load the timestamp map and settings, mapping the store error
pub(crate) fn load_store<S>(store: &S) -> Result<(TimestampMap, Settings), JanitorError>
where
    S: TimestampStore,
    S::Error: Display,
{
    store.load().map_err(|e| JanitorError::Store(e.to_string()))
}

pub(crate) fn save_store<S>(store: &mut S, timestamps: &TimestampMap) -> Result<(), JanitorError>
where
    S: TimestampStore,
    S::Error: Display,
{
    store
        .save(timestamps)
        .map_err(|e| JanitorError::Store(e.to_string()))
}

/// Fetch a fresh snapshot, mapping the provider error
pub(crate) fn fetch_snapshot<P>(provider: &P) -> Result<Vec<Resource>, JanitorError>
where
    P: ResourceProvider,
    P::Error: Display,
{
    provider
        .snapshot()
        .map_err(|e| JanitorError::Provider(e.to_string()))
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Live tabs that had no entry and were stamped with "now"
    pub added: usize,

    /// Entries whose tab no longer exists
    pub removed: usize,
}

impl ReconcileReport {
    /// Whether the pass changed the map
    pub fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

/// Outcome of a sweep pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Tabs evicted (or, in dry-run mode, that would have been)
    pub evicted: Vec<ResourceId>,

    /// Live tabs skipped by the protection rule
    pub protected: usize,

    /// Live tabs skipped because they have no timestamp
    pub untracked: usize,

    /// Orphan entries purged after the resource loop
    pub orphans_purged: usize,

    /// Removal requests that failed for a reason other than "already gone"
    pub removal_failures: usize,

    /// Whether this was a dry run (nothing removed, nothing saved)
    pub dry_run: bool,
}

/// Per-tab view for status listings
#[derive(Debug, Clone, PartialEq)]
pub struct TabStatus {
    /// The live tab
    pub resource: Resource,

    /// Last-active instant, if tracked
    pub last_active: Option<u64>,

    /// Idle duration, if tracked
    pub idle: Option<Duration>,

    /// Time left before eviction, if tracked (zero when overdue)
    pub remaining: Option<Duration>,

    /// Shielded from eviction this pass
    pub protected: bool,
}

/// Janitor service for idle-tab eviction
///
/// Responsible for:
/// - Reconciling the timestamp map with the live tab set
/// - Sweeping unprotected tabs idle for at least the TTL
/// - Estimating how many tabs are about to be swept
/// - Collecting metrics on sweeps
///
/// Every operation is one load→compute→save cycle against the store and a
/// fresh snapshot; the janitor keeps no copy of the map between calls.
///
/// # Examples
///
/// ```no_run
/// use tabsweep_janitor::{Janitor, JanitorConfig};
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
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new(":memory:")?;
/// let mut janitor = Janitor::new(JanitorConfig::default());
///
/// let report = janitor.sweep(&mut store, &Host, 1_700_000_000_000)?;
/// println!("evicted {} tabs", report.evicted.len());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    metrics: JanitorMetrics,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        Self {
            config,
            metrics: JanitorMetrics::new(),
        }
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self::new(JanitorConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Get a mutable reference to the metrics
    pub(crate) fn metrics_mut(&mut self) -> &mut JanitorMetrics {
        &mut self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Repair drift between the map and the live tab set
    ///
    /// Stamps every untracked live tab with `now` and drops every entry
    /// whose tab is gone. Saves only when something changed, so a second
    /// call against an unchanged snapshot is a no-op.
    pub fn reconcile<S, P>(
        &mut self,
        store: &mut S,
        provider: &P,
        now: u64,
    ) -> Result<ReconcileReport, JanitorError>
    where
        S: TimestampStore,
        S::Error: Display,
        P: ResourceProvider,
        P::Error: Display,
    {
        let (mut timestamps, _) = load_store(store)?;
        let snapshot = fetch_snapshot(provider)?;

        let mut report = ReconcileReport::default();
        for resource in &snapshot {
            if !timestamps.contains_key(&resource.id) {
                timestamps.insert(resource.id.clone(), now);
                report.added += 1;
            }
        }

        let live: HashSet<&ResourceId> = snapshot.iter().map(|r| &r.id).collect();
        let before = timestamps.len();
        timestamps.retain(|id, _| live.contains(id));
        report.removed = before - timestamps.len();

        if report.changed() {
            save_store(store, &timestamps)?;
            tracing::info!(
                "Reconciled timestamps: {} added, {} stale removed",
                report.added,
                report.removed
            );
        } else {
            tracing::debug!("Reconcile found no drift");
        }

        Ok(report)
    }

    /// Perform a complete sweep pass
    ///
    /// 1. Computes the protected identity keys once from a fresh snapshot
    /// 2. Requests removal of every unprotected, tracked tab idle for at
    ///    least the TTL, dropping its entry whatever the removal outcome
    /// 3. Purges entries whose tab is absent from the snapshot
    /// 4. Persists the resulting map
    ///
    /// A load, snapshot or save failure aborts the pass and leaves the
    /// persisted map untouched. Removal failures are logged and counted.
    pub fn sweep<S, P>(
        &mut self,
        store: &mut S,
        provider: &P,
        now: u64,
    ) -> Result<SweepReport, JanitorError>
    where
        S: TimestampStore,
        S::Error: Display,
        P: ResourceProvider,
        P::Error: Display,
    {
        let start = Instant::now();

        let (mut timestamps, settings) = load_store(store)?;
        let snapshot = fetch_snapshot(provider)?;
        let protected = resolve_protected(&snapshot);
        let ttl = settings.ttl_millis();

        let mut report = SweepReport {
            dry_run: self.config.dry_run,
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for resource in &snapshot {
            if !seen.insert(&resource.id) {
                continue;
            }
            if is_protected(resource, &protected) {
                report.protected += 1;
                continue;
            }
            let Some(&last_active) = timestamps.get(&resource.id) else {
                report.untracked += 1;
                continue;
            };

            let idle = now.saturating_sub(last_active);
            if idle < ttl {
                continue;
            }

            if self.config.dry_run {
                tracing::info!(
                    "DRY RUN: Would evict tab {} ({}), idle {}s",
                    resource.id,
                    resource.identity_key,
                    idle / 1000
                );
                report.evicted.push(resource.id.clone());
                continue;
            }

            match provider.remove(&resource.id) {
                Ok(Removal::Removed) => {
                    tracing::debug!("Evicted tab {} ({})", resource.id, resource.identity_key);
                }
                Ok(Removal::AlreadyGone) => {
                    tracing::debug!("Tab {} was already gone", resource.id);
                }
                Err(e) => {
                    tracing::warn!("Failed to close tab {}: {}", resource.id, e);
                    report.removal_failures += 1;
                }
            }
            timestamps.remove(&resource.id);
            report.evicted.push(resource.id.clone());
        }

        let live: HashSet<&ResourceId> = snapshot.iter().map(|r| &r.id).collect();
        if self.config.dry_run {
            report.orphans_purged = timestamps.keys().filter(|id| !live.contains(id)).count();
        } else {
            let before = timestamps.len();
            timestamps.retain(|id, _| live.contains(id));
            report.orphans_purged = before - timestamps.len();

            if !report.evicted.is_empty() || report.orphans_purged > 0 {
                save_store(store, &timestamps)?;
            }
        }

        let runtime_ms = start.elapsed().as_millis() as u64;
        self.metrics.record_sweep(&report, now, runtime_ms);

        Ok(report)
    }

    /// Count unprotected, tracked tabs with `0 < ttl - idle <= window`
    ///
    /// Read-only: never removes a tab and never saves.
    pub fn estimate_at_risk<S, P>(
        &self,
        store: &S,
        provider: &P,
        now: u64,
        window: Duration,
    ) -> Result<usize, JanitorError>
    where
        S: TimestampStore,
        S::Error: Display,
        P: ResourceProvider,
        P::Error: Display,
    {
        let (timestamps, settings) = load_store(store)?;
        let snapshot = fetch_snapshot(provider)?;
        let protected = resolve_protected(&snapshot);
        let ttl = settings.ttl_millis();
        let window = window.as_millis() as u64;

        let mut seen = HashSet::new();
        let mut count = 0;
        for resource in &snapshot {
            if !seen.insert(&resource.id) || is_protected(resource, &protected) {
                continue;
            }
            let Some(&last_active) = timestamps.get(&resource.id) else {
                continue;
            };
            let idle = now.saturating_sub(last_active);
            if idle < ttl && ttl - idle <= window {
                count += 1;
            }
        }

        Ok(count)
    }

    /// Describe every live tab: tracking state, idle time, time left
    pub fn status<S, P>(
        &self,
        store: &S,
        provider: &P,
        now: u64,
    ) -> Result<Vec<TabStatus>, JanitorError>
    where
        S: TimestampStore,
        S::Error: Display,
        P: ResourceProvider,
        P::Error: Display,
    {
        let (timestamps, settings) = load_store(store)?;
        let snapshot = fetch_snapshot(provider)?;
        let protected = resolve_protected(&snapshot);
        let ttl = settings.ttl_millis();

        let statuses = snapshot
            .iter()
            .map(|resource| {
                let last_active = timestamps.get(&resource.id).copied();
                let idle = last_active.map(|ts| now.saturating_sub(ts));
                TabStatus {
                    resource: resource.clone(),
                    last_active,
                    idle: idle.map(Duration::from_millis),
                    remaining: idle.map(|idle| Duration::from_millis(ttl.saturating_sub(idle))),
                    protected: is_protected(resource, &protected),
                }
            })
            .collect();

        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProvider, DAY, HOUR, T0};
    use tabsweep_store::MemoryStore;

    fn stamped(entries: &[(&str, u64)]) -> MemoryStore {
        let timestamps = entries
            .iter()
            .map(|(id, ts)| (ResourceId::new(*id), *ts))
            .collect();
        MemoryStore::with_state(timestamps, Settings::default())
    }

    fn ids(report: &SweepReport) -> Vec<&str> {
        let mut ids: Vec<&str> = report.evicted.iter().map(|id| id.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_janitor_creation() {
        let janitor = Janitor::default_config();
        assert_eq!(janitor.metrics().sweep_count, 0);
        assert_eq!(janitor.metrics().evicted, 0);
    }

    #[test]
    fn test_reconcile_adds_and_removes() {
        let mut store = stamped(&[("1", T0 - DAY), ("gone", T0 - DAY)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("1", "https://a.test"),
            Resource::new("2", "https://b.test"),
        ]);
        let mut janitor = Janitor::default_config();

        let report = janitor.reconcile(&mut store, &provider, T0).unwrap();

        assert_eq!(report, ReconcileReport { added: 1, removed: 1 });
        let timestamps = store.timestamps();
        assert_eq!(timestamps.len(), 2);
        assert_eq!(timestamps[&ResourceId::new("1")], T0 - DAY);
        assert_eq!(timestamps[&ResourceId::new("2")], T0);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut store = stamped(&[("stale", 1)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("1", "https://a.test"),
            Resource::new("2", "https://a.test"),
        ]);
        let mut janitor = Janitor::default_config();

        janitor.reconcile(&mut store, &provider, T0).unwrap();
        let first = store.timestamps();
        let saves = store.save_count();

        let report = janitor.reconcile(&mut store, &provider, T0 + HOUR).unwrap();
        assert!(!report.changed());
        assert_eq!(store.timestamps(), first);
        assert_eq!(store.save_count(), saves);
    }

    #[test]
    fn test_sweep_evicts_idle_tab() {
        let mut store = stamped(&[("1", T0)]);
        let provider = MockProvider::with_tabs(vec![Resource::new("1", "https://a.test")]);
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0 + 8 * DAY).unwrap();

        assert_eq!(ids(&report), vec!["1"]);
        assert_eq!(provider.removed(), vec!["1"]);
        assert!(store.timestamps().is_empty());
    }

    #[test]
    fn test_sweep_ttl_boundary() {
        let mut store = stamped(&[("exact", T0), ("young", T0 + 1)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("exact", "https://a.test"),
            Resource::new("young", "https://b.test"),
        ]);
        let mut janitor = Janitor::default_config();

        // idle == ttl evicts; idle == ttl - 1ms survives
        let report = janitor.sweep(&mut store, &provider, T0 + 7 * DAY).unwrap();

        assert_eq!(ids(&report), vec!["exact"]);
        assert!(store.timestamps().contains_key(&ResourceId::new("young")));
    }

    #[test]
    fn test_sweep_never_evicts_active_or_pinned() {
        let mut store = stamped(&[("active", T0), ("pinned", T0 - 30 * DAY)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("active", "https://a.test").active(),
            Resource::new("pinned", "https://b.test").pinned(),
        ]);
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0 + 8 * DAY).unwrap();

        assert!(report.evicted.is_empty());
        assert_eq!(report.protected, 2);
        assert!(provider.removed().is_empty());
        assert_eq!(store.timestamps().len(), 2);
    }

    #[test]
    fn test_sweep_sibling_rule() {
        let mut store = stamped(&[("a", T0), ("b", T0 - 10 * DAY)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("a", "https://k.test").active(),
            Resource::new("b", "https://k.test"),
        ]);
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0).unwrap();
        assert!(report.evicted.is_empty());

        // Closing A lifts the protection on B
        provider.close("a");
        let report = janitor.sweep(&mut store, &provider, T0).unwrap();
        assert_eq!(ids(&report), vec!["b"]);
        assert_eq!(report.orphans_purged, 1);
        assert!(store.timestamps().is_empty());
    }

    #[test]
    fn test_sweep_skips_untracked() {
        let mut store = MemoryStore::new();
        let provider = MockProvider::with_tabs(vec![Resource::new("1", "https://a.test")]);
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0 + 100 * DAY).unwrap();

        assert!(report.evicted.is_empty());
        assert_eq!(report.untracked, 1);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_sweep_tolerates_removal_failures() {
        let mut store = stamped(&[("gone", T0), ("refused", T0), ("ok", T0)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("gone", "https://a.test"),
            Resource::new("refused", "https://b.test"),
            Resource::new("ok", "https://c.test"),
        ]);
        provider.vanish_on_removal("gone");
        provider.fail_removal_of("refused");
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0 + 8 * DAY).unwrap();

        assert_eq!(ids(&report), vec!["gone", "ok", "refused"]);
        assert_eq!(report.removal_failures, 1);
        assert_eq!(provider.removed(), vec!["ok"]);
        // Entries are dropped regardless of the removal outcome
        assert!(store.timestamps().is_empty());
    }

    #[test]
    fn test_sweep_removes_duplicate_snapshot_entry_once() {
        let mut store = stamped(&[("1", T0)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("1", "https://a.test"),
            Resource::new("1", "https://a.test"),
        ]);
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0 + 8 * DAY).unwrap();
        assert_eq!(report.evicted.len(), 1);
        assert_eq!(provider.removed(), vec!["1"]);
    }

    #[test]
    fn test_sweep_purges_orphans() {
        let mut store = stamped(&[("live", T0), ("orphan", T0)]);
        let provider = MockProvider::with_tabs(vec![Resource::new("live", "https://a.test")]);
        let mut janitor = Janitor::default_config();

        let report = janitor.sweep(&mut store, &provider, T0 + HOUR).unwrap();

        assert_eq!(report.orphans_purged, 1);
        let remaining: Vec<_> = store.timestamps().into_keys().collect();
        assert_eq!(remaining, vec![ResourceId::new("live")]);
    }

    #[test]
    fn test_sweep_respects_dry_run() {
        let mut store = stamped(&[("1", T0), ("orphan", T0)]);
        let provider = MockProvider::with_tabs(vec![Resource::new("1", "https://a.test")]);
        let config = JanitorConfig {
            dry_run: true,
            ..Default::default()
        };
        let mut janitor = Janitor::new(config);

        let report = janitor.sweep(&mut store, &provider, T0 + 8 * DAY).unwrap();

        assert!(report.dry_run);
        assert_eq!(ids(&report), vec!["1"]);
        assert_eq!(report.orphans_purged, 1);
        assert!(provider.removed().is_empty());
        assert_eq!(store.timestamps().len(), 2);
        assert_eq!(store.save_count(), 0);
        assert_eq!(janitor.metrics().evicted, 0);
    }

    #[test]
    fn test_sweep_aborts_on_persistence_failure() {
        let mut store = stamped(&[("1", T0)]);
        let provider = MockProvider::with_tabs(vec![]);
        let mut janitor = Janitor::default_config();

        store.fail_loads(true);
        let result = janitor.sweep(&mut store, &provider, T0);
        assert!(matches!(result, Err(JanitorError::Store(_))));

        store.fail_loads(false);
        store.fail_saves(true);
        let result = janitor.sweep(&mut store, &provider, T0);
        assert!(matches!(result, Err(JanitorError::Store(_))));
        assert_eq!(store.timestamps().len(), 1);
        assert_eq!(janitor.metrics().sweep_count, 0);
    }

    #[test]
    fn test_sweep_aborts_on_snapshot_failure() {
        let mut store = stamped(&[("1", T0)]);
        let provider = MockProvider::with_tabs(vec![Resource::new("1", "https://a.test")]);
        provider.fail_snapshots(true);
        let mut janitor = Janitor::default_config();

        let result = janitor.sweep(&mut store, &provider, T0 + 8 * DAY);
        assert!(matches!(result, Err(JanitorError::Provider(_))));
        assert_eq!(store.timestamps().len(), 1);
    }

    #[test]
    fn test_estimate_at_risk_window() {
        let store = stamped(&[("r1", T0)]);
        let provider = MockProvider::with_tabs(vec![Resource::new("r1", "https://a.test")]);
        let janitor = Janitor::default_config();
        let window = Duration::from_secs(3600);

        // 59 minutes left
        let now = T0 + 7 * DAY - 59 * 60_000;
        assert_eq!(janitor.estimate_at_risk(&store, &provider, now, window).unwrap(), 1);

        // 5 hours left
        let now = T0 + 7 * DAY - 5 * HOUR;
        assert_eq!(janitor.estimate_at_risk(&store, &provider, now, window).unwrap(), 0);

        // exactly one hour left is still at risk
        let now = T0 + 7 * DAY - HOUR;
        assert_eq!(janitor.estimate_at_risk(&store, &provider, now, window).unwrap(), 1);

        // overdue tabs are not "at risk": the next sweep takes them
        let now = T0 + 7 * DAY;
        assert_eq!(janitor.estimate_at_risk(&store, &provider, now, window).unwrap(), 0);

        // never mutates
        assert_eq!(store.save_count(), 0);
        assert!(provider.removed().is_empty());
        store.fail_saves(true);
        assert!(janitor.estimate_at_risk(&store, &provider, now, window).is_ok());
    }

    #[test]
    fn test_estimate_skips_protected_and_untracked() {
        let store = stamped(&[("a", T0), ("b", T0)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("a", "https://k.test").pinned(),
            Resource::new("b", "https://k.test"),
            Resource::new("c", "https://other.test"),
        ]);
        let janitor = Janitor::default_config();
        let now = T0 + 7 * DAY - 30 * 60_000;

        let count = janitor
            .estimate_at_risk(&store, &provider, now, Duration::from_secs(3600))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_status_reports_remaining() {
        let store = stamped(&[("1", T0)]);
        let provider = MockProvider::with_tabs(vec![
            Resource::new("1", "https://a.test"),
            Resource::new("2", "https://b.test").active(),
        ]);
        let janitor = Janitor::default_config();

        let statuses = janitor.status(&store, &provider, T0 + DAY).unwrap();

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].idle, Some(Duration::from_millis(DAY)));
        assert_eq!(statuses[0].remaining, Some(Duration::from_millis(6 * DAY)));
        assert!(!statuses[0].protected);
        assert_eq!(statuses[1].last_active, None);
        assert!(statuses[1].protected);
    }

    #[test]
    fn test_metrics_reset() {
        let mut store = stamped(&[("1", T0)]);
        let provider = MockProvider::with_tabs(vec![Resource::new("1", "https://a.test")]);
        let mut janitor = Janitor::default_config();

        janitor.sweep(&mut store, &provider, T0 + 8 * DAY).unwrap();
        assert_eq!(janitor.metrics().sweep_count, 1);
        assert_eq!(janitor.metrics().evicted, 1);

        janitor.reset_metrics();
        assert_eq!(janitor.metrics().sweep_count, 0);
    }
}
