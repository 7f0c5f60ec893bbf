//! Event handlers that keep the timestamp map current
//!
//! Each handler is a complete load→mutate→save cycle. Callers serialize
//! them through [`TabService`](crate::TabService).

use crate::events::TabEvent;
use crate::janitor::{fetch_snapshot, load_store, save_store};
use crate::JanitorError;
use std::fmt::Display;
use tabsweep_domain::traits::{ResourceProvider, TimestampStore};
use tabsweep_domain::ResourceId;

/// A tab was opened: stamp it with `now`
pub fn on_created<S>(store: &mut S, id: &ResourceId, now: u64) -> Result<(), JanitorError>
where
    S: TimestampStore,
    S::Error: Display,
{
    let (mut timestamps, _) = load_store(store)?;
    timestamps.insert(id.clone(), now);
    save_store(store, &timestamps)
}

/// A tab was activated: stamp it and every live sibling with `now`
///
/// Siblings are the other live tabs sharing the activated tab's identity
/// key. If the snapshot cannot be fetched, or the tab is not in it, only
/// the activated tab is refreshed. Returns the number of siblings refreshed.
pub fn on_activated<S, P>(
    store: &mut S,
    provider: &P,
    id: &ResourceId,
    now: u64,
) -> Result<usize, JanitorError>
where
    S: TimestampStore,
    S::Error: Display,
    P: ResourceProvider,
    P::Error: Display,
{
    let (mut timestamps, _) = load_store(store)?;
    timestamps.insert(id.clone(), now);

    let mut siblings = 0;
    match fetch_snapshot(provider) {
        Ok(snapshot) => {
            if let Some(activated) = snapshot.iter().find(|r| &r.id == id) {
                for sibling in snapshot
                    .iter()
                    .filter(|r| r.identity_key == activated.identity_key && &r.id != id)
                {
                    timestamps.insert(sibling.id.clone(), now);
                    siblings += 1;
                }
            }
        }
        Err(e) => {
            tracing::warn!("Skipping sibling refresh for tab {}: {}", id, e);
        }
    }

    save_store(store, &timestamps)?;
    Ok(siblings)
}

/// A tab was closed: forget it
///
/// Returns whether an entry existed.
pub fn on_removed<S>(store: &mut S, id: &ResourceId) -> Result<bool, JanitorError>
where
    S: TimestampStore,
    S::Error: Display,
{
    let (mut timestamps, _) = load_store(store)?;
    if timestamps.remove(id).is_none() {
        return Ok(false);
    }
    save_store(store, &timestamps)?;
    Ok(true)
}

/// Dispatch one event to its handler
pub fn apply<S, P>(
    store: &mut S,
    provider: &P,
    event: &TabEvent,
    now: u64,
) -> Result<(), JanitorError>
where
    S: TimestampStore,
    S::Error: Display,
    P: ResourceProvider,
    P::Error: Display,
{
    match event {
        TabEvent::Created(resource) => {
            on_created(store, &resource.id, now)?;
            tracing::debug!("Tracking new tab {}", resource.id);
        }
        TabEvent::Activated(id) => {
            let siblings = on_activated(store, provider, id, now)?;
            tracing::debug!("Tab {} activated ({} siblings refreshed)", id, siblings);
        }
        TabEvent::Removed(id) => {
            if on_removed(store, id)? {
                tracing::debug!("Stopped tracking tab {}", id);
            }
        }
    }
    Ok(())
}
