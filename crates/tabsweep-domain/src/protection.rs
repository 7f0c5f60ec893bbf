//! Protection module - which resources a pass must never evict
//!
//! A resource is protected when it is pinned, when it is active, or when
//! it shares its identity key with a pinned or active resource. Protection
//! follows identity, not instance: the same page open in two windows must
//! not be closed in one while it is in use in the other.

use crate::{IdentityKey, Resource};
use std::collections::HashSet;

/// Identity keys protected for one pass
///
/// Derived from a single snapshot and never persisted.
pub type ProtectedSet = HashSet<IdentityKey>;

/// Collect the identity keys of every pinned or active resource
///
/// # Examples
///
/// ```
/// use tabsweep_domain::{resolve_protected, IdentityKey, Resource};
///
/// let snapshot = vec![
///     Resource::new("1", "https://a.test").active(),
///     Resource::new("2", "https://b.test"),
/// ];
/// let protected = resolve_protected(&snapshot);
/// assert!(protected.contains(&IdentityKey::new("https://a.test")));
/// assert!(!protected.contains(&IdentityKey::new("https://b.test")));
/// ```
pub fn resolve_protected(snapshot: &[Resource]) -> ProtectedSet {
    snapshot
        .iter()
        .filter(|r| r.pinned || r.active)
        .map(|r| r.identity_key.clone())
        .collect()
}

/// Whether `resource` is shielded from eviction this pass
pub fn is_protected(resource: &Resource, protected: &ProtectedSet) -> bool {
    resource.pinned || resource.active || protected.contains(&resource.identity_key)
}
