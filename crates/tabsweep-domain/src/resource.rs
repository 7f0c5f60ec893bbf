//! Resource module - the live tabs tracked by tabsweep

use std::collections::HashMap;
use std::fmt;

/// Opaque identifier of a live resource
///
/// Unique at any instant, but the host may reuse an id once the resource
/// it named has been destroyed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a ResourceId from any string-like value
    ///
    /// # Examples
    ///
    /// ```
    /// use tabsweep_domain::ResourceId;
    ///
    /// let id = ResourceId::new("42");
    /// assert_eq!(id.as_str(), "42");
    /// ```
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Attribute grouping resources that share protection status
///
/// Usually the tab URL. Not unique: the same page open in two windows
/// yields two resources with one identity key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Create an IdentityKey from any string-like value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Last-active instant (milliseconds since Unix epoch) per resource
pub type TimestampMap = HashMap<ResourceId, u64>;

/// One entry of a live snapshot
///
/// Snapshots are fetched fresh for every pass and never cached, because
/// liveness can change between passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Resource identifier
    pub id: ResourceId,

    /// Grouping key for sibling protection (canonical URL)
    pub identity_key: IdentityKey,

    /// Display title
    pub title: String,

    /// Icon reference, if the host reported one
    pub icon_url: Option<String>,

    /// Pinned by the user
    pub pinned: bool,

    /// Currently the active tab of its window
    pub active: bool,
}

impl Resource {
    /// Create an unpinned, inactive resource with an empty title
    ///
    /// # Examples
    ///
    /// ```
    /// use tabsweep_domain::Resource;
    ///
    /// let tab = Resource::new("1", "https://example.com").pinned();
    /// assert!(tab.pinned);
    /// assert!(!tab.active);
    /// ```
    pub fn new(id: impl Into<String>, identity_key: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(id),
            identity_key: IdentityKey::new(identity_key),
            title: String::new(),
            icon_url: None,
            pinned: false,
            active: false,
        }
    }

    /// Builder: mark as pinned
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Builder: mark as active
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Builder: set the display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
