//! tabsweep Domain Layer
//!
//! This crate contains the core vocabulary of tabsweep: the live resources
//! ("tabs") being tracked, the TTL settings, the protection rule and the
//! trait interfaces every other layer depends upon. It has ZERO external
//! dependencies.
//!
//! ## Key Concepts
//!
//! - **Resource**: a live, externally-managed tab with an id and an identity key
//! - **Identity key**: canonical URL shared by duplicated tabs
//! - **Settings**: the idle TTL (`maxAgeDays`), always strictly positive
//! - **Protection**: pinned or active tabs, and every tab sharing their identity key
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure policy only; persistence and the host live in other crates
//! - Trait definitions for all external interactions (store, provider,
//!   scheduler, badge)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod protection;
pub mod resource;
pub mod settings;
pub mod traits;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use protection::{is_protected, resolve_protected, ProtectedSet};
pub use resource::{IdentityKey, Resource, ResourceId, TimestampMap};
pub use settings::{InvalidTtl, Settings};
