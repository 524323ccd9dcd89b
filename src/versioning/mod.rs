//! Version allocation and the on-disk version catalog.
//!
//! The allocator is the only component in the crate that touches shared
//! mutable state: a per-persona version counter. Every allocation routes
//! the read-max/write-next sequence through a mutex scoped to the persona
//! key, so concurrent builds of the same persona receive consecutive
//! versions with no duplicates and no gaps, while builds of different
//! personas never block each other.

pub mod allocator;
pub mod catalog;
pub mod store;

pub use allocator::{KeyedLocks, VersionAllocator, VersionStore};
pub use catalog::{list_personas, next_version, persona_versions, PersonaSummary, PersonaVersions, VersionInfo};
pub use store::{DirVersionStore, MemoryVersionStore};
