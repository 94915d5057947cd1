//! Entity handles and allocation.
//!
//! An [`Entity`] is an opaque `u64` handle owned by the host's entity store.
//! The spawning core never dereferences a handle directly; it asks the store
//! whether the entity still exists and what capabilities it carries.

use serde::{Deserialize, Serialize};

/// An opaque entity handle.
///
/// Handles are cheap to copy and compare. A handle may outlive the entity it
/// names (a spawned mob keeps its parent's handle after the spawner block is
/// broken), so every resolver must tolerate a stale or [`Entity::INVALID`]
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// The null handle. Never returned by [`EntityAllocator::allocate`].
    pub const INVALID: Entity = Entity(0);

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is the null handle.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out fresh, never-reused entity handles starting at 1.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocate the next handle.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next_id);
        self.next_id += 1;
        entity
    }

    /// Number of handles handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
