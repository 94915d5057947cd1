//! The [`Component`] trait and component identity.
//!
//! Hosts identify capabilities ("has a location", "is AI-driven") by
//! [`ComponentTypeId`], a stable hash of the component's name. Two processes
//! that agree on the name agree on the ID, so a host written against a
//! different entity store can still answer `count_with_ai_component`.

use serde::{Deserialize, Serialize};

/// Stable identifier for a component type: FNV-1a 64 over the UTF-8 name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Hash a component name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for byte in name: hash = (hash ^ byte) * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// The ID of component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

/// Data that can be attached to an entity.
///
/// Components are plain serialisable values so that they can be authored in
/// scene and prefab files.
pub trait Component: Send + Sync + 'static + Serialize + for<'de> Deserialize<'de> {
    /// Name used for identity and diagnostics (e.g. `"Spawner"`).
    fn type_name() -> &'static str;

    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}
