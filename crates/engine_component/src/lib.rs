//! # engine_component
//!
//! Entity handles and the components the spawning subsystem reads and writes.
//!
//! This crate provides:
//!
//! - [`Entity`] — opaque `u64` entity handles.
//! - [`EntityAllocator`] — monotonically increasing handle allocator.
//! - [`Component`] / [`ComponentTypeId`] — name-derived component identity.
//! - [`SpawnerComponent`], [`SpawnedComponent`], [`SimpleAiComponent`].

pub mod component;
pub mod entity;
pub mod spawn;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use spawn::{
    DEFAULT_MAX_MOBS_PER_SPAWNER, DEFAULT_SPAWN_PERIOD_MS, DEFAULT_SPAWN_RANGE, SimpleAiComponent,
    SpawnedComponent, SpawnerComponent,
};
