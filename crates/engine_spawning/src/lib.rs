//! # engine_spawning
//!
//! Decides when, what, and where to spawn mobs in a voxel world.
//!
//! The host owns the world, the entity store and the delayed-action
//! scheduler. This crate sees them only through the traits in [`host`], and
//! reacts to the events the host forwards to a [`SpawnDriver`]:
//!
//! - [`TagIndex`] — tag → spawnable templates, rebuilt on catalogue change.
//! - [`PlacementFinder`] — scatter around a spawner and find open space.
//! - [`CandidateSelector`] — uniform tag, uniform template, time-of-day and
//!   probability gates.
//! - [`PopulationGovernor`] — aggregate cap over AI-bearing entities.
//! - [`SpawnerRegistry`] — live spawners and their `PeriodicSpawning` cadence.
//! - [`PlayerCadences`] — per-player, per-template cadences for
//!   player-anchored spawning.
//! - [`SpawnDriver`] — runs spawn passes and commits the results.

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod governor;
pub mod host;
pub mod placement;
pub mod player;
pub mod registry;
pub mod selector;
pub mod tag_index;
pub mod template;

#[cfg(test)]
mod testing;

pub use config::{SpawnConfig, SpawnMode};
pub use context::SpawnContext;
pub use driver::{SpawnDriver, SpawnRecord, SpawnSession, TickReport};
pub use error::{CatalogueError, SkipReason, SpawnError, StoreError};
pub use governor::PopulationGovernor;
pub use host::{
    AIR_URI, ActionFired, Block, DayNightClock, DelayScheduler, EntityStore, Inventory,
    PlayerLocator, RandomSource, TemplateCatalogue, WorldGrid,
};
pub use placement::{PlacementFinder, PlacementRequest};
pub use player::{PLAYER_SPAWN_PREFIX, PlayerCadences, player_action_id};
pub use registry::{PERIODIC_SPAWNING, SpawnerRegistry};
pub use selector::{Candidate, CandidateSelector};
pub use tag_index::{TagIndex, TagSnapshot};
pub use template::{Period, Template};
