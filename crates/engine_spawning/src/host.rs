//! Contracts the host world must satisfy.
//!
//! The spawning core owns policy only. Entity storage, block geometry, time
//! of day, periodic scheduling and randomness all belong to the host and are
//! reached through the traits below. Every method is called from the
//! simulation thread; none of them may call back into the driver.

use engine_component::{ComponentTypeId, Entity};
use engine_math::Vec3;
use rand::Rng;

use crate::error::{CatalogueError, StoreError};
use crate::template::Template;

/// URI of the empty block, used by ground-height placement.
pub const AIR_URI: &str = "engine:air";

/// A single voxel as seen by placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    uri: &'a str,
    penetrable: bool,
}

impl<'a> Block<'a> {
    #[must_use]
    pub const fn new(uri: &'a str, penetrable: bool) -> Self {
        Self { uri, penetrable }
    }

    /// The empty block.
    #[must_use]
    pub const fn air() -> Block<'static> {
        Block::new(AIR_URI, true)
    }

    /// Whether an entity may occupy this block (air, water, foliage, ...).
    #[must_use]
    pub fn is_penetrable(&self) -> bool {
        self.penetrable
    }

    #[must_use]
    pub fn uri(&self) -> &'a str {
        self.uri
    }

    #[must_use]
    pub fn is_air(&self) -> bool {
        self.uri == AIR_URI
    }
}

/// Read-only view of the block grid.
pub trait WorldGrid {
    /// The block whose cell contains `position`.
    fn block_at(&self, position: Vec3) -> Block<'_>;
}

/// Time-of-day oracle.
pub trait DayNightClock {
    fn is_night(&self) -> bool;
}

/// Where connected players are.
pub trait PlayerLocator {
    /// `None` if the player is unknown or has no body in the world.
    fn position(&self, player: Entity) -> Option<Vec3>;
}

/// Entity storage and lifecycle, owned by the host.
pub trait EntityStore {
    /// Create an entity from `template` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Instantiate`] if the store cannot build the template.
    fn instantiate(&mut self, template: &Template, position: Vec3) -> Result<Entity, StoreError>;

    /// Number of live entities carrying the AI capability.
    fn count_with_ai_component(&self) -> usize;

    /// Give `entity` the capability identified by `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] if `entity` does not exist.
    fn attach(&mut self, entity: Entity, capability: ComponentTypeId) -> Result<(), StoreError>;

    /// Record `parent` as the back-reference of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] if `entity` does not exist.
    fn set_parent(&mut self, entity: Entity, parent: Entity) -> Result<(), StoreError>;

    /// World position of `entity`, or `None` if it has no location or is gone.
    fn world_position(&self, entity: Entity) -> Option<Vec3>;
}

/// Source of spawnable templates.
pub trait TemplateCatalogue {
    /// Every template that may be spawned.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogueError`] if the source cannot be read.
    fn list_spawnable(&self) -> Result<Vec<Template>, CatalogueError>;
}

impl TemplateCatalogue for [Template] {
    fn list_spawnable(&self) -> Result<Vec<Template>, CatalogueError> {
        Ok(self.to_vec())
    }
}

impl TemplateCatalogue for Vec<Template> {
    fn list_spawnable(&self) -> Result<Vec<Template>, CatalogueError> {
        Ok(self.clone())
    }
}

/// A periodic action that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFired {
    pub entity: Entity,
    pub action_id: String,
    pub now_ms: u64,
}

/// Keyed periodic actions. At most one action exists per `(entity, action_id)`.
pub trait DelayScheduler {
    /// Arm an action that first fires after `initial_delay_ms`, then every `period_ms`.
    fn add_periodic(&mut self, entity: Entity, action_id: &str, initial_delay_ms: u64, period_ms: u64);

    /// Disarm an action. Cancelling a missing action is a no-op.
    fn cancel(&mut self, entity: Entity, action_id: &str);

    fn has(&self, entity: Entity, action_id: &str) -> bool;
}

/// Item storage of spawners that pay for their spawns.
pub trait Inventory {
    /// Whether `holder` has at least one `item`.
    fn holds(&self, holder: Entity, item: &str) -> bool;

    /// Remove one `item` from `holder`. Returns `false` if none was held.
    fn try_consume(&mut self, holder: Entity, item: &str) -> bool;
}

/// Sequenced randomness.
pub trait RandomSource {
    /// Uniform in `[0, 1)`.
    fn next_float(&mut self) -> f32;

    /// Uniform in `[0, n)`. Returns `0` when `n == 0`.
    fn next_int(&mut self, n: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_float(&mut self) -> f32 {
        self.gen_range(0.0..1.0)
    }

    fn next_int(&mut self, n: usize) -> usize {
        if n == 0 { 0 } else { self.gen_range(0..n) }
    }
}
