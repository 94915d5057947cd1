//! World-space location component and block-grid helpers.
//!
//! Positions are continuous (`Vec3`); the voxel grid is integral. A position
//! belongs to the block whose cell contains it, so conversion floors each
//! axis rather than truncating towards zero.

use engine_component::Component;
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Where an entity is in the world.
///
/// Entities without a `Location` (a spawner block sitting in an inventory,
/// for instance) are not part of the world and never spawn anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub position: Vec3,
}

impl Location {
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    /// The block cell containing this location.
    #[must_use]
    pub fn block(&self) -> IVec3 {
        block_of(self.position)
    }
}

impl Component for Location {
    fn type_name() -> &'static str {
        "Location"
    }
}

/// The block cell containing `position`.
#[must_use]
pub fn block_of(position: Vec3) -> IVec3 {
    position.floor().as_ivec3()
}

/// `position` moved vertically by a whole number of blocks.
#[must_use]
pub fn lifted(position: Vec3, blocks: i32) -> Vec3 {
    Vec3::new(position.x, position.y + blocks as f32, position.z)
}
