//! # engine_math
//!
//! Math types for the voxel spawn engine. Re-exports [`glam`] for linear
//! algebra and defines the [`Location`] component plus block-grid helpers.

pub mod location;

// Re-export glam types for convenience.
pub use glam::{IVec3, Vec3};

pub use location::{Location, block_of, lifted};
