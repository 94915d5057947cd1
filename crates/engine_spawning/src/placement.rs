//! Finding open space for a new entity.
//!
//! Two searches are offered:
//!
//! - [`PlacementFinder::find`] is used by spawners. It optionally scatters the
//!   origin horizontally, then looks for the nearest penetrable block above
//!   or below, alternating `+1, -1, +2, -2, ...` up to `max_offset`.
//! - [`PlacementFinder::ground_height`] is used around players. It walks down
//!   through air to the first solid block, or up through solid to the first
//!   air block, and stands the entity just above the transition.
//!
//! Both searches fail softly: the caller skips this attempt and tries again on
//! its next cadence.

use engine_component::SpawnerComponent;
use engine_math::{Vec3, lifted};

use crate::error::SkipReason;
use crate::host::{RandomSource, WorldGrid};

/// What a spawner asks placement for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub origin: Vec3,
    pub ranged: bool,
    pub range: f32,
    /// Squared distance; `0` disables the check.
    pub min_distance: f32,
}

impl PlacementRequest {
    /// Place directly at `origin`, no scatter.
    #[must_use]
    pub fn at(origin: Vec3) -> Self {
        Self {
            origin,
            ranged: false,
            range: 0.0,
            min_distance: 0.0,
        }
    }

    /// The request a spawner located at `origin` makes.
    #[must_use]
    pub fn for_spawner(spawner: &SpawnerComponent, origin: Vec3) -> Self {
        Self {
            origin,
            ranged: spawner.ranged,
            range: spawner.range,
            min_distance: spawner.min_distance,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementFinder {
    max_offset: i32,
}

impl PlacementFinder {
    #[must_use]
    pub fn new(max_offset: i32) -> Self {
        Self { max_offset }
    }

    #[must_use]
    pub fn max_offset(&self) -> i32 {
        self.max_offset
    }

    /// Pick a candidate for `request` and find open space around it.
    ///
    /// A ranged candidate that lands within `min_distance` fails immediately;
    /// there is no retry within the same attempt.
    ///
    /// # Errors
    ///
    /// [`SkipReason::TooClose`] or [`SkipReason::NoOpenPosition`].
    pub fn find(
        &self,
        request: &PlacementRequest,
        world: &dyn WorldGrid,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec3, SkipReason> {
        let candidate = if request.ranged {
            let dx = rng.next_float() * request.range;
            let dz = rng.next_float() * request.range;
            let candidate = Vec3::new(request.origin.x + dx, request.origin.y, request.origin.z + dz);
            if request.min_distance > 0.0
                && candidate.distance_squared(request.origin) < request.min_distance
            {
                return Err(SkipReason::TooClose);
            }
            candidate
        } else {
            request.origin
        };

        self.open_space(candidate, world)
            .ok_or(SkipReason::NoOpenPosition {
                max_offset: self.max_offset,
            })
    }

    /// Nearest penetrable block straight above or below `candidate`, preferring
    /// above at equal distance. The candidate's own block is not considered.
    #[must_use]
    pub fn open_space(&self, candidate: Vec3, world: &dyn WorldGrid) -> Option<Vec3> {
        (1..=self.max_offset).find_map(|offset| {
            let up = lifted(candidate, offset);
            if world.block_at(up).is_penetrable() {
                return Some(up);
            }
            let down = lifted(candidate, -offset);
            world.block_at(down).is_penetrable().then_some(down)
        })
    }

    /// Stand-on position in the column through `candidate`.
    ///
    /// Starting in air, descend until the block below is not air. Starting in
    /// anything else, climb to the first air block. Gives up after
    /// `max_offset` blocks.
    #[must_use]
    pub fn ground_height(&self, candidate: Vec3, world: &dyn WorldGrid) -> Option<Vec3> {
        if world.block_at(candidate).is_air() {
            (0..self.max_offset).find_map(|depth| {
                let here = lifted(candidate, -depth);
                let below = lifted(candidate, -depth - 1);
                (!world.block_at(below).is_air()).then_some(here)
            })
        } else {
            (1..=self.max_offset)
                .map(|height| lifted(candidate, height))
                .find(|above| world.block_at(*above).is_air())
        }
    }
}

impl Default for PlacementFinder {
    fn default() -> Self {
        Self::new(crate::config::MAX_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use engine_math::IVec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::testing::TestWorld;

    const ORIGIN: Vec3 = Vec3::new(0.5, 10.5, 0.5);

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_non_ranged_prefers_block_above() {
        let world = TestWorld::flat(11);
        let pos = PlacementFinder::default()
            .find(&PlacementRequest::at(ORIGIN), &world, &mut rng())
            .unwrap();
        assert_eq!(pos, Vec3::new(0.5, 11.5, 0.5));
    }

    #[test]
    fn test_falls_back_to_block_below() {
        // Solid everywhere except a pocket two blocks down.
        let world = TestWorld::solid().with_air(IVec3::new(0, 8, 0));
        let pos = PlacementFinder::default()
            .find(&PlacementRequest::at(ORIGIN), &world, &mut rng())
            .unwrap();
        assert_eq!(pos, Vec3::new(0.5, 8.5, 0.5));
        assert!(world.block_at(pos).is_penetrable());
    }

    #[test]
    fn test_open_at_max_offset_succeeds() {
        let world = TestWorld::solid().with_air(IVec3::new(0, 10 + 30, 0));
        let pos = PlacementFinder::new(30).open_space(ORIGIN, &world);
        assert_eq!(pos, Some(Vec3::new(0.5, 40.5, 0.5)));
    }

    #[test]
    fn test_solid_through_max_offset_fails() {
        let world = TestWorld::solid()
            .with_air(IVec3::new(0, 10 + 31, 0))
            .with_air(IVec3::new(0, 10 - 31, 0));
        let result = PlacementFinder::new(30).find(&PlacementRequest::at(ORIGIN), &world, &mut rng());
        assert_eq!(result, Err(SkipReason::NoOpenPosition { max_offset: 30 }));
    }

    #[test]
    fn test_origin_block_itself_is_not_considered() {
        let world = TestWorld::solid().with_air(IVec3::new(0, 10, 0));
        assert!(PlacementFinder::new(5).open_space(ORIGIN, &world).is_none());
    }

    #[test]
    fn test_ranged_scatter_stays_within_range() {
        let world = TestWorld::flat(0);
        let finder = PlacementFinder::default();
        let request = PlacementRequest {
            origin: Vec3::new(0.0, 0.0, 0.0),
            ranged: true,
            range: 20.0,
            min_distance: 0.0,
        };
        let mut rng = rng();
        for _ in 0..200 {
            let pos = finder.find(&request, &world, &mut rng).unwrap();
            assert!((0.0..20.0).contains(&pos.x));
            assert!((0.0..20.0).contains(&pos.z));
            assert!(world.block_at(pos).is_penetrable());
        }
    }

    #[test]
    fn test_min_distance_beyond_reach_always_rejects() {
        let world = TestWorld::flat(0);
        let request = PlacementRequest {
            origin: Vec3::ZERO,
            ranged: true,
            range: 20.0,
            min_distance: 10_000.0,
        };
        let mut rng = rng();
        for _ in 0..50 {
            assert_eq!(
                PlacementFinder::default().find(&request, &world, &mut rng),
                Err(SkipReason::TooClose)
            );
        }
    }

    #[test]
    fn test_ground_height_descends_through_air() {
        let world = TestWorld::flat(4);
        let pos = PlacementFinder::default().ground_height(Vec3::new(0.5, 12.5, 0.5), &world);
        assert_eq!(pos, Some(Vec3::new(0.5, 4.5, 0.5)));
    }

    #[test]
    fn test_ground_height_climbs_out_of_solid() {
        let world = TestWorld::flat(4);
        let pos = PlacementFinder::default().ground_height(Vec3::new(0.5, 1.5, 0.5), &world);
        assert_eq!(pos, Some(Vec3::new(0.5, 4.5, 0.5)));
    }

    #[test]
    fn test_ground_height_gives_up_over_a_void() {
        let world = TestWorld::flat(-1_000);
        assert!(PlacementFinder::new(30).ground_height(Vec3::ZERO, &world).is_none());
    }
}
