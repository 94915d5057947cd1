//! Registry of the host's live spawners and their cadences.
//!
//! The host reports spawner lifecycle events; the registry keeps exactly one
//! `PeriodicSpawning` cadence armed per registered spawner and holds the
//! spawner's mutable cadence state between passes.

use std::collections::BTreeMap;

use engine_component::{Entity, SpawnerComponent};
use engine_math::Vec3;
use tracing::{debug, info};

use crate::host::{DelayScheduler, EntityStore};

/// Action id of spawner-anchored cadences.
pub const PERIODIC_SPAWNING: &str = "PeriodicSpawning";

/// Registry of spawners that have a location in the world.
#[derive(Debug, Default)]
pub struct SpawnerRegistry {
    /// Keyed by the spawner's own entity handle.
    spawners: BTreeMap<Entity, SpawnerComponent>,
}

impl SpawnerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawner and arm its cadence.
    ///
    /// Spawners without a location (e.g. held in an inventory) are ignored.
    /// Registering an entity that is already registered replaces its
    /// component and re-arms its cadence, so at most one cadence exists.
    ///
    /// Returns `true` if the spawner was registered.
    pub fn on_spawner_added(
        &mut self,
        entity: Entity,
        spawner: SpawnerComponent,
        has_location: bool,
        scheduler: &mut dyn DelayScheduler,
    ) -> bool {
        if !has_location {
            debug!(%entity, "ignoring spawner without a location");
            return false;
        }

        if scheduler.has(entity, PERIODIC_SPAWNING) {
            scheduler.cancel(entity, PERIODIC_SPAWNING);
        }
        scheduler.add_periodic(entity, PERIODIC_SPAWNING, spawner.period_ms, spawner.period_ms);

        info!(
            %entity,
            period_ms = spawner.period_ms,
            tags = ?spawner.accepted_tags,
            "registered spawner"
        );
        self.spawners.insert(entity, spawner);
        true
    }

    /// Forget a spawner and cancel its cadence. Idempotent.
    ///
    /// Returns `true` if the spawner was registered.
    pub fn on_spawner_removed(&mut self, entity: Entity, scheduler: &mut dyn DelayScheduler) -> bool {
        if scheduler.has(entity, PERIODIC_SPAWNING) {
            scheduler.cancel(entity, PERIODIC_SPAWNING);
        }
        let removed = self.spawners.remove(&entity).is_some();
        if removed {
            info!(%entity, "unregistered spawner");
        }
        removed
    }

    /// Registered spawners the store still places in the world, with their
    /// positions.
    pub fn list_active<'a>(
        &'a self,
        store: &'a dyn EntityStore,
    ) -> impl Iterator<Item = (Entity, &'a SpawnerComponent, Vec3)> + 'a {
        self.spawners.iter().filter_map(|(&entity, spawner)| {
            store
                .world_position(entity)
                .map(|position| (entity, spawner, position))
        })
    }

    /// Handles of all registered spawners, in handle order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.spawners.keys().copied().collect()
    }

    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&SpawnerComponent> {
        self.spawners.get(&entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut SpawnerComponent> {
        self.spawners.get_mut(&entity)
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.spawners.contains_key(&entity)
    }

    /// Sum of every registered spawner's budget.
    #[must_use]
    pub fn global_cap(&self) -> usize {
        self.spawners
            .values()
            .map(|s| s.max_mobs_per_spawner as usize)
            .sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingScheduler, TestStore};

    fn cow_spawner() -> SpawnerComponent {
        SpawnerComponent::with_tags(["cow"])
    }

    #[test]
    fn test_added_spawner_arms_cadence() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        let spawner = Entity(5);
        assert!(registry.on_spawner_added(spawner, cow_spawner().period(2_000), true, &mut scheduler));
        assert!(registry.contains(spawner));
        assert_eq!(
            scheduler.cadence(spawner, PERIODIC_SPAWNING),
            Some((2_000, 2_000))
        );
    }

    #[test]
    fn test_spawner_without_location_is_ignored() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        assert!(!registry.on_spawner_added(Entity(5), cow_spawner(), false, &mut scheduler));
        assert!(registry.is_empty());
        assert_eq!(scheduler.armed(), 0);
    }

    #[test]
    fn test_remove_cancels_and_is_idempotent() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        registry.on_spawner_added(Entity(5), cow_spawner(), true, &mut scheduler);
        assert!(registry.on_spawner_removed(Entity(5), &mut scheduler));
        assert!(!registry.on_spawner_removed(Entity(5), &mut scheduler));
        assert!(!scheduler.has(Entity(5), PERIODIC_SPAWNING));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_remove_add_leaves_one_cadence() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        registry.on_spawner_added(Entity(5), cow_spawner(), true, &mut scheduler);
        registry.on_spawner_removed(Entity(5), &mut scheduler);
        registry.on_spawner_added(Entity(5), cow_spawner(), true, &mut scheduler);
        assert_eq!(scheduler.armed(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_double_add_replaces_cadence() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        registry.on_spawner_added(Entity(5), cow_spawner().period(1_000), true, &mut scheduler);
        registry.on_spawner_added(Entity(5), cow_spawner().period(3_000), true, &mut scheduler);
        assert_eq!(scheduler.armed(), 1);
        assert_eq!(scheduler.cadence(Entity(5), PERIODIC_SPAWNING), Some((3_000, 3_000)));
        assert_eq!(registry.get(Entity(5)).map(|s| s.period_ms), Some(3_000));
    }

    #[test]
    fn test_global_cap_sums_budgets() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        registry.on_spawner_added(Entity(1), cow_spawner().max_mobs(4), true, &mut scheduler);
        registry.on_spawner_added(Entity(2), cow_spawner().max_mobs(4), true, &mut scheduler);
        registry.on_spawner_added(Entity(3), cow_spawner().max_mobs(0), true, &mut scheduler);
        assert_eq!(registry.global_cap(), 8);
    }

    #[test]
    fn test_list_active_skips_spawners_that_lost_their_location() {
        let mut registry = SpawnerRegistry::new();
        let mut scheduler = RecordingScheduler::default();
        let mut store = TestStore::default();
        store.place(Entity(1), Vec3::new(0.0, 5.0, 0.0));
        registry.on_spawner_added(Entity(1), cow_spawner(), true, &mut scheduler);
        registry.on_spawner_added(Entity(2), cow_spawner(), true, &mut scheduler);

        let active: Vec<Entity> = registry.list_active(&store).map(|(e, _, _)| e).collect();
        assert_eq!(active, vec![Entity(1)]);
    }
}
