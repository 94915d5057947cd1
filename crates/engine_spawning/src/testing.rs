//! In-memory collaborators for unit tests.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use engine_component::{Component, ComponentTypeId, Entity, EntityAllocator, SimpleAiComponent};
use engine_math::{IVec3, Vec3, block_of};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SpawnConfig;
use crate::context::SpawnContext;
use crate::driver::{SpawnDriver, TickReport};
use crate::error::StoreError;
use crate::host::{
    ActionFired, Block, DayNightClock, DelayScheduler, EntityStore, Inventory, PlayerLocator,
    WorldGrid,
};
use crate::template::Template;

const STONE: &str = "engine:stone";

/// Flat world: solid below `ground`, air at and above, plus per-cell overrides.
pub(crate) struct TestWorld {
    ground: i32,
    overrides: HashMap<IVec3, bool>,
}

impl TestWorld {
    pub(crate) fn flat(ground: i32) -> Self {
        Self {
            ground,
            overrides: HashMap::new(),
        }
    }

    pub(crate) fn solid() -> Self {
        Self::flat(i32::MAX)
    }

    pub(crate) fn with_air(mut self, cell: IVec3) -> Self {
        self.overrides.insert(cell, false);
        self
    }
}

impl WorldGrid for TestWorld {
    fn block_at(&self, position: Vec3) -> Block<'_> {
        let cell = block_of(position);
        let solid = self
            .overrides
            .get(&cell)
            .copied()
            .unwrap_or(cell.y < self.ground);
        if solid { Block::new(STONE, false) } else { Block::air() }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock(pub bool);

impl FixedClock {
    pub(crate) const DAY: FixedClock = FixedClock(false);
    pub(crate) const NIGHT: FixedClock = FixedClock(true);
}

impl DayNightClock for FixedClock {
    fn is_night(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestPlayers {
    pub(crate) positions: BTreeMap<Entity, Vec3>,
}

impl PlayerLocator for TestPlayers {
    fn position(&self, player: Entity) -> Option<Vec3> {
        self.positions.get(&player).copied()
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestStore {
    allocator: EntityAllocator,
    positions: BTreeMap<Entity, Vec3>,
    capabilities: BTreeMap<Entity, BTreeSet<ComponentTypeId>>,
    parents: BTreeMap<Entity, Entity>,
    templates: BTreeMap<Entity, String>,
    population_queries: Cell<usize>,
    pub(crate) refuse_instantiation: bool,
    pub(crate) refuse_parenting: bool,
}

impl TestStore {
    pub(crate) fn allocate(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.capabilities.insert(entity, BTreeSet::new());
        entity
    }

    pub(crate) fn place(&mut self, entity: Entity, position: Vec3) {
        self.capabilities.entry(entity).or_default();
        self.positions.insert(entity, position);
    }

    pub(crate) fn destroy(&mut self, entity: Entity) {
        self.positions.remove(&entity);
        self.capabilities.remove(&entity);
        self.parents.remove(&entity);
        self.templates.remove(&entity);
    }

    pub(crate) fn add_ai_entities(&mut self, count: usize) {
        for _ in 0..count {
            let entity = self.allocate();
            let _ = self.attach(entity, SimpleAiComponent::component_type_id());
        }
    }

    pub(crate) fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.parents.get(&entity).copied()
    }

    pub(crate) fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.positions.get(&entity).copied()
    }

    /// How many times the AI population was counted.
    pub(crate) fn population_queries(&self) -> usize {
        self.population_queries.get()
    }

    /// Template ids of every instantiated entity, in creation order.
    pub(crate) fn spawned_templates(&self) -> Vec<String> {
        self.templates.values().cloned().collect()
    }
}

impl EntityStore for TestStore {
    fn instantiate(&mut self, template: &Template, position: Vec3) -> Result<Entity, StoreError> {
        if self.refuse_instantiation {
            return Err(StoreError::Instantiate {
                template: template.id.clone(),
                reason: "refused".to_string(),
            });
        }
        let entity = self.allocate();
        self.positions.insert(entity, position);
        self.templates.insert(entity, template.id.clone());
        Ok(entity)
    }

    fn count_with_ai_component(&self) -> usize {
        self.population_queries.set(self.population_queries.get() + 1);
        let ai = SimpleAiComponent::component_type_id();
        self.capabilities.values().filter(|caps| caps.contains(&ai)).count()
    }

    fn attach(&mut self, entity: Entity, capability: ComponentTypeId) -> Result<(), StoreError> {
        self.capabilities
            .get_mut(&entity)
            .ok_or(StoreError::UnknownEntity(entity))?
            .insert(capability);
        Ok(())
    }

    fn set_parent(&mut self, entity: Entity, parent: Entity) -> Result<(), StoreError> {
        if self.refuse_parenting || !self.capabilities.contains_key(&entity) {
            return Err(StoreError::UnknownEntity(entity));
        }
        self.parents.insert(entity, parent);
        Ok(())
    }

    fn world_position(&self, entity: Entity) -> Option<Vec3> {
        self.positions.get(&entity).copied()
    }
}

/// Records armed cadences as `(initial_delay_ms, period_ms)`.
#[derive(Debug, Default)]
pub(crate) struct RecordingScheduler {
    actions: BTreeMap<(Entity, String), (u64, u64)>,
}

impl RecordingScheduler {
    pub(crate) fn cadence(&self, entity: Entity, action_id: &str) -> Option<(u64, u64)> {
        self.actions.get(&(entity, action_id.to_string())).copied()
    }

    pub(crate) fn armed(&self) -> usize {
        self.actions.len()
    }
}

impl DelayScheduler for RecordingScheduler {
    fn add_periodic(&mut self, entity: Entity, action_id: &str, initial_delay_ms: u64, period_ms: u64) {
        self.actions
            .insert((entity, action_id.to_string()), (initial_delay_ms, period_ms));
    }

    fn cancel(&mut self, entity: Entity, action_id: &str) {
        self.actions.remove(&(entity, action_id.to_string()));
    }

    fn has(&self, entity: Entity, action_id: &str) -> bool {
        self.actions.contains_key(&(entity, action_id.to_string()))
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestInventory {
    items: BTreeMap<(Entity, String), u32>,
}

impl TestInventory {
    pub(crate) fn give(&mut self, holder: Entity, item: &str, count: u32) {
        *self.items.entry((holder, item.to_string())).or_default() += count;
    }

    pub(crate) fn count(&self, holder: Entity, item: &str) -> u32 {
        self.items
            .get(&(holder, item.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl Inventory for TestInventory {
    fn holds(&self, holder: Entity, item: &str) -> bool {
        self.count(holder, item) > 0
    }

    fn try_consume(&mut self, holder: Entity, item: &str) -> bool {
        match self.items.get_mut(&(holder, item.to_string())) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// A driver wired to in-memory collaborators over a flat world at ground 0.
pub(crate) struct Harness {
    pub(crate) driver: SpawnDriver,
    pub(crate) store: TestStore,
    pub(crate) world: TestWorld,
    pub(crate) clock: FixedClock,
    pub(crate) players: TestPlayers,
    pub(crate) scheduler: RecordingScheduler,
    pub(crate) inventory: TestInventory,
    pub(crate) rng: ChaCha8Rng,
}

impl Harness {
    pub(crate) fn new(config: SpawnConfig, catalogue: Vec<Template>) -> Self {
        let mut harness = Self {
            driver: SpawnDriver::new(config),
            store: TestStore::default(),
            world: TestWorld::flat(0),
            clock: FixedClock::DAY,
            players: TestPlayers::default(),
            scheduler: RecordingScheduler::default(),
            inventory: TestInventory::default(),
            rng: ChaCha8Rng::seed_from_u64(0x5EED),
        };
        harness.rebuild(catalogue);
        harness
    }

    pub(crate) fn rebuild(&mut self, catalogue: Vec<Template>) {
        self.driver
            .rebuild_index(&catalogue, &mut self.scheduler)
            .expect("in-memory catalogue always lists");
    }

    pub(crate) fn add_spawner(
        &mut self,
        position: Vec3,
        spawner: engine_component::SpawnerComponent,
    ) -> Entity {
        let entity = self.store.allocate();
        self.store.place(entity, position);
        assert!(
            self.driver
                .on_spawner_added(entity, spawner, &self.store, &mut self.scheduler)
        );
        entity
    }

    pub(crate) fn add_player(&mut self, position: Vec3) -> Entity {
        let player = self.store.allocate();
        self.players.positions.insert(player, position);
        self.driver.on_player_connected(player, &mut self.scheduler);
        player
    }

    pub(crate) fn tick(&mut self, now_ms: u64) -> TickReport {
        let mut ctx = SpawnContext::new(
            &mut self.store,
            &self.world,
            &self.clock,
            &self.players,
            &mut self.rng,
        );
        self.driver.on_tick(&mut ctx, now_ms)
    }

    pub(crate) fn tick_with_inventory(&mut self, now_ms: u64) -> TickReport {
        let mut ctx = SpawnContext::new(
            &mut self.store,
            &self.world,
            &self.clock,
            &self.players,
            &mut self.rng,
        )
        .with_inventory(&mut self.inventory);
        self.driver.on_tick(&mut ctx, now_ms)
    }

    pub(crate) fn fire_with_inventory(
        &mut self,
        entity: Entity,
        action_id: &str,
        now_ms: u64,
    ) -> TickReport {
        let fired = ActionFired {
            entity,
            action_id: action_id.to_string(),
            now_ms,
        };
        let mut ctx = SpawnContext::new(
            &mut self.store,
            &self.world,
            &self.clock,
            &self.players,
            &mut self.rng,
        )
        .with_inventory(&mut self.inventory);
        self.driver.on_action(&mut ctx, &fired)
    }

    pub(crate) fn fire(&mut self, entity: Entity, action_id: &str, now_ms: u64) -> TickReport {
        let fired = ActionFired {
            entity,
            action_id: action_id.to_string(),
            now_ms,
        };
        let mut ctx = SpawnContext::new(
            &mut self.store,
            &self.world,
            &self.clock,
            &self.players,
            &mut self.rng,
        );
        self.driver.on_action(&mut ctx, &fired)
    }
}
