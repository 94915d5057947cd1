//! In-memory world state for the reference host.
//!
//! - [`VoxelGrid`] — flat terrain with sparse block overrides.
//! - [`EntityTable`] — entity handles, locations, capabilities and spawn
//!   back-links.
//! - [`PlayerRoster`] — connected players and where they stand.
//! - [`InventoryLedger`] — item counts per holder.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use engine_component::{
    Component, ComponentTypeId, Entity, EntityAllocator, SimpleAiComponent, SpawnedComponent,
    SpawnerComponent,
};
use engine_math::{IVec3, Location, Vec3, block_of};
use engine_spawning::{
    AIR_URI, Block, EntityStore, Inventory, PlayerLocator, StoreError, Template, WorldGrid,
};
use tracing::debug;

/// URI of the terrain below ground level.
pub const STONE_URI: &str = "engine:stone";

/// Solid below `ground_level`, air from it upwards, with per-cell overrides.
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    ground_level: i32,
    overrides: HashMap<IVec3, String>,
}

impl VoxelGrid {
    #[must_use]
    pub fn new(ground_level: i32) -> Self {
        Self {
            ground_level,
            overrides: HashMap::new(),
        }
    }

    /// Replace the block in `cell`.
    pub fn set_block(&mut self, cell: IVec3, uri: impl Into<String>) {
        self.overrides.insert(cell, uri.into());
    }

    /// Restore `cell` to the terrain default.
    #[cfg(test)]
    pub fn clear_block(&mut self, cell: IVec3) {
        self.overrides.remove(&cell);
    }

    fn terrain(&self, cell: IVec3) -> &'static str {
        if cell.y < self.ground_level {
            STONE_URI
        } else {
            AIR_URI
        }
    }
}

impl WorldGrid for VoxelGrid {
    fn block_at(&self, position: Vec3) -> Block<'_> {
        let cell = block_of(position);
        let uri = self
            .overrides
            .get(&cell)
            .map_or_else(|| self.terrain(cell), String::as_str);
        Block::new(uri, uri == AIR_URI)
    }
}

/// Entity storage for the reference host.
///
/// Capabilities are tracked by [`ComponentTypeId`] only. Component data
/// that matters to spawning (location, back-link) is kept alongside.
#[derive(Debug, Default)]
pub struct EntityTable {
    allocator: EntityAllocator,
    capabilities: BTreeMap<Entity, BTreeSet<ComponentTypeId>>,
    locations: BTreeMap<Entity, Location>,
    templates: BTreeMap<Entity, String>,
    spawned: BTreeMap<Entity, SpawnedComponent>,
}

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity with no capabilities.
    pub fn spawn_empty(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.capabilities.insert(entity, BTreeSet::new());
        entity
    }

    /// Allocate an entity placed at `position`.
    pub fn spawn_at(&mut self, position: Vec3) -> Entity {
        let entity = self.spawn_empty();
        self.place(entity, position);
        entity
    }

    /// Allocate a spawner block placed at `position`.
    pub fn spawn_spawner(&mut self, position: Vec3) -> Entity {
        let entity = self.spawn_at(position);
        self.grant(entity, SpawnerComponent::component_type_id());
        entity
    }

    /// Give `entity` a location, or move it.
    pub fn place(&mut self, entity: Entity, position: Vec3) {
        self.locations.insert(entity, Location::new(position));
        self.grant(entity, Location::component_type_id());
    }

    /// Take `entity` out of the world without destroying it.
    #[cfg(test)]
    pub fn unplace(&mut self, entity: Entity) {
        self.locations.remove(&entity);
        if let Some(caps) = self.capabilities.get_mut(&entity) {
            caps.remove(&Location::component_type_id());
        }
    }

    /// Destroy `entity`. Returns `true` if it existed.
    ///
    /// Children keep their dangling back-link.
    #[cfg(test)]
    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.locations.remove(&entity);
        self.templates.remove(&entity);
        self.spawned.remove(&entity);
        self.capabilities.remove(&entity).is_some()
    }

    #[cfg(test)]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.capabilities.contains_key(&entity)
    }

    #[cfg(test)]
    #[must_use]
    pub fn has(&self, entity: Entity, capability: ComponentTypeId) -> bool {
        self.capabilities
            .get(&entity)
            .is_some_and(|caps| caps.contains(&capability))
    }

    #[cfg(test)]
    #[must_use]
    pub fn spawned(&self, entity: Entity) -> Option<&SpawnedComponent> {
        self.spawned.get(&entity)
    }

    /// Entities whose back-link names `parent`.
    pub fn children_of(&self, parent: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.spawned
            .iter()
            .filter(move |(_, link)| link.parent == parent)
            .map(|(&entity, _)| entity)
    }

    /// Number of live entities instantiated from each template.
    #[must_use]
    pub fn census(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for template_id in self.templates.values() {
            *counts.entry(template_id.clone()).or_default() += 1;
        }
        counts
    }

    /// Live entities, spawners and players included.
    #[must_use]
    pub fn live(&self) -> usize {
        self.capabilities.len()
    }

    /// Handles handed out over the table's lifetime.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.allocator.allocated()
    }

    fn grant(&mut self, entity: Entity, capability: ComponentTypeId) {
        self.capabilities.entry(entity).or_default().insert(capability);
    }
}

impl EntityStore for EntityTable {
    fn instantiate(&mut self, template: &Template, position: Vec3) -> Result<Entity, StoreError> {
        if template.id.is_empty() {
            return Err(StoreError::Instantiate {
                template: template.id.clone(),
                reason: "template has no id".to_string(),
            });
        }
        let entity = self.spawn_at(position);
        self.templates.insert(entity, template.id.clone());
        debug!(%entity, template = %template.id, "instantiated");
        Ok(entity)
    }

    fn count_with_ai_component(&self) -> usize {
        let ai = SimpleAiComponent::component_type_id();
        self.capabilities
            .values()
            .filter(|caps| caps.contains(&ai))
            .count()
    }

    fn attach(&mut self, entity: Entity, capability: ComponentTypeId) -> Result<(), StoreError> {
        self.capabilities
            .get_mut(&entity)
            .ok_or(StoreError::UnknownEntity(entity))?
            .insert(capability);
        Ok(())
    }

    fn set_parent(&mut self, entity: Entity, parent: Entity) -> Result<(), StoreError> {
        let template_id = self
            .templates
            .get(&entity)
            .cloned()
            .ok_or(StoreError::UnknownEntity(entity))?;
        self.spawned.insert(
            entity,
            SpawnedComponent {
                template_id,
                parent,
            },
        );
        self.grant(entity, SpawnedComponent::component_type_id());
        Ok(())
    }

    fn world_position(&self, entity: Entity) -> Option<Vec3> {
        self.locations.get(&entity).map(|location| location.position)
    }
}

/// Connected players and their positions.
#[derive(Debug, Default)]
pub struct PlayerRoster {
    positions: BTreeMap<Entity, Vec3>,
}

impl PlayerRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, player: Entity, position: Vec3) {
        self.positions.insert(player, position);
    }

    #[cfg(test)]
    pub fn disconnect(&mut self, player: Entity) -> bool {
        self.positions.remove(&player).is_some()
    }

    /// Move a connected player. Unknown players are ignored.
    #[cfg(test)]
    pub fn move_to(&mut self, player: Entity, position: Vec3) {
        if let Some(current) = self.positions.get_mut(&player) {
            *current = position;
        }
    }
}

impl PlayerLocator for PlayerRoster {
    fn position(&self, player: Entity) -> Option<Vec3> {
        self.positions.get(&player).copied()
    }
}

/// Item counts per holder.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    stock: BTreeMap<(Entity, String), u32>,
}

impl InventoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn give(&mut self, holder: Entity, item: &str, count: u32) {
        *self.stock.entry((holder, item.to_string())).or_default() += count;
    }

    #[must_use]
    pub fn count(&self, holder: Entity, item: &str) -> u32 {
        self.stock
            .get(&(holder, item.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl Inventory for InventoryLedger {
    fn holds(&self, holder: Entity, item: &str) -> bool {
        self.count(holder, item) > 0
    }

    fn try_consume(&mut self, holder: Entity, item: &str) -> bool {
        match self.stock.get_mut(&(holder, item.to_string())) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}
