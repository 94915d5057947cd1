//! Simulation loop.
//!
//! Each frame:
//!
//! 1. Advance simulated time by the fixed step.
//! 2. Move the day/night clock.
//! 3. Poll the scheduler for due actions.
//! 4. Route each still-armed action to the spawn driver.
//! 5. Fold the driver's reports into the run totals.

use engine_component::{Entity, SpawnerComponent};
use engine_math::Vec3;
use engine_spawning::{
    ActionFired, DelayScheduler, SpawnConfig, SpawnContext, SpawnDriver, SpawnError,
    TemplateCatalogue, TickReport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::clock::CycleClock;
use crate::config::SceneConfig;
use crate::scheduler::ActionScheduler;
use crate::world::{EntityTable, InventoryLedger, PlayerRoster, VoxelGrid};

/// Default simulated milliseconds per frame.
pub const DEFAULT_STEP_MS: u64 = 50;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub frames: u64,
    pub actions: u64,
    /// Spawner passes that got past the gate.
    pub passes: u64,
    pub throttled: u64,
    pub capped: u64,
    pub spawned: u64,
    pub skipped: u64,
}

impl RunTotals {
    fn absorb(&mut self, report: &TickReport) {
        self.actions += 1;
        if report.throttled {
            self.throttled += 1;
        }
        if report.pass {
            self.passes += 1;
        }
        if report.capped {
            self.capped += 1;
        }
        self.spawned += report.spawned.len() as u64;
        self.skipped += report.skipped.len() as u64;
    }
}

/// The host: world state, scheduler and spawn driver under one fixed-step loop.
#[derive(Debug)]
pub struct SimulationLoop {
    driver: SpawnDriver,
    scheduler: ActionScheduler,
    store: EntityTable,
    world: VoxelGrid,
    clock: CycleClock,
    players: PlayerRoster,
    inventory: InventoryLedger,
    rng: ChaCha8Rng,
    now_ms: u64,
    step_ms: u64,
    totals: RunTotals,
}

impl SimulationLoop {
    /// An empty world. Load a catalogue before placing anything.
    #[must_use]
    pub fn new(config: SpawnConfig, world: VoxelGrid, clock: CycleClock, seed: u64, step_ms: u64) -> Self {
        Self {
            driver: SpawnDriver::new(config),
            scheduler: ActionScheduler::new(),
            store: EntityTable::new(),
            world,
            clock,
            players: PlayerRoster::new(),
            inventory: InventoryLedger::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            now_ms: 0,
            step_ms: step_ms.max(1),
            totals: RunTotals::default(),
        }
    }

    /// Build the world described by `scene`, indexing `catalogue` first so
    /// players get their cadences on connect.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Catalogue`] if the catalogue cannot be read.
    pub fn from_scene(
        scene: &SceneConfig,
        catalogue: &dyn TemplateCatalogue,
        seed: u64,
        step_ms: u64,
    ) -> Result<Self, SpawnError> {
        let mut world = VoxelGrid::new(scene.ground_level);
        for block in &scene.blocks {
            world.set_block(block.cell, block.uri.clone());
        }

        let mut sim = Self::new(
            scene.spawning.clone(),
            world,
            CycleClock::new(scene.day_length_ms),
            seed,
            step_ms,
        );
        sim.load_catalogue(catalogue)?;

        for placement in &scene.spawners {
            let spawner = sim.place_spawner(placement.position, placement.spawner.clone());
            for (item, &count) in &placement.items {
                sim.inventory.give(spawner, item, count);
            }
        }
        for player in &scene.players {
            sim.connect_player(player.position);
        }
        Ok(sim)
    }

    /// Re-index `catalogue`. Called at startup and whenever it changes.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Catalogue`] if the catalogue cannot be read; the
    /// previous index stays active.
    pub fn load_catalogue(&mut self, catalogue: &dyn TemplateCatalogue) -> Result<usize, SpawnError> {
        self.driver.rebuild_index(catalogue, &mut self.scheduler)
    }

    /// Place a spawner block and register it.
    pub fn place_spawner(&mut self, position: Vec3, spawner: SpawnerComponent) -> Entity {
        let entity = self.store.spawn_spawner(position);
        self.driver
            .on_spawner_added(entity, spawner, &self.store, &mut self.scheduler);
        entity
    }

    /// Unregister and destroy a spawner. Its children stay.
    #[cfg(test)]
    pub fn remove_spawner(&mut self, spawner: Entity) -> bool {
        let was_registered = self.driver.on_spawner_removed(spawner, &mut self.scheduler);
        self.store.despawn(spawner);
        was_registered
    }

    pub fn connect_player(&mut self, position: Vec3) -> Entity {
        let player = self.store.spawn_empty();
        self.players.connect(player, position);
        self.driver.on_player_connected(player, &mut self.scheduler);
        player
    }

    #[cfg(test)]
    pub fn disconnect_player(&mut self, player: Entity) {
        self.driver.on_player_disconnected(player, &mut self.scheduler);
        self.players.disconnect(player);
        self.store.despawn(player);
    }

    /// Advance one frame. Returns the report of every action routed.
    pub fn step(&mut self) -> Vec<TickReport> {
        self.now_ms += self.step_ms;
        self.clock.set_time(self.now_ms);
        self.totals.frames += 1;

        let fired = self.scheduler.poll(self.now_ms);
        let mut reports = Vec::with_capacity(fired.len());
        for action in fired {
            // An earlier action this frame may have cancelled this one.
            if !self.scheduler.has(action.entity, &action.action_id) {
                continue;
            }
            let report = self.route(&action);
            self.totals.absorb(&report);
            reports.push(report);
        }
        reports
    }

    /// Run frames until `duration_ms` of simulated time has passed.
    pub fn run(&mut self, duration_ms: u64) -> RunTotals {
        let until = self.now_ms.saturating_add(duration_ms);
        info!(
            duration_ms,
            step_ms = self.step_ms,
            spawners = self.driver.registry().len(),
            "starting simulation"
        );
        while self.now_ms < until {
            self.step();
        }
        info!(
            frames = self.totals.frames,
            passes = self.totals.passes,
            spawned = self.totals.spawned,
            live = self.store.live(),
            "simulation complete"
        );
        self.totals
    }

    fn route(&mut self, action: &ActionFired) -> TickReport {
        debug!(entity = %action.entity, action = %action.action_id, now_ms = action.now_ms, "routing action");
        let mut ctx = SpawnContext::new(
            &mut self.store,
            &self.world,
            &self.clock,
            &self.players,
            &mut self.rng,
        )
        .with_inventory(&mut self.inventory);
        self.driver.on_action(&mut ctx, action)
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[cfg(test)]
    #[must_use]
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    #[must_use]
    pub fn driver(&self) -> &SpawnDriver {
        &self.driver
    }

    #[must_use]
    pub fn store(&self) -> &EntityTable {
        &self.store
    }

    #[cfg(test)]
    #[must_use]
    pub fn scheduler(&self) -> &ActionScheduler {
        &self.scheduler
    }

    #[cfg(test)]
    #[must_use]
    pub fn inventory(&self) -> &InventoryLedger {
        &self.inventory
    }
}
