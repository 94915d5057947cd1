//! Spawn driver.
//!
//! The host forwards lifecycle events and fired cadences to a single
//! [`SpawnDriver`]. A spawner pass runs in this order:
//!
//! 1. Drop the pass if the previous one was less than the gate interval ago.
//! 2. Sample the global cap and the live AI population once.
//! 3. For each registered spawner: resolve its position, check its cadence,
//!    check the cap, draw a template, find a position, check the item cost,
//!    and instantiate with a parent link. The item is taken only once the
//!    entity exists.
//!
//! A failure at any step, including a spawner that is not yet due, only
//! skips that spawner. Reaching the cap ends the pass.

use std::sync::Arc;

use engine_component::{Component, Entity, SimpleAiComponent, SpawnerComponent};
use engine_math::Vec3;
use tracing::{debug, info, trace, warn};

use crate::config::SpawnConfig;
use crate::context::SpawnContext;
use crate::error::{SkipReason, SpawnError, StoreError};
use crate::governor::PopulationGovernor;
use crate::host::{ActionFired, DelayScheduler, EntityStore, TemplateCatalogue};
use crate::placement::{PlacementFinder, PlacementRequest};
use crate::player::{PlayerCadences, around_player, template_of_action};
use crate::registry::{PERIODIC_SPAWNING, SpawnerRegistry};
use crate::selector::CandidateSelector;
use crate::tag_index::TagIndex;
use crate::template::Template;

/// Everything decided for one spawn before it is committed.
#[derive(Debug, Clone)]
pub struct SpawnSession {
    /// The spawner, or the player in player-anchored mode.
    pub spawner: Entity,
    pub now_ms: u64,
    pub origin: Vec3,
    pub template: Arc<Template>,
    pub position: Vec3,
}

/// An entity created during a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    pub entity: Entity,
    pub parent: Entity,
    pub template_id: String,
    pub position: Vec3,
}

/// What a driver entry point did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub now_ms: u64,
    /// A spawner pass ran.
    pub pass: bool,
    /// The pass was dropped by the global gate.
    pub throttled: bool,
    /// The pass ended early at the population cap.
    pub capped: bool,
    /// Cap sampled at the start of the pass.
    pub global_cap: usize,
    /// AI population sampled at the start of the pass.
    pub sampled_population: usize,
    /// Spawners that got as far as drawing a template.
    pub attempts: usize,
    pub spawned: Vec<SpawnRecord>,
    pub skipped: Vec<(Entity, SkipReason)>,
}

impl TickReport {
    fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            ..Self::default()
        }
    }

    /// Record and log a skipped spawner at the severity its reason deserves.
    fn skip(&mut self, entity: Entity, reason: SkipReason) {
        match &reason {
            SkipReason::NoTags => {
                warn!(%entity, "spawner has no tags; skipping");
            }
            SkipReason::EmptyPool { tag } => {
                warn!(%entity, %tag, "no spawnable templates for tag; skipping");
            }
            SkipReason::Store(err) => {
                warn!(%entity, %err, "failed to create spawnable");
            }
            SkipReason::NoOpenPosition { max_offset } => {
                info!(%entity, max_offset, "no open position to spawn at");
            }
            SkipReason::UnknownTemplate { template } => {
                debug!(%entity, %template, "cadence refers to a template no longer in the catalogue");
            }
            SkipReason::NotLive => {
                debug!(%entity, "spawner no longer live");
            }
            other => {
                trace!(%entity, reason = %other, "spawner skipped");
            }
        }
        self.skipped.push((entity, reason));
    }

    /// Number of entities created.
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.spawned.len()
    }

    /// Whether any spawner was skipped for a reason matching `pred`.
    pub fn skipped_any(&self, pred: impl Fn(&SkipReason) -> bool) -> bool {
        self.skipped.iter().any(|(_, reason)| pred(reason))
    }
}

/// Owns the tag index, the spawner registry and the player cadences, and
/// turns fired cadences into spawned entities.
#[derive(Debug)]
pub struct SpawnDriver {
    config: SpawnConfig,
    index: TagIndex,
    registry: SpawnerRegistry,
    players: PlayerCadences,
    selector: CandidateSelector,
    placement: PlacementFinder,
    /// Simulation time of the last spawner pass that ran.
    last_pass_ms: u64,
}

impl SpawnDriver {
    /// A driver with an empty index. Call [`SpawnDriver::rebuild_index`] before
    /// expecting spawns.
    #[must_use]
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            selector: CandidateSelector::new(config.honor_probability),
            placement: PlacementFinder::new(config.max_offset),
            config,
            index: TagIndex::new(),
            registry: SpawnerRegistry::new(),
            players: PlayerCadences::new(),
            last_pass_ms: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    #[must_use]
    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    #[must_use]
    pub fn registry(&self) -> &SpawnerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SpawnerRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn players(&self) -> &PlayerCadences {
        &self.players
    }

    /// Handle a catalogue change notification.
    ///
    /// Swaps in a fresh index and re-synchronises player cadences with it.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Catalogue`] if the catalogue cannot be read; the
    /// previous index and all cadences are left untouched.
    pub fn rebuild_index(
        &mut self,
        catalogue: &dyn TemplateCatalogue,
        scheduler: &mut dyn DelayScheduler,
    ) -> Result<usize, SpawnError> {
        let count = self.index.rebuild(catalogue)?;
        if self.config.mode.player_anchored() {
            self.players.resync(&self.index.snapshot(), scheduler);
        }
        Ok(count)
    }

    /// A spawner component appeared on `entity`.
    ///
    /// Returns `true` if the spawner was registered.
    pub fn on_spawner_added(
        &mut self,
        entity: Entity,
        spawner: SpawnerComponent,
        store: &dyn EntityStore,
        scheduler: &mut dyn DelayScheduler,
    ) -> bool {
        if !self.config.mode.spawner_anchored() {
            debug!(%entity, "spawner-anchored spawning disabled; ignoring spawner");
            return false;
        }
        let has_location = store.world_position(entity).is_some();
        self.registry
            .on_spawner_added(entity, spawner, has_location, scheduler)
    }

    /// A spawner component is about to leave `entity`.
    pub fn on_spawner_removed(&mut self, entity: Entity, scheduler: &mut dyn DelayScheduler) -> bool {
        self.registry.on_spawner_removed(entity, scheduler)
    }

    /// A player joined. Returns the number of cadences armed for them.
    pub fn on_player_connected(&mut self, player: Entity, scheduler: &mut dyn DelayScheduler) -> usize {
        if !self.config.mode.player_anchored() {
            return 0;
        }
        self.players
            .on_player_connected(player, &self.index.snapshot(), scheduler)
    }

    /// A player left. Returns the number of cadences cancelled.
    pub fn on_player_disconnected(&mut self, player: Entity, scheduler: &mut dyn DelayScheduler) -> usize {
        self.players.on_player_disconnected(player, scheduler)
    }

    /// Route a fired cadence.
    ///
    /// Spawner cadences trigger a full spawner pass (subject to the gate) as
    /// long as the firing spawner is still registered. Player cadences spawn
    /// their template near the player. Anything else is ignored.
    pub fn on_action(&mut self, ctx: &mut SpawnContext<'_>, fired: &ActionFired) -> TickReport {
        if fired.action_id == PERIODIC_SPAWNING {
            if !self.registry.contains(fired.entity) {
                let mut report = TickReport::new(fired.now_ms);
                report.skip(fired.entity, SkipReason::NotLive);
                return report;
            }
            return self.on_tick(ctx, fired.now_ms);
        }

        if let Some(template_id) = template_of_action(&fired.action_id)
            && self.config.mode.player_anchored()
        {
            return self.spawn_near_player(ctx, fired.entity, template_id, fired.now_ms);
        }

        trace!(entity = %fired.entity, action = %fired.action_id, "ignoring unrelated action");
        TickReport::new(fired.now_ms)
    }

    /// Run one spawner pass at `now_ms`.
    pub fn on_tick(&mut self, ctx: &mut SpawnContext<'_>, now_ms: u64) -> TickReport {
        let mut report = TickReport::new(now_ms);

        // Simulation time is a 64-bit millisecond count; it does not wrap in
        // practice, but a host may restart it.
        if now_ms < self.last_pass_ms {
            self.last_pass_ms = now_ms;
        }
        if now_ms - self.last_pass_ms < self.config.global_tick_gate_ms {
            report.throttled = true;
            return report;
        }
        self.last_pass_ms = now_ms;
        report.pass = true;

        let snapshot = self.index.snapshot();
        let mut governor = PopulationGovernor::sample(self.registry.global_cap(), &*ctx.store);
        report.global_cap = governor.global_cap();
        report.sampled_population = governor.population();
        debug!(
            now_ms,
            spawners = self.registry.len(),
            population = governor.population(),
            global_cap = governor.global_cap(),
            headroom = governor.headroom(),
            "spawn pass"
        );

        for owner in self.registry.entities() {
            let Some(origin) = ctx.store.world_position(owner) else {
                report.skip(owner, SkipReason::NotLive);
                continue;
            };
            let Some(spawner) = self.registry.get_mut(owner) else {
                report.skip(owner, SkipReason::NotLive);
                continue;
            };

            if spawner.last_tick_ms > now_ms {
                spawner.last_tick_ms = now_ms;
                report.skip(owner, SkipReason::ClockReset);
                continue;
            }
            let elapsed = now_ms - spawner.last_tick_ms;
            if elapsed < spawner.period_ms {
                report.skip(
                    owner,
                    SkipReason::NotDue {
                        remaining_ms: spawner.period_ms - elapsed,
                    },
                );
                continue;
            }
            spawner.last_tick_ms = now_ms;

            if !governor.admit(spawner) {
                info!(
                    population = governor.population(),
                    global_cap = governor.global_cap(),
                    "population at cap; ending spawn pass"
                );
                report.capped = true;
                break;
            }

            report.attempts += 1;
            let candidate =
                match self
                    .selector
                    .select(&spawner.accepted_tags, &snapshot, ctx.clock, &mut *ctx.rng)
                {
                    Ok(candidate) => candidate,
                    Err(reason) => {
                        report.skip(owner, reason);
                        continue;
                    }
                };

            let request = PlacementRequest::for_spawner(spawner, origin);
            let position = match self.placement.find(&request, ctx.world, &mut *ctx.rng) {
                Ok(position) => position,
                Err(reason) => {
                    report.skip(owner, reason);
                    continue;
                }
            };

            if let Err(reason) = check_item_cost(ctx, owner, &candidate.template) {
                report.skip(owner, reason);
                continue;
            }

            let session = SpawnSession {
                spawner: owner,
                now_ms,
                origin,
                template: candidate.template,
                position,
            };
            match commit(ctx, &session, self.config.attach_default_ai) {
                Ok(record) => {
                    governor.record_spawn();
                    pay_item_cost(ctx, owner, &session.template);
                    report.spawned.push(record);
                }
                Err(failure) => {
                    if failure.created.is_some() {
                        governor.record_spawn();
                    }
                    report.skip(owner, SkipReason::Store(failure.error));
                }
            }
        }

        report
    }

    /// Spawn `template_id` near `player`, on that template's own cadence.
    ///
    /// A template with an item cost is paid from the player's inventory.
    pub fn spawn_near_player(
        &mut self,
        ctx: &mut SpawnContext<'_>,
        player: Entity,
        template_id: &str,
        now_ms: u64,
    ) -> TickReport {
        let mut report = TickReport::new(now_ms);

        if !self.players.is_connected(player) {
            report.skip(player, SkipReason::NotLive);
            return report;
        }
        let snapshot = self.index.snapshot();
        let Some(template) = snapshot.template(template_id).cloned() else {
            report.skip(
                player,
                SkipReason::UnknownTemplate {
                    template: template_id.to_string(),
                },
            );
            return report;
        };
        let Some(origin) = ctx.players.position(player) else {
            report.skip(player, SkipReason::NotLive);
            return report;
        };

        let governor =
            PopulationGovernor::sample(self.config.player_population_cap as usize, &*ctx.store);
        report.global_cap = governor.global_cap();
        report.sampled_population = governor.population();
        if !governor.admits() {
            info!(
                %player,
                population = governor.population(),
                global_cap = governor.global_cap(),
                "population at cap; skipping player spawn"
            );
            report.capped = true;
            return report;
        }

        report.attempts += 1;
        if let Err(reason) = self.selector.admit(&template, ctx.clock, &mut *ctx.rng) {
            report.skip(player, reason);
            return report;
        }

        let around = around_player(origin, template.radius_from_player, &mut *ctx.rng);
        let Some(position) = self.placement.ground_height(around, ctx.world) else {
            report.skip(
                player,
                SkipReason::NoOpenPosition {
                    max_offset: self.placement.max_offset(),
                },
            );
            return report;
        };

        if let Err(reason) = check_item_cost(ctx, player, &template) {
            report.skip(player, reason);
            return report;
        }

        let session = SpawnSession {
            spawner: player,
            now_ms,
            origin,
            template,
            position,
        };
        match commit(ctx, &session, self.config.attach_default_ai) {
            Ok(record) => {
                pay_item_cost(ctx, player, &session.template);
                report.spawned.push(record);
            }
            Err(failure) => report.skip(player, SkipReason::Store(failure.error)),
        }
        report
    }
}

/// A commit that stopped part way.
#[derive(Debug)]
struct CommitFailure {
    /// The entity, if the store created it before the failing step.
    created: Option<Entity>,
    error: StoreError,
}

/// Whether the holder can pay the template's item cost. Without an
/// inventory nothing is charged.
fn check_item_cost(
    ctx: &SpawnContext<'_>,
    holder: Entity,
    template: &Template,
) -> Result<(), SkipReason> {
    if let Some(item) = &template.item_to_consume
        && let Some(inventory) = ctx.inventory.as_deref()
        && !inventory.holds(holder, item)
    {
        return Err(SkipReason::MissingItem { item: item.clone() });
    }
    Ok(())
}

/// Take the template's item cost from the holder once its spawn exists.
fn pay_item_cost(ctx: &mut SpawnContext<'_>, holder: Entity, template: &Template) {
    if let Some(item) = &template.item_to_consume
        && let Some(inventory) = ctx.inventory.as_deref_mut()
        && !inventory.try_consume(holder, item)
    {
        warn!(%holder, %item, "item vanished between check and spawn");
    }
}

/// Instantiate the session's template and link it back to its spawner.
fn commit(
    ctx: &mut SpawnContext<'_>,
    session: &SpawnSession,
    attach_default_ai: bool,
) -> Result<SpawnRecord, CommitFailure> {
    let entity = ctx
        .store
        .instantiate(&session.template, session.position)
        .map_err(|error| CommitFailure {
            created: None,
            error,
        })?;
    let linked = ctx.store.set_parent(entity, session.spawner).and_then(|()| {
        if attach_default_ai {
            ctx.store
                .attach(entity, SimpleAiComponent::component_type_id())
        } else {
            Ok(())
        }
    });
    if let Err(error) = linked {
        warn!(%entity, parent = %session.spawner, %error, "spawned entity left unlinked");
        return Err(CommitFailure {
            created: Some(entity),
            error,
        });
    }
    info!(
        %entity,
        parent = %session.spawner,
        template = %session.template.id,
        now_ms = session.now_ms,
        x = session.position.x,
        y = session.position.y,
        z = session.position.z,
        distance = session.origin.distance(session.position),
        "spawned"
    );
    Ok(SpawnRecord {
        entity,
        parent: session.spawner,
        template_id: session.template.id.clone(),
        position: session.position,
    })
}
