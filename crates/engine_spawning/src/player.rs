//! Player-anchored cadences.
//!
//! In player-anchored mode each connected player carries one cadence per
//! template, keyed `Spawning:<template id>` and firing every
//! `spawn_gap_ms`. When a cadence fires, the template is spawned near the
//! player at `radius_from_player`.

use std::collections::{BTreeMap, BTreeSet};

use engine_component::Entity;
use engine_math::Vec3;
use tracing::{debug, info};

use crate::host::{DelayScheduler, RandomSource};
use crate::tag_index::TagSnapshot;

/// Prefix of player-anchored action ids.
pub const PLAYER_SPAWN_PREFIX: &str = "Spawning:";

/// Action id of the cadence for `template_id`.
#[must_use]
pub fn player_action_id(template_id: &str) -> String {
    format!("{PLAYER_SPAWN_PREFIX}{template_id}")
}

/// The template id a player-anchored action id refers to.
#[must_use]
pub fn template_of_action(action_id: &str) -> Option<&str> {
    action_id.strip_prefix(PLAYER_SPAWN_PREFIX)
}

/// Offset `origin` horizontally by `radius`.
///
/// With `u` uniform in `[0, 1)`, the point is `(x + u·r, z + sqrt(1 − u²)·r)`:
/// always exactly `radius` away, on the +x/+z quarter arc.
pub fn around_player(origin: Vec3, radius: f32, rng: &mut dyn RandomSource) -> Vec3 {
    let u = rng.next_float();
    Vec3::new(
        origin.x + u * radius,
        origin.y,
        origin.z + (1.0 - u * u).sqrt() * radius,
    )
}

/// Cadences armed for each connected player.
#[derive(Debug, Default)]
pub struct PlayerCadences {
    armed: BTreeMap<Entity, BTreeSet<String>>,
}

impl PlayerCadences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm one cadence per indexed template for `player`.
    ///
    /// Returns the number of cadences armed.
    pub fn on_player_connected(
        &mut self,
        player: Entity,
        index: &TagSnapshot,
        scheduler: &mut dyn DelayScheduler,
    ) -> usize {
        let armed = self.armed.entry(player).or_default();
        for template in index.templates() {
            if armed.insert(template.id.clone()) {
                let action = player_action_id(&template.id);
                scheduler.add_periodic(player, &action, template.spawn_gap_ms, template.spawn_gap_ms);
            }
        }
        info!(%player, cadences = armed.len(), "armed player spawn cadences");
        armed.len()
    }

    /// Cancel every cadence of `player`.
    ///
    /// Returns the number of cadences cancelled.
    pub fn on_player_disconnected(&mut self, player: Entity, scheduler: &mut dyn DelayScheduler) -> usize {
        let Some(armed) = self.armed.remove(&player) else {
            return 0;
        };
        for template_id in &armed {
            scheduler.cancel(player, &player_action_id(template_id));
        }
        info!(%player, cadences = armed.len(), "cancelled player spawn cadences");
        armed.len()
    }

    /// Bring every player's cadences in line with a rebuilt index: arm new
    /// templates, cancel vanished ones. Unchanged templates keep their phase.
    pub fn resync(&mut self, index: &TagSnapshot, scheduler: &mut dyn DelayScheduler) {
        let players: Vec<Entity> = self.armed.keys().copied().collect();
        for player in players {
            let stale: Vec<String> = self.armed[&player]
                .iter()
                .filter(|id| index.template(id).is_none())
                .cloned()
                .collect();
            for template_id in stale {
                self.forget(player, &template_id, scheduler);
            }
            self.on_player_connected(player, index, scheduler);
        }
    }

    /// Cancel the single cadence of `template_id` for `player`.
    pub fn forget(&mut self, player: Entity, template_id: &str, scheduler: &mut dyn DelayScheduler) {
        scheduler.cancel(player, &player_action_id(template_id));
        if let Some(armed) = self.armed.get_mut(&player) {
            armed.remove(template_id);
        }
        debug!(%player, template = template_id, "cancelled player spawn cadence");
    }

    #[must_use]
    pub fn is_connected(&self, player: Entity) -> bool {
        self.armed.contains_key(&player)
    }

    /// Number of cadences armed for `player`.
    #[must_use]
    pub fn cadences(&self, player: Entity) -> usize {
        self.armed.get(&player).map_or(0, BTreeSet::len)
    }
}
