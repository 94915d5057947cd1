//! Components that drive and record spawning.
//!
//! - [`SpawnerComponent`] turns an entity (a block or a creature) into an emitter.
//! - [`SpawnedComponent`] is stamped on every entity a spawner creates.
//! - [`SimpleAiComponent`] marks AI-bearing entities; the population cap
//!   counts these.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::entity::Entity;

/// Default milliseconds between spawn attempts of one spawner.
pub const DEFAULT_SPAWN_PERIOD_MS: u64 = 5_000;
/// Default horizontal spread of ranged spawning, in blocks.
pub const DEFAULT_SPAWN_RANGE: f32 = 20.0;
/// Default contribution of one spawner to the global population cap.
pub const DEFAULT_MAX_MOBS_PER_SPAWNER: u32 = 16;

/// Emitter configuration and cadence state.
///
/// Authored in scene files; every field except `accepted_tags` has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerComponent {
    /// Tags this spawner draws from, in authoring order. Drawn uniformly.
    #[serde(alias = "types")]
    pub accepted_tags: Vec<String>,
    /// Simulation time of the last spawn attempt.
    pub last_tick_ms: u64,
    /// Minimum milliseconds between spawn attempts.
    pub period_ms: u64,
    /// Contribution to the global cap; `0` exempts this spawner from the cap.
    pub max_mobs_per_spawner: u32,
    /// Scatter spawns horizontally instead of stacking them on the spawner.
    pub ranged: bool,
    /// Horizontal scatter, in blocks, along +x and +z.
    pub range: f32,
    /// Minimum *squared* distance between origin and a scattered candidate.
    /// `0` disables the check.
    pub min_distance: f32,
}

impl SpawnerComponent {
    /// A spawner drawing from `tags` with default cadence and budget.
    #[must_use]
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted_tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn period(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms;
        self
    }

    #[must_use]
    pub fn max_mobs(mut self, max_mobs: u32) -> Self {
        self.max_mobs_per_spawner = max_mobs;
        self
    }

    /// Enable ranged spawning with the given scatter and squared minimum distance.
    #[must_use]
    pub fn ranged(mut self, range: f32, min_distance: f32) -> Self {
        self.ranged = true;
        self.range = range;
        self.min_distance = min_distance;
        self
    }

    /// Whether this spawner is subject to the global population cap.
    #[must_use]
    pub fn is_governed(&self) -> bool {
        self.max_mobs_per_spawner > 0
    }
}

impl Default for SpawnerComponent {
    fn default() -> Self {
        Self {
            accepted_tags: Vec::new(),
            last_tick_ms: 0,
            period_ms: DEFAULT_SPAWN_PERIOD_MS,
            max_mobs_per_spawner: DEFAULT_MAX_MOBS_PER_SPAWNER,
            ranged: false,
            range: DEFAULT_SPAWN_RANGE,
            min_distance: 0.0,
        }
    }
}

impl Component for SpawnerComponent {
    fn type_name() -> &'static str {
        "Spawner"
    }
}

/// Back-link from a spawned entity to whatever emitted it.
///
/// `parent` is a plain handle, not ownership: it dangles once the spawner is
/// destroyed, and nothing despawns children when that happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedComponent {
    /// Identifier of the template the entity was instantiated from.
    pub template_id: String,
    /// The spawner (or player) that caused the spawn.
    pub parent: Entity,
}

impl Component for SpawnedComponent {
    fn type_name() -> &'static str {
        "Spawnable"
    }
}

/// Marker for entities that run the default wandering AI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleAiComponent;

impl Component for SimpleAiComponent {
    fn type_name() -> &'static str {
        "SimpleAi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spawner = SpawnerComponent::default();
        assert_eq!(spawner.period_ms, 5_000);
        assert_eq!(spawner.max_mobs_per_spawner, 16);
        assert_eq!(spawner.range, 20.0);
        assert!(!spawner.ranged);
        assert!(spawner.is_governed());
    }

    #[test]
    fn test_deserialize_fills_defaults_and_accepts_types_alias() {
        let spawner: SpawnerComponent =
            serde_json::from_str(r#"{ "types": ["goblin", "spearman"], "ranged": true }"#).unwrap();
        assert_eq!(spawner.accepted_tags, vec!["goblin", "spearman"]);
        assert!(spawner.ranged);
        assert_eq!(spawner.period_ms, DEFAULT_SPAWN_PERIOD_MS);
        assert_eq!(spawner.last_tick_ms, 0);
    }

    #[test]
    fn test_zero_budget_is_ungoverned() {
        let spawner = SpawnerComponent::with_tags(["cow"]).max_mobs(0);
        assert!(!spawner.is_governed());
    }

    #[test]
    fn test_builder_ranged() {
        let spawner = SpawnerComponent::with_tags(["cow"]).ranged(8.0, 4.0).period(1_000);
        assert!(spawner.ranged);
        assert_eq!(spawner.range, 8.0);
        assert_eq!(spawner.min_distance, 4.0);
        assert_eq!(spawner.period_ms, 1_000);
    }
}
