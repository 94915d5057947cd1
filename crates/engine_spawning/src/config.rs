//! Deployment configuration for the spawn driver.

use serde::{Deserialize, Serialize};

/// Vertical search window for open space, in blocks.
pub const MAX_OFFSET: i32 = 30;
/// Minimum milliseconds between two spawner passes.
pub const GLOBAL_TICK_GATE_MS: u64 = 1_000;
/// Population ceiling for player-anchored spawns.
pub const DEFAULT_PLAYER_POPULATION_CAP: u32 = 16;

/// Which cadences drive spawning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// One cadence per spawner entity; spawns appear around the spawner.
    #[default]
    SpawnerAnchored,
    /// One cadence per (player, template); spawns appear around the player.
    PlayerAnchored,
    /// Both flavours at once.
    Both,
}

impl SpawnMode {
    #[must_use]
    pub fn spawner_anchored(self) -> bool {
        matches!(self, SpawnMode::SpawnerAnchored | SpawnMode::Both)
    }

    #[must_use]
    pub fn player_anchored(self) -> bool {
        matches!(self, SpawnMode::PlayerAnchored | SpawnMode::Both)
    }
}

/// Configuration for a [`SpawnDriver`](crate::driver::SpawnDriver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub mode: SpawnMode,
    /// Passes closer together than this are dropped.
    pub global_tick_gate_ms: u64,
    /// Vertical search window for open space.
    pub max_offset: i32,
    /// Give every spawned entity the default AI capability.
    pub attach_default_ai: bool,
    /// Roll each drawn template against `probability / 255`.
    pub honor_probability: bool,
    /// Ceiling on AI-bearing entities for player-anchored spawns.
    pub player_population_cap: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            mode: SpawnMode::default(),
            global_tick_gate_ms: GLOBAL_TICK_GATE_MS,
            max_offset: MAX_OFFSET,
            attach_default_ai: true,
            honor_probability: true,
            player_population_cap: DEFAULT_PLAYER_POPULATION_CAP,
        }
    }
}

impl SpawnConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: SpawnMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_tick_gate(mut self, gate_ms: u64) -> Self {
        self.global_tick_gate_ms = gate_ms;
        self
    }

    #[must_use]
    pub fn with_default_ai(mut self, attach: bool) -> Self {
        self.attach_default_ai = attach;
        self
    }

    #[must_use]
    pub fn with_probability(mut self, honor: bool) -> Self {
        self.honor_probability = honor;
        self
    }

    #[must_use]
    pub fn with_player_population_cap(mut self, cap: u32) -> Self {
        self.player_population_cap = cap;
        self
    }
}
