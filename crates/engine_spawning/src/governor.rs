//! Aggregate population cap.
//!
//! The cap and the live population are sampled once at the start of a pass.
//! Every spawn made during the pass is added to the local count, so later
//! spawners in the same pass see the earlier ones without re-querying the
//! store.

use engine_component::SpawnerComponent;
use tracing::debug;

use crate::host::EntityStore;

/// Cap and population as seen by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationGovernor {
    global_cap: usize,
    population: usize,
}

impl PopulationGovernor {
    /// Sample the store's AI-bearing population against `global_cap`.
    #[must_use]
    pub fn sample(global_cap: usize, store: &dyn EntityStore) -> Self {
        let population = store.count_with_ai_component();
        debug!(population, global_cap, "sampled population");
        Self {
            global_cap,
            population,
        }
    }

    #[must_use]
    pub fn global_cap(&self) -> usize {
        self.global_cap
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.population
    }

    /// Spawns still allowed this pass.
    #[must_use]
    pub fn headroom(&self) -> usize {
        self.global_cap.saturating_sub(self.population)
    }

    /// Whether the cap still has room.
    #[must_use]
    pub fn admits(&self) -> bool {
        self.population < self.global_cap
    }

    /// Whether `spawner` may spawn. Spawners with a zero budget bypass the cap.
    #[must_use]
    pub fn admit(&self, spawner: &SpawnerComponent) -> bool {
        !spawner.is_governed() || self.admits()
    }

    /// Count a spawn made during this pass.
    pub fn record_spawn(&mut self) {
        self.population += 1;
    }
}
