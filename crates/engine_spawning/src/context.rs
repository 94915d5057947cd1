//! Per-pass collaborator bundle.

use crate::host::{DayNightClock, EntityStore, Inventory, PlayerLocator, RandomSource, WorldGrid};

/// Everything a spawn pass reads or writes outside the driver itself.
///
/// The host builds one of these for each fired action. The world grid, the
/// clock and the player positions are read-only for the duration of the pass.
pub struct SpawnContext<'a> {
    pub store: &'a mut dyn EntityStore,
    pub world: &'a dyn WorldGrid,
    pub clock: &'a dyn DayNightClock,
    pub players: &'a dyn PlayerLocator,
    pub rng: &'a mut dyn RandomSource,
    /// When absent, `item_to_consume` is not enforced.
    pub inventory: Option<&'a mut dyn Inventory>,
}

impl<'a> SpawnContext<'a> {
    /// Build a context without inventory enforcement.
    pub fn new(
        store: &'a mut dyn EntityStore,
        world: &'a dyn WorldGrid,
        clock: &'a dyn DayNightClock,
        players: &'a dyn PlayerLocator,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self {
            store,
            world,
            clock,
            players,
            rng,
            inventory: None,
        }
    }

    /// Enforce item costs against `inventory`.
    #[must_use]
    pub fn with_inventory(mut self, inventory: &'a mut dyn Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }
}
