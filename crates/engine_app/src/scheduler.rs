//! Delayed-action scheduler.
//!
//! Keeps at most one periodic action per `(entity, action id)` pair. The
//! simulation loop polls it once per frame; every action whose due time has
//! passed fires once and is re-armed one period later.

#![allow(dead_code)]

use std::collections::BTreeMap;

use engine_component::Entity;
use engine_spawning::{ActionFired, DelayScheduler};
use tracing::{debug, trace};

/// One armed periodic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    due_ms: u64,
    period_ms: u64,
}

/// Periodic actions keyed by owner and action id.
#[derive(Debug, Default)]
pub struct ActionScheduler {
    actions: BTreeMap<(Entity, String), Armed>,
    /// Time of the last poll; new actions are armed relative to it.
    now_ms: u64,
}

impl ActionScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every action due at or before `now_ms`.
    ///
    /// Fired actions come out ordered by `(due_ms, entity, action_id)` and
    /// are re-armed for their next period. An action that fell more than one
    /// period behind fires once, not once per missed period.
    pub fn poll(&mut self, now_ms: u64) -> Vec<ActionFired> {
        self.now_ms = self.now_ms.max(now_ms);

        let mut due: Vec<(u64, Entity, String)> = self
            .actions
            .iter()
            .filter(|(_, armed)| armed.due_ms <= now_ms)
            .map(|((entity, action_id), armed)| (armed.due_ms, *entity, action_id.clone()))
            .collect();
        due.sort();

        let mut fired = Vec::with_capacity(due.len());
        for (due_ms, entity, action_id) in due {
            if let Some(armed) = self.actions.get_mut(&(entity, action_id.clone())) {
                let mut next = due_ms + armed.period_ms;
                if next <= now_ms {
                    debug!(%entity, action = %action_id, behind_ms = now_ms - due_ms, "skipping missed periods");
                    next = now_ms + armed.period_ms;
                }
                armed.due_ms = next;
            }
            trace!(%entity, action = %action_id, due_ms, "action fired");
            fired.push(ActionFired {
                entity,
                action_id,
                now_ms,
            });
        }
        fired
    }

    /// Next due time of an action, if it is armed.
    #[must_use]
    pub fn due(&self, entity: Entity, action_id: &str) -> Option<u64> {
        self.actions
            .get(&(entity, action_id.to_string()))
            .map(|armed| armed.due_ms)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl DelayScheduler for ActionScheduler {
    /// A period of zero is clamped to one millisecond.
    fn add_periodic(&mut self, entity: Entity, action_id: &str, initial_delay_ms: u64, period_ms: u64) {
        let armed = Armed {
            due_ms: self.now_ms + initial_delay_ms,
            period_ms: period_ms.max(1),
        };
        debug!(%entity, action = action_id, due_ms = armed.due_ms, period_ms = armed.period_ms, "armed periodic action");
        self.actions.insert((entity, action_id.to_string()), armed);
    }

    fn cancel(&mut self, entity: Entity, action_id: &str) {
        if self.actions.remove(&(entity, action_id.to_string())).is_some() {
            debug!(%entity, action = action_id, "cancelled periodic action");
        }
    }

    fn has(&self, entity: Entity, action_id: &str) -> bool {
        self.actions.contains_key(&(entity, action_id.to_string()))
    }
}
