//! Spawnable templates.
//!
//! A [`Template`] is the authored description of something a spawner can
//! create. Templates are immutable once loaded; the [`TagIndex`] shares them
//! behind `Arc` so a rebuild never invalidates a template a caller is holding.
//!
//! [`TagIndex`]: crate::tag_index::TagIndex

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpawnError;

/// Default self-cadence of a template in player-anchored mode.
pub const DEFAULT_SPAWN_GAP_MS: u64 = 30_000;

/// Probability weight that always passes the roll.
pub const ALWAYS: u8 = u8::MAX;

/// The part of the day a template may appear in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    #[default]
    Any,
    Day,
    Night,
}

impl Period {
    /// Whether a template with this restriction may spawn right now.
    #[must_use]
    pub fn admits(self, is_night: bool) -> bool {
        match self {
            Period::Any => true,
            Period::Day => !is_night,
            Period::Night => is_night,
        }
    }
}

impl FromStr for Period {
    type Err = SpawnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Period::Any),
            "day" => Ok(Period::Day),
            "night" => Ok(Period::Night),
            _ => Err(SpawnError::UnknownPeriod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = SpawnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Any => "Any",
            Period::Day => "Day",
            Period::Night => "Night",
        })
    }
}

/// An authored spawnable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Stable identifier (URN-like, e.g. `"core:goblin"`).
    pub id: String,
    /// Labels spawners address this template by. Empty = never tag-addressed.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Weight in `0..=255`; `0` suppresses the template, `255` always passes.
    #[serde(default = "default_probability")]
    pub probability: u8,
    #[serde(default, alias = "period")]
    pub period_restriction: Period,
    /// Cadence of this template when scheduled around players.
    #[serde(default = "default_spawn_gap")]
    pub spawn_gap_ms: u64,
    /// Distance from the player at which player-anchored spawns appear.
    #[serde(default)]
    pub radius_from_player: f32,
    /// Item the spawner's inventory must give up for each spawn.
    #[serde(default)]
    pub item_to_consume: Option<String>,
}

fn default_probability() -> u8 {
    ALWAYS
}

fn default_spawn_gap() -> u64 {
    DEFAULT_SPAWN_GAP_MS
}

impl Template {
    /// A template with no tags and default weights.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: BTreeSet::new(),
            probability: ALWAYS,
            period_restriction: Period::Any,
            spawn_gap_ms: DEFAULT_SPAWN_GAP_MS,
            radius_from_player: 0.0,
            item_to_consume: None,
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn period(mut self, period: Period) -> Self {
        self.period_restriction = period;
        self
    }

    #[must_use]
    pub fn probability(mut self, probability: u8) -> Self {
        self.probability = probability;
        self
    }

    #[must_use]
    pub fn spawn_gap(mut self, spawn_gap_ms: u64) -> Self {
        self.spawn_gap_ms = spawn_gap_ms;
        self
    }

    #[must_use]
    pub fn radius(mut self, radius_from_player: f32) -> Self {
        self.radius_from_player = radius_from_player;
        self
    }

    #[must_use]
    pub fn consumes(mut self, item: impl Into<String>) -> Self {
        self.item_to_consume = Some(item.into());
        self
    }

    /// Reject templates the index cannot hold.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::InvalidTemplate`] for an empty id, a blank tag,
    /// or a negative or non-finite player radius.
    pub fn validate(&self) -> Result<(), SpawnError> {
        let invalid = |reason: &str| SpawnError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(invalid("blank tag"));
        }
        if !self.radius_from_player.is_finite() || self.radius_from_player < 0.0 {
            return Err(invalid("radius_from_player must be a non-negative number"));
        }
        Ok(())
    }
}
