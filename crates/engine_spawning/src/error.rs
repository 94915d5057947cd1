//! Error and outcome types.
//!
//! Two families live here. The `*Error` enums are real failures reported by
//! collaborators or by index maintenance. [`SkipReason`] is the expected,
//! non-fatal outcome of one spawner's turn in a pass: the driver records it
//! and moves on to the next spawner.

use engine_component::Entity;

/// Failures reported by an [`EntityStore`](crate::host::EntityStore).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The entity does not exist (never did, or was destroyed).
    #[error("unknown entity {0}")]
    UnknownEntity(Entity),

    /// The store refused to instantiate the template.
    #[error("cannot instantiate template '{template}': {reason}")]
    Instantiate { template: String, reason: String },
}

/// Failures reported by a [`TemplateCatalogue`](crate::host::TemplateCatalogue).
#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    /// The catalogue source could not be read.
    #[error("catalogue unavailable: {0}")]
    Unavailable(String),

    /// The catalogue source was read but could not be parsed.
    #[error("malformed catalogue: {0}")]
    Malformed(String),
}

/// Errors surfaced by the spawning core's own entry points.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A template failed validation during an index rebuild.
    #[error("invalid template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },

    /// A period restriction string did not name `any`, `day`, or `night`.
    #[error("unknown period restriction '{0}'")]
    UnknownPeriod(String),
}

/// Why a spawner (or a player cadence) produced nothing this pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    /// The spawner's cadence has not elapsed yet.
    #[error("not due for another {remaining_ms} ms")]
    NotDue { remaining_ms: u64 },

    /// `last_tick_ms` was ahead of the clock and has been pulled back.
    #[error("last tick was in the future; clamped")]
    ClockReset,

    /// The spawner is no longer registered or lost its location.
    #[error("spawner no longer live")]
    NotLive,

    /// The spawner has no accepted tags.
    #[error("spawner has no tags")]
    NoTags,

    /// The drawn tag matches no template.
    #[error("no templates tagged '{tag}'")]
    EmptyPool { tag: String },

    /// The drawn template is restricted to the other half of the day.
    #[error("template '{template}' not allowed at this time of day")]
    WrongPeriod { template: String },

    /// The drawn template lost its probability roll.
    #[error("template '{template}' rejected by probability {probability}")]
    ProbabilityRejected { template: String, probability: u8 },

    /// The scattered candidate landed inside the minimum distance.
    #[error("candidate too close to origin")]
    TooClose,

    /// No penetrable block within the vertical search window.
    #[error("no open position within {max_offset} blocks")]
    NoOpenPosition { max_offset: i32 },

    /// The spawner could not pay the template's item cost.
    #[error("missing item '{item}'")]
    MissingItem { item: String },

    /// The template vanished from the catalogue since its cadence was armed.
    #[error("template '{template}' no longer in catalogue")]
    UnknownTemplate { template: String },

    /// The entity store refused the instantiation.
    #[error("instantiation failed: {0}")]
    Store(StoreError),
}
