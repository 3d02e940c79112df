//! # Simulation Error Types
//!
//! The core is a closed, statically configured pipeline, so nearly every
//! error here is a configuration error raised by the driver. None of them are
//! retried.

use thiserror::Error;

use crate::ecs::{ComponentMask, EntityId};

/// Errors that can occur while building or stepping a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// No entity carries a World Bounds component.
    #[error("world bounds are missing: movement needs exactly one bounds entity")]
    MissingWorldBounds,

    /// A second World Bounds component was attached.
    #[error("world bounds already attached to entity {existing}, refusing entity {requested}")]
    DuplicateWorldBounds {
        /// Entity that already holds the bounds.
        existing: EntityId,
        /// Entity the second attach targeted.
        requested: EntityId,
    },

    /// The bounds rectangle is empty, inverted, or not finite.
    #[error("invalid world bounds: x [{x_min}, {x_max}], y [{y_min}, {y_max}]")]
    InvalidBounds {
        /// Minimum x.
        x_min: f32,
        /// Maximum x.
        x_max: f32,
        /// Minimum y.
        y_min: f32,
        /// Maximum y.
        y_max: f32,
    },

    /// An avoider is missing a component the avoidance system writes to.
    #[error("avoider {entity} is missing components {missing}")]
    IncompleteAvoider {
        /// The offending entity.
        entity: EntityId,
        /// Components the entity lacks.
        missing: ComponentMask,
    },

    /// An avoid-target is missing a component the avoidance system reads.
    #[error("avoid-target {entity} is missing components {missing}")]
    IncompleteAvoidTarget {
        /// The offending entity.
        entity: EntityId,
        /// Components the entity lacks.
        missing: ComponentMask,
    },

    /// An entity has Move but no Position to move.
    #[error("entity {entity} has a Move component but no Position")]
    IncompleteMover {
        /// The offending entity.
        entity: EntityId,
    },

    /// An entity index that was never created.
    #[error("entity {entity} does not exist (store holds {count} entities)")]
    EntityOutOfRange {
        /// The requested entity.
        entity: EntityId,
        /// Number of entities in the store.
        count: usize,
    },

    /// The store no longer accepts new entities.
    #[error("entity store is frozen: entities can only be created before the first step")]
    StoreFrozen,

    /// `initialize` was called on a running simulation.
    #[error("simulation already initialized: call shutdown first")]
    AlreadyInitialized,

    /// `step` was called without a running simulation.
    #[error("simulation not initialized")]
    NotInitialized,

    /// Delta time is negative or not finite.
    #[error("invalid delta time {0}: must be finite and non-negative")]
    InvalidDeltaTime(f32),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
