//! # DODSIM Core
//!
//! Data-oriented 2D sprite simulation designed for:
//! - 1,000,000+ moving entities on a single thread
//! - No heap allocations per frame once initialized
//! - One flat render buffer rebuilt every frame
//!
//! ## Architecture Rules
//!
//! 1. **Struct-of-arrays storage** - Each component type lives in its own dense array
//! 2. **Bitmask membership** - An entity has a component iff its mask bit is set
//! 3. **Frozen after setup** - Systems cache entity indices, so the store never grows mid-run
//!
//! ## Example
//!
//! ```rust,ignore
//! use dodsim_core::{Simulation, SimConfig, DEFAULT_BOUNDS};
//!
//! let mut sim = Simulation::new(SimConfig::new(1_000_000, 20, DEFAULT_BOUNDS, 0));
//! sim.initialize()?;
//! let records = sim.step(0.0, 1.0 / 60.0)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::perf)]

pub mod backend;
pub mod config;
pub mod ecs;
pub mod error;
pub mod object;
pub mod populate;
pub mod random;
pub mod render;
pub mod simulation;
pub mod systems;

pub use backend::{Backend, BackendKind};
pub use config::{SimConfig, SpeedRange, DEFAULT_BOUNDS, DEFAULT_DISPLAY_SCALE};
pub use ecs::{
    AvoidTarget, Component, ComponentMask, ComponentStorage, EntityId, Move, Position, Sprite,
    World, WorldBounds,
};
pub use error::{SimError, SimResult};
pub use object::{GameObject, ObjectSimulation, ObjectWorld};
pub use populate::{populate, EntityBuilder};
pub use render::{as_bytes, as_floats, extract, RenderRecord, RenderSink};
pub use simulation::Simulation;
pub use systems::{AvoidanceSystem, MovementSystem, CONTACT_OVERSHOOT};
