//! # Storage Backends
//!
//! One simulation, several component layouts. Every backend exposes the same
//! two-phase protocol (`initialize` once, then `step` every frame) and,
//! given the same [`SimConfig`], emits bit-identical render feeds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::object::ObjectSimulation;
use crate::render::RenderRecord;
use crate::simulation::Simulation;

/// A complete simulation over one storage layout.
pub trait Backend {
    /// Short layout name for logs.
    fn name(&self) -> &'static str;

    /// Populates the store and builds the systems.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::AlreadyInitialized`] on a running simulation, or
    /// any configuration error found while populating.
    fn initialize(&mut self) -> SimResult<()>;

    /// Advances one frame and returns its render feed.
    ///
    /// `time` is monotonic wall-clock seconds and is not read by any system.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotInitialized`] or
    /// [`SimError::InvalidDeltaTime`].
    fn step(&mut self, time: f64, delta_time: f32) -> SimResult<&[RenderRecord]>;

    /// Number of entities in the store (0 when not initialized).
    fn entity_count(&self) -> usize;

    /// Whether `initialize` has run without a later `shutdown`.
    fn is_initialized(&self) -> bool;

    /// Releases all entity storage. Idempotent.
    fn shutdown(&mut self);
}

/// Available storage layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Struct-of-arrays with bitmask membership.
    #[default]
    Soa,
    /// One object per entity owning boxed polymorphic components.
    Object,
}

impl BackendKind {
    /// Every layout.
    pub const ALL: [Self; 2] = [Self::Soa, Self::Object];

    /// Builds an uninitialized simulation over this layout.
    #[must_use]
    pub fn create(self, config: SimConfig) -> Box<dyn Backend> {
        match self {
            Self::Soa => Box::new(Simulation::new(config)),
            Self::Object => Box::new(ObjectSimulation::new(config)),
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Soa => "soa",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "soa" => Ok(Self::Soa),
            "object" => Ok(Self::Object),
            other => Err(SimError::InvalidConfig(format!(
                "unknown backend '{other}', expected 'soa' or 'object'"
            ))),
        }
    }
}

/// Validates a frame's delta time.
pub(crate) fn check_delta_time(delta_time: f32) -> SimResult<()> {
    if delta_time.is_finite() && delta_time >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDeltaTime(delta_time))
    }
}
