//! # Driver Configuration
//!
//! Loaded once at startup from TOML. Every key is optional:
//!
//! ```toml
//! backend = "soa"          # or "object"
//! frames = 1024            # omit to run until killed
//! max_sprite_count = 1100000
//!
//! [simulation]
//! object_count = 100000
//! avoid_target_count = 20
//! seed = 42
//! ```

use std::path::Path;

use dodsim_core::{BackendKind, SimConfig};
use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};

/// Render buffer capacity of the reference renderer.
pub const DEFAULT_MAX_SPRITE_COUNT: usize = 1_100_000;

/// Everything a run needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Population and extraction parameters.
    pub simulation: SimConfig,
    /// Storage layout to run.
    pub backend: BackendKind,
    /// Frame limit; `None` runs forever.
    pub frames: Option<u64>,
    /// Capacity of the render buffer the feed is copied into.
    pub max_sprite_count: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            simulation: SimConfig::default(),
            backend: BackendKind::default(),
            frames: None,
            max_sprite_count: DEFAULT_MAX_SPRITE_COUNT,
        }
    }
}

impl DriverConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ParseConfig`] on malformed TOML or unknown
    /// values.
    pub fn from_toml_str(text: &str) -> DriverResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ReadConfig`] if the file cannot be read, or
    /// [`DriverError::ParseConfig`].
    pub fn from_path(path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DriverError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Sprites the scene renders every frame.
    #[must_use]
    pub fn required_sprites(&self) -> usize {
        self.simulation.object_count + self.simulation.avoid_target_count
    }

    /// Checks the simulation parameters and the render buffer capacity.
    ///
    /// # Errors
    ///
    /// Returns the simulation's validation error, or
    /// [`DriverError::SpriteCapacity`].
    pub fn validate(&self) -> DriverResult<()> {
        self.simulation.validate()?;
        let required = self.required_sprites();
        if required > self.max_sprite_count {
            return Err(DriverError::SpriteCapacity {
                required,
                capacity: self.max_sprite_count,
            });
        }
        Ok(())
    }
}
