//! # Simulation Configuration
//!
//! Every tunable of population and extraction. Defaults reproduce the
//! reference scene: a million white movers bouncing inside a 160×100 world,
//! twenty slow pastel bubbles near the center.
//!
//! The core never reads files; drivers deserialize this from wherever they
//! like (the `dodsim` driver uses TOML).

use serde::{Deserialize, Serialize};

use crate::ecs::WorldBounds;
use crate::error::{SimError, SimResult};

/// Default world rectangle.
pub const DEFAULT_BOUNDS: WorldBounds = WorldBounds::new(-80.0, 80.0, -50.0, 50.0);

/// Default global display scale applied during extraction.
pub const DEFAULT_DISPLAY_SCALE: f32 = 0.05;

/// Inclusive speed range for random velocities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    /// Minimum speed.
    pub min: f32,
    /// Maximum speed.
    pub max: f32,
}

impl SpeedRange {
    /// Creates a speed range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn validate(&self, what: &str) -> SimResult<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max {
            Ok(())
        } else {
            Err(SimError::InvalidConfig(format!(
                "{what} speed range [{}, {}] must satisfy 0 <= min <= max",
                self.min, self.max
            )))
        }
    }
}

/// Population and extraction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of moving avoider entities.
    pub object_count: usize,
    /// Number of avoid-target entities.
    pub avoid_target_count: usize,
    /// Seed for every random draw of population.
    pub seed: u64,
    /// The world rectangle.
    pub bounds: WorldBounds,

    /// Speed range of avoiders.
    pub object_speed: SpeedRange,
    /// Sprite scale of avoiders.
    pub object_scale: f32,
    /// Avoider sprite indices are drawn from `[0, object_sprite_count)`.
    pub object_sprite_count: u32,

    /// Speed range of avoid-targets.
    pub target_speed: SpeedRange,
    /// Sprite scale of avoid-targets.
    pub target_scale: f32,
    /// Sprite index of every avoid-target.
    pub target_sprite_index: u32,
    /// Avoid-targets spawn within this fraction of the bounds extent.
    pub target_spread: f32,
    /// Lower bound of each avoid-target color channel; upper bound is 1.
    pub target_color_min: f32,
    /// Contact radius of every avoid-target.
    pub avoid_distance: f32,

    /// Global scale applied to positions and sprite scale on extraction.
    pub display_scale: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            object_count: 1_000_000,
            avoid_target_count: 20,
            seed: 0,
            bounds: DEFAULT_BOUNDS,
            object_speed: SpeedRange::new(0.5, 0.7),
            object_scale: 1.0,
            object_sprite_count: 5,
            target_speed: SpeedRange::new(0.1, 0.2),
            target_scale: 2.0,
            target_sprite_index: 5,
            target_spread: 0.2,
            target_color_min: 0.5,
            avoid_distance: 1.3,
            display_scale: DEFAULT_DISPLAY_SCALE,
        }
    }
}

impl SimConfig {
    /// Reference scene with the given population, bounds, and seed.
    #[must_use]
    pub fn new(
        object_count: usize,
        avoid_target_count: usize,
        bounds: WorldBounds,
        seed: u64,
    ) -> Self {
        Self {
            object_count,
            avoid_target_count,
            bounds,
            seed,
            ..Self::default()
        }
    }

    /// Total entities population will create: bounds + objects + targets.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        1 + self.object_count + self.avoid_target_count
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBounds`] or [`SimError::InvalidConfig`]
    /// naming the first bad value.
    pub fn validate(&self) -> SimResult<()> {
        self.bounds.validate()?;
        self.object_speed.validate("object")?;
        self.target_speed.validate("avoid-target")?;

        let positive = [
            ("object_scale", self.object_scale),
            ("target_scale", self.target_scale),
            ("avoid_distance", self.avoid_distance),
            ("display_scale", self.display_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.object_count > 0 && self.object_sprite_count == 0 {
            return Err(SimError::InvalidConfig(
                "object_sprite_count must be at least 1".into(),
            ));
        }
        if !(self.target_spread.is_finite() && (0.0..=1.0).contains(&self.target_spread)) {
            return Err(SimError::InvalidConfig(format!(
                "target_spread must be in [0, 1], got {}",
                self.target_spread
            )));
        }
        if !(self.target_color_min.is_finite() && (0.0..=1.0).contains(&self.target_color_min)) {
            return Err(SimError::InvalidConfig(format!(
                "target_color_min must be in [0, 1], got {}",
                self.target_color_min
            )));
        }
        if self.entity_count() > u32::MAX as usize {
            return Err(SimError::InvalidConfig(format!(
                "{} entities exceed the u32 index space",
                self.entity_count()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entity_count(), 1_000_021);
    }

    #[test]
    fn test_new_keeps_reference_tuning() {
        let config = SimConfig::new(10, 2, DEFAULT_BOUNDS, 7);
        assert_eq!(config.object_count, 10);
        assert_eq!(config.avoid_target_count, 2);
        assert_eq!(config.seed, 7);
        assert!((config.avoid_distance - 1.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_speed() {
        let config = SimConfig {
            object_speed: SpeedRange::new(0.7, 0.5),
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let config = SimConfig::new(1, 1, WorldBounds::new(5.0, -5.0, -1.0, 1.0), 0);
        assert!(matches!(config.validate(), Err(SimError::InvalidBounds { .. })));
    }

    #[test]
    fn test_rejects_non_positive_distance() {
        let config = SimConfig {
            avoid_distance: 0.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
