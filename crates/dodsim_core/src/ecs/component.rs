//! # Component Types
//!
//! Components are pure data containers with no behavior beyond small
//! helpers. They are `Copy` + `Pod` so every storage layout can hold them
//! by value in dense arrays.

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::ComponentMask;
use crate::error::{SimError, SimResult};
use crate::random;

/// Marker trait for components stored in dense per-type arrays.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {
///     const MASK: ComponentMask = ComponentMask::POSITION;
/// }
/// ```
pub trait Component: Copy + Pod + Zeroable + Default + Send + Sync + 'static {
    /// Membership flag set on an entity when this component is attached.
    const MASK: ComponentMask;
}

/// Position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Component for Position {
    const MASK: ComponentMask = ComponentMask::POSITION;
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the squared distance to another position.
    ///
    /// Proximity tests compare against a squared threshold instead of taking
    /// a root.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Renderable appearance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Sprite {
    /// Red channel, conceptually in `[0, 1]`.
    pub color_r: f32,
    /// Green channel.
    pub color_g: f32,
    /// Blue channel.
    pub color_b: f32,
    /// Index into the sprite atlas.
    pub sprite_index: u32,
    /// Draw scale, always positive.
    pub scale: f32,
}

impl Component for Sprite {
    const MASK: ComponentMask = ComponentMask::SPRITE;
}

impl Sprite {
    /// Opaque white.
    pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

    /// Creates a sprite from an RGB triple, atlas index, and scale.
    #[inline]
    #[must_use]
    pub const fn new(color: [f32; 3], sprite_index: u32, scale: f32) -> Self {
        Self {
            color_r: color[0],
            color_g: color[1],
            color_b: color[2],
            sprite_index,
            scale,
        }
    }

    /// Returns the color as an RGB triple.
    #[inline]
    #[must_use]
    pub const fn color(&self) -> [f32; 3] {
        [self.color_r, self.color_g, self.color_b]
    }

    /// Overwrites the color, leaving index and scale untouched.
    #[inline]
    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color_r = color[0];
        self.color_g = color[1];
        self.color_b = color[2];
    }
}

/// Velocity in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Move {
    /// X velocity.
    pub vel_x: f32,
    /// Y velocity.
    pub vel_y: f32,
}

impl Component for Move {
    const MASK: ComponentMask = ComponentMask::MOVE;
}

impl Move {
    /// Creates a velocity from its components.
    #[inline]
    #[must_use]
    pub const fn new(vel_x: f32, vel_y: f32) -> Self {
        Self { vel_x, vel_y }
    }

    /// Draws a velocity with a uniform heading in `[0, 2π)` and a uniform
    /// speed in `[min_speed, max_speed]`.
    ///
    /// Draw order is heading first, then speed.
    pub fn random<R: Rng + ?Sized>(min_speed: f32, max_speed: f32, rng: &mut R) -> Self {
        let angle = random::unit(rng) * std::f32::consts::TAU;
        let speed = random::range(rng, min_speed, max_speed);
        Self {
            vel_x: angle.cos() * speed,
            vel_y: angle.sin() * speed,
        }
    }

    /// Negates both axes.
    #[inline]
    pub fn reverse(&mut self) {
        self.vel_x = -self.vel_x;
        self.vel_y = -self.vel_y;
    }

    /// Returns the speed (velocity magnitude).
    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.vel_x.hypot(self.vel_y)
    }
}

/// Axis-aligned world rectangle. Exactly one exists per simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct WorldBounds {
    /// Minimum x.
    pub x_min: f32,
    /// Maximum x.
    pub x_max: f32,
    /// Minimum y.
    pub y_min: f32,
    /// Maximum y.
    pub y_max: f32,
}

impl Component for WorldBounds {
    const MASK: ComponentMask = ComponentMask::WORLD_BOUNDS;
}

impl WorldBounds {
    /// Creates a bounds rectangle. Call [`WorldBounds::validate`] before use.
    #[inline]
    #[must_use]
    pub const fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Checks `min < max` on both axes with finite values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBounds`] for an empty, inverted, or
    /// non-finite rectangle.
    pub fn validate(&self) -> SimResult<()> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.x_min < self.x_max && self.y_min < self.y_max {
            Ok(())
        } else {
            Err(SimError::InvalidBounds {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            })
        }
    }

    /// Checks whether a position lies inside or on the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x_min && pos.x <= self.x_max && pos.y >= self.y_min && pos.y <= self.y_max
    }

    /// Width of the rectangle.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Marks an entity as something avoiders must keep `distance` away from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct AvoidTarget {
    /// Contact radius, always positive.
    pub distance: f32,
}

impl Component for AvoidTarget {
    const MASK: ComponentMask = ComponentMask::AVOID_TARGET;
}

impl AvoidTarget {
    /// Creates an avoid-target tag.
    #[inline]
    #[must_use]
    pub const fn new(distance: f32) -> Self {
        Self { distance }
    }

    /// Squared contact radius.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self) -> f32 {
        self.distance * self.distance
    }
}
