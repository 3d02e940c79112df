//! # Movement System
//!
//! Advances every entity carrying Move by `velocity * dt`, then reflects it
//! off the world bounds. Axes are handled independently, so a corner hit
//! flips both components in the same frame.
//!
//! Velocity magnitude is never re-normalized: reflection only flips signs.

use tracing::debug;

use crate::ecs::{ComponentMask, EntityId, Move, Position, World, WorldBounds};
use crate::error::{SimError, SimResult};

/// Movement over a cached list of movers and a bounds snapshot.
///
/// The list holds entity indices, never component copies, so every frame
/// reads the positions the store currently holds.
#[derive(Clone, Debug)]
pub struct MovementSystem {
    bounds: WorldBounds,
    movers: Vec<EntityId>,
}

impl MovementSystem {
    /// Snapshots the bounds and collects every entity with Move, in store
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWorldBounds`] without a bounds entity and
    /// [`SimError::IncompleteMover`] for a Move without a Position.
    pub fn setup(world: &World) -> SimResult<Self> {
        let bounds = world.world_bounds()?;
        let mut movers = Vec::with_capacity(world.count_with(ComponentMask::MOVE));

        for entity in world.entities_with(ComponentMask::MOVE) {
            if !world.has(entity, ComponentMask::POSITION) {
                return Err(SimError::IncompleteMover { entity });
            }
            movers.push(entity);
        }

        debug!(movers = movers.len(), ?bounds, "movement system ready");
        Ok(Self { bounds, movers })
    }

    /// The bounds snapshot.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Entities this system moves, in store order.
    #[inline]
    #[must_use]
    pub fn movers(&self) -> &[EntityId] {
        &self.movers
    }

    /// Runs one frame of movement.
    pub fn update(&self, world: &mut World, delta_time: f32) {
        let components = world.components_mut();
        let positions = components.positions;
        let moves = components.moves;

        for entity in &self.movers {
            let idx = entity.index();
            advance(&mut positions[idx], &mut moves[idx], &self.bounds, delta_time);
        }
    }

    /// Runs one frame of movement partitioned across the rayon pool.
    ///
    /// Every mover is independent and bounds are read-only, so the result
    /// equals [`MovementSystem::update`].
    #[cfg(feature = "parallel")]
    pub fn update_parallel(&self, world: &mut World, delta_time: f32) {
        use rayon::prelude::*;

        let components = world.components_mut();
        let bounds = self.bounds;
        components
            .positions
            .par_iter_mut()
            .zip(components.moves.par_iter_mut())
            .zip(components.masks.par_iter())
            .for_each(|((pos, vel), mask)| {
                if mask.contains(ComponentMask::MOVE) {
                    advance(pos, vel, &bounds, delta_time);
                }
            });
    }
}

/// Integrates one mover and bounces it off `bounds`.
#[inline]
pub fn advance(pos: &mut Position, vel: &mut Move, bounds: &WorldBounds, delta_time: f32) {
    pos.x += vel.vel_x * delta_time;
    pos.y += vel.vel_y * delta_time;
    contain(pos, vel, bounds);
}

/// Reflects and clamps a mover that sits on or past `bounds`.
///
/// Shared by movement and contact resolution, so nothing leaves the world
/// between two frames.
#[inline]
pub fn contain(pos: &mut Position, vel: &mut Move, bounds: &WorldBounds) {
    bounce_axis(&mut pos.x, &mut vel.vel_x, bounds.x_min, bounds.x_max);
    bounce_axis(&mut pos.y, &mut vel.vel_y, bounds.y_min, bounds.y_max);
}

/// Reflects one axis.
///
/// Past a bound: flip and clamp. Exactly on a bound while still heading
/// outward: flip, so a zero-length step still turns the entity around.
#[inline]
#[allow(clippy::float_cmp)]
fn bounce_axis(pos: &mut f32, vel: &mut f32, min: f32, max: f32) {
    if *pos < min || (*pos == min && *vel < 0.0) {
        *vel = -*vel;
        *pos = min;
    }
    if *pos > max || (*pos == max && *vel > 0.0) {
        *vel = -*vel;
        *pos = max;
    }
}
