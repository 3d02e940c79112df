//! # Avoidance System
//!
//! Every avoider is tested against every avoid-target. On contact the
//! avoider turns around, steps back out by a little more than one frame of
//! travel, and takes the target's color.
//!
//! ```text
//! for A in avoiders:
//!     for T in targets:            // target list order
//!         if |A - T|² < T.distance²:
//!             A.vel = -A.vel
//!             A.pos += A.vel * dt * 1.1
//!             reflect + clamp A against the world bounds
//!             A.color = T.color
//! ```
//!
//! An avoider touching several targets in one frame resolves each contact
//! in sequence; the last target processed wins the color and the final
//! velocity sign.
//!
//! The nudge is the reversed velocity, not the direction away from the
//! target. An avoider already heading away when a target drifts onto it is
//! turned back toward that target for the frame.
//!
//! Cost is O(|avoiders| × |targets|) per frame; targets number in the tens.

use tracing::debug;

use super::movement::contain;
use crate::ecs::{ComponentMask, EntityId, Move, Position, World, WorldBounds};
use crate::error::{SimError, SimResult};

/// Step multiplier used to push an avoider back out of a contact radius, so
/// it does not sit inside the radius and re-trigger next frame.
pub const CONTACT_OVERSHOOT: f32 = 1.1;

/// One avoid-target as the system sees it: a store index plus its radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvoidEntry {
    /// The avoid-target entity.
    pub entity: EntityId,
    /// Contact radius.
    pub distance: f32,
    /// Contact radius, squared.
    pub distance_squared: f32,
}

/// Per-frame copy of what avoiders read from a target.
#[cfg(feature = "parallel")]
#[derive(Clone, Copy, Debug)]
struct TargetSnapshot {
    position: Position,
    distance_squared: f32,
    color: [f32; 3],
}

/// Avoidance over cached avoider and avoid-target lists.
///
/// Both lists hold entity indices into the store. Positions keep moving in
/// place inside the store, so caching values instead would test stale
/// coordinates.
#[derive(Clone, Debug)]
pub struct AvoidanceSystem {
    bounds: WorldBounds,
    targets: Vec<AvoidEntry>,
    avoiders: Vec<EntityId>,
    /// No entity is both avoider and avoid-target.
    disjoint: bool,
    #[cfg(feature = "parallel")]
    snapshot: Vec<TargetSnapshot>,
}

impl AvoidanceSystem {
    /// Snapshots the bounds and collects every avoid-target and every
    /// avoider, in store order.
    ///
    /// Runs once, unconditionally, before the first frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWorldBounds`] without a bounds entity,
    /// [`SimError::IncompleteAvoider`] for an avoider lacking
    /// Position, Move, or Sprite, and [`SimError::IncompleteAvoidTarget`]
    /// for a target lacking Position or Sprite.
    pub fn setup(world: &World) -> SimResult<Self> {
        let bounds = world.world_bounds()?;
        let mut targets = Vec::with_capacity(world.count_with(ComponentMask::AVOID_TARGET));
        for entity in world.entities_with(ComponentMask::AVOID_TARGET) {
            let mask = world.mask(entity).unwrap_or_default();
            let missing = mask.missing(ComponentMask::AVOID_TARGET_REQUIRES);
            if !missing.is_empty() {
                return Err(SimError::IncompleteAvoidTarget { entity, missing });
            }
            let distance = world.avoid_target(entity).map_or(0.0, |t| t.distance);
            targets.push(AvoidEntry {
                entity,
                distance,
                distance_squared: distance * distance,
            });
        }

        let mut avoiders = Vec::with_capacity(world.count_with(ComponentMask::AVOIDER));
        let mut disjoint = true;
        for entity in world.entities_with(ComponentMask::AVOIDER) {
            let mask = world.mask(entity).unwrap_or_default();
            let missing = mask.missing(ComponentMask::AVOIDER_REQUIRES);
            if !missing.is_empty() {
                return Err(SimError::IncompleteAvoider { entity, missing });
            }
            disjoint &= !mask.contains(ComponentMask::AVOID_TARGET);
            avoiders.push(entity);
        }

        debug!(
            avoiders = avoiders.len(),
            targets = targets.len(),
            disjoint,
            "avoidance system ready"
        );

        Ok(Self {
            #[cfg(feature = "parallel")]
            snapshot: Vec::with_capacity(targets.len()),
            bounds,
            targets,
            avoiders,
            disjoint,
        })
    }

    /// The bounds snapshot.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Avoid-targets, in store order.
    #[inline]
    #[must_use]
    pub fn targets(&self) -> &[AvoidEntry] {
        &self.targets
    }

    /// Avoiders, in store order.
    #[inline]
    #[must_use]
    pub fn avoiders(&self) -> &[EntityId] {
        &self.avoiders
    }

    /// Whether no entity is both avoider and avoid-target.
    #[inline]
    #[must_use]
    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    /// Runs one frame of avoidance and returns the number of contacts.
    ///
    /// Must run after this frame's movement.
    pub fn update(&self, world: &mut World, delta_time: f32) -> usize {
        let components = world.components_mut();
        let positions = components.positions;
        let moves = components.moves;
        let sprites = components.sprites;

        let mut contacts = 0;
        for avoider in &self.avoiders {
            let a = avoider.index();
            for target in &self.targets {
                let t = target.entity.index();
                if a == t {
                    continue;
                }
                if positions[a].distance_squared(positions[t]) < target.distance_squared {
                    let (pos, vel) = (&mut positions[a], &mut moves[a]);
                    resolve_contact(pos, vel, &self.bounds, delta_time);
                    let color = sprites[t].color();
                    sprites[a].set_color(color);
                    contacts += 1;
                }
            }
        }
        contacts
    }

    /// Runs one frame of avoidance with avoiders partitioned across the
    /// rayon pool, returning the number of contacts.
    ///
    /// Each avoider only writes its own Position, Move, and Sprite, and
    /// targets are read from a snapshot taken after movement. Falls back to
    /// [`AvoidanceSystem::update`] when some entity is both avoider and
    /// target, since then a write could be observed mid-frame.
    #[cfg(feature = "parallel")]
    pub fn update_parallel(&mut self, world: &mut World, delta_time: f32) -> usize {
        use rayon::prelude::*;

        if !self.disjoint {
            return self.update(world, delta_time);
        }

        self.snapshot.clear();
        for target in &self.targets {
            let t = target.entity.index();
            self.snapshot.push(TargetSnapshot {
                position: world.positions()[t],
                distance_squared: target.distance_squared,
                color: world.sprites()[t].color(),
            });
        }

        let snapshot = &self.snapshot;
        let bounds = self.bounds;
        let components = world.components_mut();
        components
            .positions
            .par_iter_mut()
            .zip(components.moves.par_iter_mut())
            .zip(components.sprites.par_iter_mut())
            .zip(components.masks.par_iter())
            .map(|(((pos, vel), sprite), mask)| {
                if !mask.contains(ComponentMask::AVOIDER) {
                    return 0;
                }
                let mut contacts = 0;
                for target in snapshot {
                    if pos.distance_squared(target.position) < target.distance_squared {
                        resolve_contact(pos, vel, &bounds, delta_time);
                        sprite.set_color(target.color);
                        contacts += 1;
                    }
                }
                contacts
            })
            .sum()
    }
}

/// Turns an avoider around and steps it back out of a contact, then keeps
/// it inside `bounds` the way movement does.
#[inline]
pub fn resolve_contact(
    pos: &mut Position,
    vel: &mut Move,
    bounds: &WorldBounds,
    delta_time: f32,
) {
    vel.reverse();
    pos.x += vel.vel_x * delta_time * CONTACT_OVERSHOOT;
    pos.y += vel.vel_y * delta_time * CONTACT_OVERSHOOT;
    contain(pos, vel, bounds);
}
