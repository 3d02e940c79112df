//! # World Population
//!
//! Builds the reference scene into any entity store. Population is written
//! once against [`EntityBuilder`], so every storage layout consumes the
//! random stream in exactly the same order and ends up with bit-identical
//! state.
//!
//! ## Draw order
//!
//! ```text
//! per object:  x, y, sprite index, heading, speed
//! per target:  x, y, r, g, b, heading, speed
//! ```

use rand::Rng;

use crate::config::SimConfig;
use crate::ecs::{EntityId, Move, Sprite, WorldBounds};
use crate::error::SimResult;
use crate::random;

/// Name of the bounds entity.
pub const BOUNDS_NAME: &str = "bounds";
/// Name of every moving avoider.
pub const OBJECT_NAME: &str = "object";
/// Name of every avoid-target.
pub const AVOID_TARGET_NAME: &str = "toavoid";

/// Write interface of an entity store, as population needs it.
///
/// Attaching the same component twice overwrites the first payload.
pub trait EntityBuilder {
    /// Hints how many entities are about to be created.
    fn reserve(&mut self, additional: usize) {
        let _ = additional;
    }

    /// Appends an entity with no components and returns its dense index.
    ///
    /// # Errors
    ///
    /// Fails when the store no longer accepts entities.
    fn create_entity(&mut self, name: &'static str) -> SimResult<EntityId>;

    /// Attaches a Position.
    ///
    /// # Errors
    ///
    /// Fails for an unknown entity.
    fn attach_position(&mut self, entity: EntityId, x: f32, y: f32) -> SimResult<()>;

    /// Attaches a Sprite.
    ///
    /// # Errors
    ///
    /// Fails for an unknown entity.
    fn attach_sprite(&mut self, entity: EntityId, sprite: Sprite) -> SimResult<()>;

    /// Attaches a Move with the given velocity.
    ///
    /// # Errors
    ///
    /// Fails for an unknown entity.
    fn attach_move(&mut self, entity: EntityId, velocity: Move) -> SimResult<()>;

    /// Attaches the World Bounds singleton.
    ///
    /// # Errors
    ///
    /// Fails on invalid or duplicate bounds.
    fn attach_world_bounds(&mut self, entity: EntityId, bounds: WorldBounds) -> SimResult<()>;

    /// Tags an entity as an avoider.
    ///
    /// # Errors
    ///
    /// Fails for an unknown entity.
    fn mark_avoider(&mut self, entity: EntityId) -> SimResult<()>;

    /// Tags an entity as an avoid-target with the given contact radius.
    ///
    /// # Errors
    ///
    /// Fails for an unknown entity or a non-positive distance.
    fn mark_avoid_target(&mut self, entity: EntityId, distance: f32) -> SimResult<()>;
}

/// Populates `builder` with the scene described by `config`.
///
/// Creates, in order: one bounds entity, `object_count` white avoiders
/// scattered over the whole world, and `avoid_target_count` pastel
/// avoid-targets clustered around the center.
///
/// # Errors
///
/// Fails if `config` is invalid or the builder rejects an operation.
pub fn populate<B, R>(builder: &mut B, config: &SimConfig, rng: &mut R) -> SimResult<()>
where
    B: EntityBuilder + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;
    builder.reserve(config.entity_count());

    let bounds = config.bounds;
    let entity = builder.create_entity(BOUNDS_NAME)?;
    builder.attach_world_bounds(entity, bounds)?;

    for _ in 0..config.object_count {
        let entity = builder.create_entity(OBJECT_NAME)?;

        let x = random::range(rng, bounds.x_min, bounds.x_max);
        let y = random::range(rng, bounds.y_min, bounds.y_max);
        builder.attach_position(entity, x, y)?;

        let sprite_index = random::index(rng, config.object_sprite_count);
        builder.attach_sprite(
            entity,
            Sprite::new(Sprite::WHITE, sprite_index, config.object_scale),
        )?;

        let velocity = Move::random(config.object_speed.min, config.object_speed.max, rng);
        builder.attach_move(entity, velocity)?;
        builder.mark_avoider(entity)?;
    }

    let center_x = (bounds.x_min + bounds.x_max) * 0.5;
    let center_y = (bounds.y_min + bounds.y_max) * 0.5;
    for _ in 0..config.avoid_target_count {
        let entity = builder.create_entity(AVOID_TARGET_NAME)?;

        let x = center_x
            + (random::range(rng, bounds.x_min, bounds.x_max) - center_x) * config.target_spread;
        let y = center_y
            + (random::range(rng, bounds.y_min, bounds.y_max) - center_y) * config.target_spread;
        builder.attach_position(entity, x, y)?;

        let color = random::color(rng, config.target_color_min, 1.0);
        builder.attach_sprite(
            entity,
            Sprite::new(color, config.target_sprite_index, config.target_scale),
        )?;

        let velocity = Move::random(config.target_speed.min, config.target_speed.max, rng);
        builder.attach_move(entity, velocity)?;
        builder.mark_avoid_target(entity, config.avoid_distance)?;
    }

    Ok(())
}
