//! # Entity Store
//!
//! The central container for all entities and components, laid out as
//! struct-of-arrays: one dense array per component type plus one membership
//! mask per entity, all indexed by the same entity index.

use std::borrow::Cow;

use rand::Rng;

use super::component::{AvoidTarget, Move, Position, Sprite, WorldBounds};
use super::entity::{ComponentMask, EntityId};
use super::storage::ComponentStorage;
use crate::error::{SimError, SimResult};
use crate::populate::EntityBuilder;

/// The entity store.
///
/// Entities are appended during population and never removed. Once the
/// systems are set up the store is frozen: no entity can be created and no
/// membership can change, so every index the systems cached stays valid.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
/// let e = world.create_entity("object")?;
/// world.attach_position(e, 1.0, 2.0)?;
/// assert!(world.has(e, ComponentMask::POSITION));
/// ```
#[derive(Debug, Default)]
pub struct World {
    names: Vec<Cow<'static, str>>,
    masks: Vec<ComponentMask>,

    // =========================================================================
    // Component Storages - one slot per entity
    // =========================================================================
    positions: ComponentStorage<Position>,
    sprites: ComponentStorage<Sprite>,
    moves: ComponentStorage<Move>,
    avoid_targets: ComponentStorage<AvoidTarget>,

    /// The bounds singleton lives outside the per-entity arrays.
    world_bounds: Option<(EntityId, WorldBounds)>,
    frozen: bool,
}

/// Split mutable view over the component arrays, for systems that touch
/// several of them in one pass.
pub(crate) struct ComponentsMut<'a> {
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub masks: &'a [ComponentMask],
    pub positions: &'a mut [Position],
    pub sprites: &'a mut [Sprite],
    pub moves: &'a mut [Move],
}

impl World {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            masks: Vec::with_capacity(capacity),
            positions: ComponentStorage::with_capacity(capacity),
            sprites: ComponentStorage::with_capacity(capacity),
            moves: ComponentStorage::with_capacity(capacity),
            avoid_targets: ComponentStorage::with_capacity(capacity),
            world_bounds: None,
            frozen: false,
        }
    }

    /// Number of entities ever created.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.masks.len()
    }

    /// Checks whether the store holds no entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Whether the store has been frozen for simulation.
    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freezes the store. Entity creation and attaches fail afterwards.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Appends an entity with no components and returns its dense index.
    ///
    /// O(1) amortized.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StoreFrozen`] once the store is frozen.
    pub fn create_entity(&mut self, name: impl Into<Cow<'static, str>>) -> SimResult<EntityId> {
        if self.frozen {
            return Err(SimError::StoreFrozen);
        }
        let index = u32::try_from(self.masks.len())
            .map_err(|_| SimError::InvalidConfig("entity count exceeds u32::MAX".into()))?;

        self.names.push(name.into());
        self.masks.push(ComponentMask::EMPTY);
        self.positions.push_default();
        self.sprites.push_default();
        self.moves.push_default();
        self.avoid_targets.push_default();

        Ok(EntityId::new(index))
    }

    /// Attaches (or overwrites) a Position.
    ///
    /// # Errors
    ///
    /// Fails if the entity does not exist or the store is frozen.
    pub fn attach_position(&mut self, entity: EntityId, x: f32, y: f32) -> SimResult<()> {
        let idx = self.writable(entity)?;
        self.positions.set(idx, Position::new(x, y));
        self.masks[idx].insert(ComponentMask::POSITION);
        Ok(())
    }

    /// Attaches (or overwrites) a Sprite.
    ///
    /// # Errors
    ///
    /// Fails if the entity does not exist or the store is frozen.
    pub fn attach_sprite(&mut self, entity: EntityId, sprite: Sprite) -> SimResult<()> {
        let idx = self.writable(entity)?;
        self.sprites.set(idx, sprite);
        self.masks[idx].insert(ComponentMask::SPRITE);
        Ok(())
    }

    /// Attaches (or overwrites) a Move with a known velocity.
    ///
    /// # Errors
    ///
    /// Fails if the entity does not exist or the store is frozen.
    pub fn attach_move(&mut self, entity: EntityId, velocity: Move) -> SimResult<()> {
        let idx = self.writable(entity)?;
        self.moves.set(idx, velocity);
        self.masks[idx].insert(ComponentMask::MOVE);
        Ok(())
    }

    /// Attaches a Move with a random heading in `[0, 2π)` and a random speed
    /// in `[min_speed, max_speed]`, returning the velocity drawn.
    ///
    /// # Errors
    ///
    /// Fails if the entity does not exist or the store is frozen.
    pub fn attach_random_move<R: Rng + ?Sized>(
        &mut self,
        entity: EntityId,
        min_speed: f32,
        max_speed: f32,
        rng: &mut R,
    ) -> SimResult<Move> {
        self.writable(entity)?;
        let velocity = Move::random(min_speed, max_speed, rng);
        self.attach_move(entity, velocity)?;
        Ok(velocity)
    }

    /// Attaches the World Bounds singleton.
    ///
    /// # Errors
    ///
    /// Fails on invalid bounds, if another entity already holds the bounds,
    /// or if the entity does not exist.
    pub fn attach_world_bounds(&mut self, entity: EntityId, bounds: WorldBounds) -> SimResult<()> {
        let idx = self.writable(entity)?;
        bounds.validate()?;
        if let Some((existing, _)) = self.world_bounds {
            if existing != entity {
                return Err(SimError::DuplicateWorldBounds {
                    existing,
                    requested: entity,
                });
            }
        }
        self.world_bounds = Some((entity, bounds));
        self.masks[idx].insert(ComponentMask::WORLD_BOUNDS);
        Ok(())
    }

    /// Tags an entity as an avoider.
    ///
    /// Component requirements are checked when the avoidance system is set
    /// up, so attach order does not matter.
    ///
    /// # Errors
    ///
    /// Fails if the entity does not exist or the store is frozen.
    pub fn mark_avoider(&mut self, entity: EntityId) -> SimResult<()> {
        let idx = self.writable(entity)?;
        self.masks[idx].insert(ComponentMask::AVOIDER);
        Ok(())
    }

    /// Tags an entity as an avoid-target with contact radius `distance`.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive or non-finite distance, or if the entity does
    /// not exist.
    pub fn mark_avoid_target(&mut self, entity: EntityId, distance: f32) -> SimResult<()> {
        let idx = self.writable(entity)?;
        if !(distance.is_finite() && distance > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "avoid distance must be positive, got {distance}"
            )));
        }
        self.avoid_targets.set(idx, AvoidTarget::new(distance));
        self.masks[idx].insert(ComponentMask::AVOID_TARGET);
        Ok(())
    }

    /// Membership mask of an entity.
    #[inline]
    #[must_use]
    pub fn mask(&self, entity: EntityId) -> Option<ComponentMask> {
        self.masks.get(entity.index()).copied()
    }

    /// Checks whether an entity carries every flag in `mask`.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: EntityId, mask: ComponentMask) -> bool {
        self.mask(entity).is_some_and(|m| m.contains(mask))
    }

    /// Name given at creation.
    #[must_use]
    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.names.get(entity.index()).map(AsRef::as_ref)
    }

    /// Counts entities carrying every flag in `mask`.
    #[must_use]
    pub fn count_with(&self, mask: ComponentMask) -> usize {
        self.masks.iter().filter(|m| m.contains(mask)).count()
    }

    /// Iterates, in store order, over entities carrying every flag in `mask`.
    pub fn entities_with(&self, mask: ComponentMask) -> impl Iterator<Item = EntityId> + '_ {
        self.masks
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.contains(mask))
            .map(|(idx, _)| EntityId::new(idx as u32))
    }

    /// Position of an entity, if it has one.
    #[must_use]
    pub fn position(&self, entity: EntityId) -> Option<Position> {
        self.component(entity, ComponentMask::POSITION, &self.positions)
    }

    /// Sprite of an entity, if it has one.
    #[must_use]
    pub fn sprite(&self, entity: EntityId) -> Option<Sprite> {
        self.component(entity, ComponentMask::SPRITE, &self.sprites)
    }

    /// Velocity of an entity, if it moves.
    #[must_use]
    pub fn velocity(&self, entity: EntityId) -> Option<Move> {
        self.component(entity, ComponentMask::MOVE, &self.moves)
    }

    /// Avoid-target tag of an entity, if it is one.
    #[must_use]
    pub fn avoid_target(&self, entity: EntityId) -> Option<AvoidTarget> {
        self.component(entity, ComponentMask::AVOID_TARGET, &self.avoid_targets)
    }

    /// The World Bounds singleton.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWorldBounds`] if none was attached.
    pub fn world_bounds(&self) -> SimResult<WorldBounds> {
        self.world_bounds
            .map(|(_, bounds)| bounds)
            .ok_or(SimError::MissingWorldBounds)
    }

    /// Entity holding the World Bounds singleton.
    #[must_use]
    pub fn world_bounds_entity(&self) -> Option<EntityId> {
        self.world_bounds.map(|(entity, _)| entity)
    }

    /// All membership masks, in store order.
    #[inline]
    #[must_use]
    pub fn masks(&self) -> &[ComponentMask] {
        &self.masks
    }

    /// All position slots, in store order.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        self.positions.as_slice()
    }

    /// All sprite slots, in store order.
    #[inline]
    #[must_use]
    pub fn sprites(&self) -> &[Sprite] {
        self.sprites.as_slice()
    }

    /// All velocity slots, in store order.
    #[inline]
    #[must_use]
    pub fn velocities(&self) -> &[Move] {
        self.moves.as_slice()
    }

    /// Drops every entity and releases all storage. The store is usable
    /// (and unfrozen) afterwards.
    pub fn release(&mut self) {
        self.names = Vec::new();
        self.masks = Vec::new();
        self.positions.release();
        self.sprites.release();
        self.moves.release();
        self.avoid_targets.release();
        self.world_bounds = None;
        self.frozen = false;
    }

    pub(crate) fn components_mut(&mut self) -> ComponentsMut<'_> {
        ComponentsMut {
            masks: &self.masks,
            positions: self.positions.as_mut_slice(),
            sprites: self.sprites.as_mut_slice(),
            moves: self.moves.as_mut_slice(),
        }
    }

    fn component<C: super::component::Component>(
        &self,
        entity: EntityId,
        flag: ComponentMask,
        storage: &ComponentStorage<C>,
    ) -> Option<C> {
        if self.has(entity, flag) {
            storage.get(entity.index()).copied()
        } else {
            None
        }
    }

    fn writable(&self, entity: EntityId) -> SimResult<usize> {
        if self.frozen {
            return Err(SimError::StoreFrozen);
        }
        let idx = entity.index();
        if idx < self.masks.len() {
            Ok(idx)
        } else {
            Err(SimError::EntityOutOfRange {
                entity,
                count: self.masks.len(),
            })
        }
    }
}

impl EntityBuilder for World {
    fn reserve(&mut self, additional: usize) {
        self.names.reserve(additional);
        self.masks.reserve(additional);
    }

    fn create_entity(&mut self, name: &'static str) -> SimResult<EntityId> {
        World::create_entity(self, name)
    }

    fn attach_position(&mut self, entity: EntityId, x: f32, y: f32) -> SimResult<()> {
        World::attach_position(self, entity, x, y)
    }

    fn attach_sprite(&mut self, entity: EntityId, sprite: Sprite) -> SimResult<()> {
        World::attach_sprite(self, entity, sprite)
    }

    fn attach_move(&mut self, entity: EntityId, velocity: Move) -> SimResult<()> {
        World::attach_move(self, entity, velocity)
    }

    fn attach_world_bounds(&mut self, entity: EntityId, bounds: WorldBounds) -> SimResult<()> {
        World::attach_world_bounds(self, entity, bounds)
    }

    fn mark_avoider(&mut self, entity: EntityId) -> SimResult<()> {
        World::mark_avoider(self, entity)
    }

    fn mark_avoid_target(&mut self, entity: EntityId, distance: f32) -> SimResult<()> {
        World::mark_avoid_target(self, entity, distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random;

    #[test]
    fn test_world_creation() {
        let world = World::with_capacity(1000);
        assert_eq!(world.entity_count(), 0);
        assert!(world.is_empty());
    }

    #[test]
    fn test_create_entity_dense_indices() {
        let mut world = World::new();
        for expected in 0..10 {
            let id = world.create_entity("object").unwrap();
            assert_eq!(id.index(), expected);
        }
        assert_eq!(world.entity_count(), 10);
        assert_eq!(world.name(EntityId::new(3)), Some("object"));
        assert_eq!(world.mask(EntityId::new(3)), Some(ComponentMask::EMPTY));
    }

    #[test]
    fn test_attach_sets_flags_and_data() {
        let mut world = World::new();
        let e = world.create_entity("object").unwrap();
        world.attach_position(e, 1.0, 2.0).unwrap();
        world
            .attach_sprite(e, Sprite::new(Sprite::WHITE, 2, 1.0))
            .unwrap();
        world.mark_avoider(e).unwrap();

        assert!(world.has(e, ComponentMask::RENDERABLE | ComponentMask::AVOIDER));
        assert!(!world.has(e, ComponentMask::MOVE));
        assert_eq!(world.position(e), Some(Position::new(1.0, 2.0)));
        assert_eq!(world.velocity(e), None);
        assert_eq!(world.count_with(ComponentMask::AVOIDER), 1);
    }

    #[test]
    fn test_attach_twice_overwrites() {
        let mut world = World::new();
        let e = world.create_entity("object").unwrap();
        world.attach_position(e, 1.0, 2.0).unwrap();
        world.attach_position(e, 3.0, 4.0).unwrap();
        assert_eq!(world.position(e), Some(Position::new(3.0, 4.0)));
    }

    #[test]
    fn test_random_move_is_seedable() {
        let mut a = World::new();
        let mut b = World::new();
        let ea = a.create_entity("object").unwrap();
        let eb = b.create_entity("object").unwrap();

        let va = a
            .attach_random_move(ea, 0.5, 0.7, &mut random::seeded(11))
            .unwrap();
        let vb = b
            .attach_random_move(eb, 0.5, 0.7, &mut random::seeded(11))
            .unwrap();
        assert_eq!(va, vb);
        assert_eq!(a.velocity(ea), Some(va));
    }

    #[test]
    fn test_world_bounds_singleton() {
        let mut world = World::new();
        assert_eq!(world.world_bounds(), Err(SimError::MissingWorldBounds));

        let a = world.create_entity("bounds").unwrap();
        let b = world.create_entity("bounds").unwrap();
        let bounds = WorldBounds::new(-1.0, 1.0, -1.0, 1.0);
        world.attach_world_bounds(a, bounds).unwrap();
        assert_eq!(world.world_bounds(), Ok(bounds));
        assert_eq!(world.world_bounds_entity(), Some(a));

        assert!(matches!(
            world.attach_world_bounds(b, bounds),
            Err(SimError::DuplicateWorldBounds { .. })
        ));
        // Bounds carry no Position or Sprite.
        assert_eq!(world.count_with(ComponentMask::RENDERABLE), 0);
    }

    #[test]
    fn test_out_of_range_and_frozen() {
        let mut world = World::new();
        let err = world.attach_position(EntityId::new(0), 0.0, 0.0);
        assert!(matches!(err, Err(SimError::EntityOutOfRange { count: 0, .. })));

        let e = world.create_entity("object").unwrap();
        world.freeze();
        assert_eq!(world.create_entity("late"), Err(SimError::StoreFrozen));
        assert_eq!(world.mark_avoider(e), Err(SimError::StoreFrozen));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_invalid_avoid_distance() {
        let mut world = World::new();
        let e = world.create_entity("toavoid").unwrap();
        assert!(world.mark_avoid_target(e, 0.0).is_err());
        assert!(world.mark_avoid_target(e, f32::NAN).is_err());
        world.mark_avoid_target(e, 1.3).unwrap();
        assert_eq!(world.avoid_target(e), Some(AvoidTarget::new(1.3)));
    }

    #[test]
    fn test_release() {
        let mut world = World::new();
        let e = world.create_entity("object").unwrap();
        world.attach_position(e, 0.0, 0.0).unwrap();
        world.freeze();
        world.release();
        assert!(world.is_empty());
        assert!(!world.is_frozen());
        assert!(world.create_entity("again").is_ok());
    }
}
