//! # Object-Model Storage
//!
//! The layout the struct-of-arrays store is measured against: every entity
//! is a heap object owning a list of boxed, polymorphic components. Finding
//! a component means scanning that list for a matching type tag and
//! downcasting.
//!
//! ```text
//! GameObject "object"
//!   ├─ Box<Position>
//!   ├─ Box<Sprite>
//!   ├─ Box<Move>
//!   └─ Box<Avoider>
//! ```
//!
//! Semantics match the struct-of-arrays simulation exactly; only the memory
//! layout and lookup cost differ.

mod simulation;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use crate::ecs::{AvoidTarget, EntityId, Move, Position, Sprite, WorldBounds};
use crate::error::{SimError, SimResult};
use crate::populate::EntityBuilder;

pub use simulation::{extract_objects, ObjectAvoidanceSystem, ObjectMoveSystem, ObjectSimulation};

/// Hand-rolled type tag stored in every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Position`].
    Position,
    /// [`Sprite`].
    Sprite,
    /// [`WorldBounds`].
    WorldBounds,
    /// [`Move`].
    Move,
    /// [`Avoider`].
    Avoider,
    /// [`AvoidTarget`].
    AvoidTarget,
}

/// A component as a boxed trait object.
pub trait ObjectComponent: Any + Send + Sync + fmt::Debug {
    /// The component's type tag.
    fn kind(&self) -> ComponentKind;
    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Static type tag of a component type.
pub trait KindOf {
    /// Tag every value of this type reports.
    const KIND: ComponentKind;
}

/// Tag: the object avoids avoid-targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Avoider;

macro_rules! object_component {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl KindOf for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;
            }

            impl ObjectComponent for $ty {
                fn kind(&self) -> ComponentKind {
                    ComponentKind::$kind
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }
            }
        )*
    };
}

object_component! {
    Position => Position,
    Sprite => Sprite,
    WorldBounds => WorldBounds,
    Move => Move,
    Avoider => Avoider,
    AvoidTarget => AvoidTarget,
}

/// One entity: a name and its boxed components.
#[derive(Debug)]
pub struct GameObject {
    name: Cow<'static, str>,
    components: Vec<Box<dyn ObjectComponent>>,
}

impl GameObject {
    /// Creates an object with no components.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// The object's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a component, replacing any existing one of the same kind.
    pub fn add<C: ObjectComponent>(&mut self, component: C) {
        let kind = component.kind();
        let boxed: Box<dyn ObjectComponent> = Box::new(component);
        match self.components.iter_mut().find(|c| c.kind() == kind) {
            Some(slot) => *slot = boxed,
            None => self.components.push(boxed),
        }
    }

    /// Checks for a component by tag.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    /// Finds a component by type: tag scan, then downcast.
    #[must_use]
    pub fn get<C: ObjectComponent + KindOf>(&self) -> Option<&C> {
        self.components
            .iter()
            .find(|c| c.kind() == C::KIND)
            .and_then(|c| c.as_any().downcast_ref::<C>())
    }

    /// Finds a component by type, mutably.
    pub fn get_mut<C: ObjectComponent + KindOf>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find(|c| c.kind() == C::KIND)
            .and_then(|c| c.as_any_mut().downcast_mut::<C>())
    }

    /// Tags of every attached component, in attach order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.iter().map(|c| c.kind())
    }
}

/// The object store: a flat list of objects indexed by entity.
#[derive(Debug, Default)]
pub struct ObjectWorld {
    objects: Vec<GameObject>,
    bounds_owner: Option<EntityId>,
    frozen: bool,
}

impl ObjectWorld {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.objects.len()
    }

    /// All objects, in store order.
    #[must_use]
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    /// One object.
    #[must_use]
    pub fn object(&self, entity: EntityId) -> Option<&GameObject> {
        self.objects.get(entity.index())
    }

    /// First bounds component found by scanning every object.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWorldBounds`] if no object has one.
    pub fn find_world_bounds(&self) -> SimResult<WorldBounds> {
        self.objects
            .iter()
            .find_map(GameObject::get::<WorldBounds>)
            .copied()
            .ok_or(SimError::MissingWorldBounds)
    }

    /// Freezes the store against structural changes.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Drops every object.
    pub fn release(&mut self) {
        self.objects = Vec::new();
        self.bounds_owner = None;
        self.frozen = false;
    }

    pub(crate) fn objects_mut(&mut self) -> &mut [GameObject] {
        &mut self.objects
    }

    fn writable(&mut self, entity: EntityId) -> SimResult<&mut GameObject> {
        if self.frozen {
            return Err(SimError::StoreFrozen);
        }
        let count = self.objects.len();
        self.objects
            .get_mut(entity.index())
            .ok_or(SimError::EntityOutOfRange { entity, count })
    }
}

impl EntityBuilder for ObjectWorld {
    fn reserve(&mut self, additional: usize) {
        self.objects.reserve(additional);
    }

    fn create_entity(&mut self, name: &'static str) -> SimResult<EntityId> {
        if self.frozen {
            return Err(SimError::StoreFrozen);
        }
        let index = u32::try_from(self.objects.len())
            .map_err(|_| SimError::InvalidConfig("entity count exceeds u32::MAX".into()))?;
        self.objects.push(GameObject::new(name));
        Ok(EntityId::new(index))
    }

    fn attach_position(&mut self, entity: EntityId, x: f32, y: f32) -> SimResult<()> {
        self.writable(entity)?.add(Position::new(x, y));
        Ok(())
    }

    fn attach_sprite(&mut self, entity: EntityId, sprite: Sprite) -> SimResult<()> {
        self.writable(entity)?.add(sprite);
        Ok(())
    }

    fn attach_move(&mut self, entity: EntityId, velocity: Move) -> SimResult<()> {
        self.writable(entity)?.add(velocity);
        Ok(())
    }

    fn attach_world_bounds(&mut self, entity: EntityId, bounds: WorldBounds) -> SimResult<()> {
        bounds.validate()?;
        if let Some(existing) = self.bounds_owner {
            if existing != entity {
                return Err(SimError::DuplicateWorldBounds {
                    existing,
                    requested: entity,
                });
            }
        }
        self.writable(entity)?.add(bounds);
        self.bounds_owner = Some(entity);
        Ok(())
    }

    fn mark_avoider(&mut self, entity: EntityId) -> SimResult<()> {
        self.writable(entity)?.add(Avoider);
        Ok(())
    }

    fn mark_avoid_target(&mut self, entity: EntityId, distance: f32) -> SimResult<()> {
        let object = self.writable(entity)?;
        if !(distance.is_finite() && distance > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "avoid distance must be positive, got {distance}"
            )));
        }
        object.add(AvoidTarget::new(distance));
        Ok(())
    }
}
