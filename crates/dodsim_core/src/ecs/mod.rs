//! # Entity Component System
//!
//! Struct-of-arrays entity store.
//!
//! ## Design Philosophy
//!
//! - One dense array per component type, indexed by entity index
//! - A membership bitmask per entity is the only "has component" check
//! - Entity IDs are plain dense indices; the store never shrinks
//! - No dynamic dispatch or type lookups in hot paths

mod component;
mod entity;
mod storage;
mod world;

pub use component::{AvoidTarget, Component, Move, Position, Sprite, WorldBounds};
pub use entity::{ComponentMask, EntityId};
pub use storage::ComponentStorage;
pub use world::World;

pub(crate) use world::ComponentsMut;
