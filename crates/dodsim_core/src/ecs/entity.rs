//! # Entity Management
//!
//! Entities are dense indices into the component arrays. The store is
//! append-only: an index, once handed out, stays valid for the lifetime of
//! the store and is never reused.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Unique identifier for an entity.
///
/// Wraps the dense index shared by every component array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates an entity ID from a dense index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index as `u32`.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the index into component arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bitmask of the components and tags an entity carries.
///
/// This is the single source of truth for "does entity E have component C":
/// component arrays hold a slot for every entity, but only slots whose flag
/// is set hold meaningful data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u8);

impl ComponentMask {
    /// No components.
    pub const EMPTY: Self = Self(0);
    /// Entity has a Position.
    pub const POSITION: Self = Self(1 << 0);
    /// Entity has a Sprite.
    pub const SPRITE: Self = Self(1 << 1);
    /// Entity has a Move (velocity).
    pub const MOVE: Self = Self(1 << 2);
    /// Entity avoids avoid-targets.
    pub const AVOIDER: Self = Self(1 << 3);
    /// Entity is something avoiders keep away from.
    pub const AVOID_TARGET: Self = Self(1 << 4);
    /// Entity holds the world bounds rectangle.
    pub const WORLD_BOUNDS: Self = Self(1 << 5);

    /// Everything an avoider must carry.
    pub const AVOIDER_REQUIRES: Self = Self(Self::POSITION.0 | Self::MOVE.0 | Self::SPRITE.0);
    /// Everything an avoid-target must carry.
    pub const AVOID_TARGET_REQUIRES: Self = Self(Self::POSITION.0 | Self::SPRITE.0);
    /// Everything extraction needs to emit a render record.
    pub const RENDERABLE: Self = Self(Self::POSITION.0 | Self::SPRITE.0);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::POSITION, "Position"),
        (Self::SPRITE, "Sprite"),
        (Self::MOVE, "Move"),
        (Self::AVOIDER, "Avoider"),
        (Self::AVOID_TARGET, "AvoidTarget"),
        (Self::WORLD_BOUNDS, "WorldBounds"),
    ];

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Checks whether every flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks whether any flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks whether no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the flags of `required` that are not set in `self`.
    #[inline]
    #[must_use]
    pub const fn missing(self, required: Self) -> Self {
        Self(required.0 & !self.0)
    }

    /// Sets the flags in `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for ComponentMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ComponentMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ComponentMask {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for ComponentMask {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_index() {
        let id = EntityId::new(12345);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.raw(), 12345);
        assert_eq!(id.to_string(), "#12345");
    }

    #[test]
    fn test_mask_contains_and_missing() {
        let mut mask = ComponentMask::EMPTY;
        assert!(!mask.contains(ComponentMask::POSITION));

        mask.insert(ComponentMask::POSITION);
        mask |= ComponentMask::AVOIDER;
        assert!(mask.contains(ComponentMask::POSITION | ComponentMask::AVOIDER));
        assert!(!mask.contains(ComponentMask::AVOIDER_REQUIRES));
        assert_eq!(
            mask.missing(ComponentMask::AVOIDER_REQUIRES),
            ComponentMask::MOVE | ComponentMask::SPRITE
        );
    }

    #[test]
    fn test_mask_display() {
        assert_eq!(ComponentMask::EMPTY.to_string(), "(none)");
        assert_eq!(ComponentMask::RENDERABLE.to_string(), "Position+Sprite");
    }
}
