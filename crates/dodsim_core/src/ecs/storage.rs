//! # Component Storage
//!
//! Dense, append-only component storage.
//!
//! The storage uses a dense array strategy:
//! - Every entity owns one slot in every per-type array, valid or not
//! - Access is O(1) via entity index
//! - Iteration is cache-friendly (contiguous memory)
//!
//! Slots only grow while the world is being populated; afterwards the length
//! is fixed and only values change.

use super::component::Component;

/// Dense storage for a single component type.
///
/// A slot whose membership flag is clear holds `C::default()` and must not
/// be read as meaningful data.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Position> = ComponentStorage::with_capacity(1_000_000);
/// storage.push_default();
/// storage.set(0, Position::new(1.0, 2.0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ComponentStorage<C: Component> {
    data: Vec<C>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates empty storage with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks whether the storage has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends a default slot. O(1) amortized.
    #[inline]
    pub fn push_default(&mut self) {
        self.data.push(C::default());
    }

    /// Gets a component by entity index.
    ///
    /// Returns `None` if index is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)
    }

    /// Overwrites the slot at `index`.
    ///
    /// Returns `false` if index was out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> bool {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = component;
            true
        } else {
            false
        }
    }

    /// Returns a slice of all slots.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// Returns a mutable slice of all slots.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.data
    }

    /// Drops every slot and releases the memory.
    pub fn release(&mut self) {
        self.data = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Position;

    #[test]
    fn test_storage_push_get_set() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::with_capacity(4);
        assert!(storage.is_empty());

        for _ in 0..3 {
            storage.push_default();
        }
        assert_eq!(storage.len(), 3);
        assert_eq!(*storage.get(2).unwrap(), Position::default());

        let pos = Position::new(1.0, 2.0);
        assert!(storage.set(1, pos));
        assert_eq!(*storage.get(1).unwrap(), pos);
    }

    #[test]
    fn test_storage_bounds() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::with_capacity(1);
        storage.push_default();
        assert!(storage.get(1).is_none());
        assert!(!storage.set(1, Position::new(0.0, 0.0)));
    }

    #[test]
    fn test_storage_release() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::with_capacity(100);
        storage.push_default();
        storage.release();
        assert!(storage.is_empty());
        assert_eq!(storage.as_slice().len(), 0);
    }
}
