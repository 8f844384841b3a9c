//! # Safe Handles
//!
//! Revocable references into a [`HandleRegistry`].
//!
//! A handle is a slot index plus the generation the slot had when the value was
//! inserted. Removing a value bumps the slot generation, so every copy of every
//! handle issued for it goes empty at once: lookups return `None` instead of
//! touching a recycled slot.
//!
//! ```text
//!  handle { index: 3, gen: 7 } ──> slots[3] { gen: 7, Some(value) }   live
//!  handle { index: 3, gen: 7 } ──> slots[3] { gen: 8, None }           empty
//!  handle { index: 3, gen: 7 } ──> slots[3] { gen: 8, Some(other) }    empty
//! ```

use std::marker::PhantomData;

use derive_where::derive_where;

/// Revocable, copyable reference to a value owned by a [`HandleRegistry<T>`].
///
/// Handles never keep the value alive and never dangle. Use
/// [`HandleRegistry::get`] to dereference; `None` means the target is gone.
#[derive_where(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SafeHandle<T> {
    index: u32,
    generation: u32,
    #[derive_where(skip(Debug))]
    _marker: PhantomData<fn() -> T>,
}

impl<T> SafeHandle<T> {
    /// Handle that never resolves.
    pub const NULL: Self = Self::from_raw_parts(u32::MAX, u32::MAX);

    /// Builds a handle from its raw parts.
    ///
    /// # Arguments
    ///
    /// * `index` - Slot index in the registry
    /// * `generation` - Generation the slot must carry for the handle to resolve
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at issue time.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }
}

impl<T> Default for SafeHandle<T> {
    fn default() -> Self {
        Self::NULL
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational arena that owns values and issues [`SafeHandle`]s for them.
pub struct HandleRegistry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> HandleRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty registry with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` and returns a fresh handle to it.
    ///
    /// Freed slots are reused; their bumped generation keeps old handles empty.
    pub fn insert(&mut self, value: T) -> SafeHandle<T> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return SafeHandle::from_raw_parts(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX - 1);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SafeHandle::from_raw_parts(index, 0)
    }

    /// Removes the value behind `handle`, severing every copy of it.
    ///
    /// Returns `None` if the handle was already empty.
    pub fn remove(&mut self, handle: SafeHandle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        // A slot whose generation would wrap is retired instead of recycled.
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != u32::MAX {
            self.free.push(handle.index);
        }
        self.len -= 1;
        Some(value)
    }

    /// Resolves a handle.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SafeHandle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Resolves a handle mutably.
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self, handle: SafeHandle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Checks if `handle` still resolves.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: SafeHandle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the registry holds no live values.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates live values with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SafeHandle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            let index = u32::try_from(index).ok()?;
            Some((SafeHandle::from_raw_parts(index, slot.generation), value))
        })
    }
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_goes_empty_on_remove() {
        let mut registry = HandleRegistry::new();
        let a = registry.insert("ship");
        let copy = a;

        assert_eq!(registry.get(copy), Some(&"ship"));
        assert_eq!(registry.remove(a), Some("ship"));
        assert!(registry.get(a).is_none());
        assert!(registry.get(copy).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reused_slot_does_not_resolve_old_handle() {
        let mut registry = HandleRegistry::new();
        let old = registry.insert(1);
        registry.remove(old);
        let new = registry.insert(2);

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(registry.get(old).is_none());
        assert_eq!(registry.get(new), Some(&2));
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(5u32);
        assert!(registry.remove(h).is_some());
        assert!(registry.remove(h).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_null_handle() {
        let registry: HandleRegistry<u8> = HandleRegistry::new();
        let h = SafeHandle::<u8>::default();
        assert!(h.is_null());
        assert!(!registry.contains(h));
    }

    #[test]
    fn test_iter_skips_dead() {
        let mut registry = HandleRegistry::with_capacity(4);
        let a = registry.insert('a');
        let b = registry.insert('b');
        let c = registry.insert('c');
        registry.remove(b);

        let live: Vec<_> = registry.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(live, vec![(a, 'a'), (c, 'c')]);
    }
}
