//! Generational object pool.
//!
//! Every object owned by the [`World`](crate::World) lives in a [`Pool`] and is referred to
//! through a [`Handle`]. Handles never own anything: once the slot behind a handle is freed its
//! generation moves on, and every lookup through the old handle fails instead of reaching
//! whatever object gets stored in the slot next.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Non-owning, generation-checked reference to an object in a [`Pool`].
///
/// Format: `[32-bit index | 32-bit generation]`. Generation `0` is reserved for
/// [`Handle::NONE`], so a default handle is never valid.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    #[serde(skip)]
    type_marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub const NONE: Self = Self::new(0, 0);

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            type_marker: PhantomData,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_none(&self) -> bool {
        self.generation == 0
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Serialize to 64-bit integer (for save files and graph values).
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer.
    pub fn from_bits(bits: u64) -> Self {
        Self::new(bits as u32, (bits >> 32) as u32)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Idx: {}; Gen: {}]", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    payload: Option<T>,
}

/// Slot storage with a free list. Freed slots are reused by later spawns.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn spawn(&mut self, payload: T) -> Handle<T> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.payload = Some(payload);
            return Handle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            payload: Some(payload),
        });
        Handle::new(index, 1)
    }

    /// Removes the object and invalidates every handle to it.
    pub fn free(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slot_mut(handle)?;
        let payload = slot.payload.take()?;
        // Generation 0 belongs to `Handle::NONE`.
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(handle.index);
        Some(payload)
    }

    pub fn is_valid_handle(&self, handle: Handle<T>) -> bool {
        self.try_borrow(handle).is_some()
    }

    pub fn try_borrow(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.payload.as_ref())
    }

    pub fn try_borrow_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slot_mut(handle).and_then(|slot| slot.payload.as_mut())
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.payload.is_some()).count()
    }

    pub fn pair_iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.payload
                .as_ref()
                .map(|payload| (Handle::new(index as u32, slot.generation), payload))
        })
    }

    fn slot_mut(&mut self, handle: Handle<T>) -> Option<&mut Slot<T>> {
        if handle.is_none() {
            return None;
        }
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_handle_is_never_valid() {
        let mut pool = Pool::new();
        pool.spawn(42);

        assert!(Handle::<i32>::NONE.is_none());
        assert!(!pool.is_valid_handle(Handle::NONE));
        assert!(pool.try_borrow_mut(Handle::NONE).is_none());
    }

    #[test]
    fn freed_handle_goes_stale_and_slot_is_reused() {
        let mut pool = Pool::new();
        let first = pool.spawn("sword");
        assert_eq!(pool.try_borrow(first), Some(&"sword"));

        assert_eq!(pool.free(first), Some("sword"));
        assert!(!pool.is_valid_handle(first));
        assert_eq!(pool.free(first), None);

        let second = pool.spawn("axe");
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(pool.try_borrow(first).is_none());
        assert_eq!(pool.try_borrow(second), Some(&"axe"));
        assert_eq!(pool.alive_count(), 1);
    }

    #[test]
    fn pair_iter_yields_live_handles() {
        let mut pool = Pool::new();
        let a = pool.spawn(1);
        let b = pool.spawn(2);
        pool.free(a);

        let live: Vec<_> = pool.pair_iter().collect();
        assert_eq!(live, vec![(b, &2)]);
    }

    #[test]
    fn bits_round_trip() {
        let handle = Handle::<()>::new(7, 3);
        assert_eq!(Handle::<()>::from_bits(handle.to_bits()), handle);
    }
}
