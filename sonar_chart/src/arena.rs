// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity slot arena with generational handles.
//!
//! An [`Arena`] allocates all of its slot storage once, in
//! [`Arena::with_capacity`], and never grows afterwards. Running out of slots
//! is an ordinary outcome reported as [`Exhausted`]; it leaves every live value
//! untouched.
//!
//! Free slots are kept in a first-in, first-out queue: allocation takes the
//! slot that has been free the longest and release appends to the back. Slots
//! are therefore handed out round-robin, and both operations are O(1).

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Handle to a live value in an [`Arena`].
///
/// A handle is a slot index plus a generation counter.
///
/// - The generation of a slot increments every time the slot is released.
/// - A handle only resolves while its generation matches the slot's, so a
///   handle kept past [`Arena::release`] never aliases the slot's next occupant.
/// - Generations wrap after `u16::MAX` reuses of the same slot.
pub struct Handle<T> {
    index: u16,
    generation: u16,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u16, generation: u16) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Returns the slot index of this handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the generation this handle was issued with.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u16 {
        self.generation
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

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

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle")
            .field(&self.index)
            .field(&self.generation)
            .finish()
    }
}

/// Error returned when every slot of an [`Arena`] is in use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Exhausted;

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("arena capacity exhausted")
    }
}

impl core::error::Error for Exhausted {}

struct Slot<T> {
    generation: u16,
    value: Option<T>,
}

/// Fixed-capacity storage with O(1) allocate and release.
///
/// ```
/// use sonar_chart::{Arena, Exhausted};
///
/// let mut arena = Arena::with_capacity(2);
/// let a = arena.allocate("a").unwrap();
/// let _b = arena.allocate("b").unwrap();
/// assert_eq!(arena.allocate("c"), Err(Exhausted));
///
/// assert_eq!(arena.release(a), Some("a"));
/// assert!(arena.get(a).is_none());
/// assert!(arena.allocate("c").is_ok());
/// ```
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: VecDeque<u16>,
    len: u16,
}

impl<T> Arena<T> {
    /// Creates an arena with room for exactly `capacity` values.
    ///
    /// This is the only place the arena allocates.
    #[must_use]
    pub fn with_capacity(capacity: u16) -> Self {
        let mut slots = Vec::with_capacity(usize::from(capacity));
        slots.resize_with(usize::from(capacity), || Slot {
            generation: 0,
            value: None,
        });
        let mut free = VecDeque::with_capacity(usize::from(capacity));
        free.extend(0..capacity);
        Self {
            slots,
            free,
            len: 0,
        }
    }

    /// Returns the fixed number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Returns `true` if no value is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if every slot is in use.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Stores `value` in a free slot and returns its handle.
    ///
    /// Returns [`Exhausted`] (and drops nothing else) when the arena is full.
    pub fn allocate(&mut self, value: T) -> Result<Handle<T>, Exhausted> {
        let index = self.free.pop_front().ok_or(Exhausted)?;
        let slot = &mut self.slots[usize::from(index)];
        debug_assert!(slot.value.is_none(), "free list held an occupied slot");
        slot.value = Some(value);
        self.len += 1;
        Ok(Handle::new(index, slot.generation))
    }

    /// Frees the slot behind `handle` and returns its value.
    ///
    /// Releasing a stale or already released handle is a no-op returning `None`.
    pub fn release(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Returns `true` if `handle` refers to a live value.
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Returns a reference to the value behind `handle`, if it is live.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Returns a mutable reference to the value behind `handle`, if it is live.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Iterates over live values in slot order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by a u16 capacity"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u16, slot.generation), value))
        })
    }

    /// Releases every live value.
    ///
    /// Outstanding handles become stale, exactly as if each had been released.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free.clear();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "slot count is bounded by a u16 capacity"
        )]
        let capacity = self.slots.len() as u16;
        self.free.extend(0..capacity);
        self.len = 0;
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.slots.len())
            .field("live", &self.len)
            .finish_non_exhaustive()
    }
}
