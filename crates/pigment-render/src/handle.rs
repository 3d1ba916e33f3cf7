//! Typed generational handles
//!
//! Handles are what the C ABI hands out in place of pointers. A handle
//! packs a slot index and a generation; removing an entry bumps the slot's
//! generation so stale handles never resolve again, even after the slot is
//! reused.

use std::fmt;
use std::marker::PhantomData;

/// Handle to an entry of a [`HandleTable<T>`]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation, _marker: PhantomData }
    }

    /// Pack into a nonzero integer (0 is reserved for "no handle")
    pub fn to_raw(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64 + 1)
    }

    /// Unpack a value produced by [`Handle::to_raw`]
    pub fn from_raw(raw: u64) -> Option<Self> {
        let slot = (raw & 0xFFFF_FFFF) as u32;
        if slot == 0 {
            return None;
        }
        Some(Self::new(slot - 1, (raw >> 32) as u32))
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
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

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

/// Generational table (slot map)
pub struct HandleTable<T> {
    items: Vec<Option<(T, u32)>>,
    free_list: Vec<u32>,
    generations: Vec<u32>,
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            generations: Vec::new(),
        }
    }

    /// Insert item
    pub fn insert(&mut self, value: T) -> Handle<T> {
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            self.items[index as usize] = Some((value, generation));
            Handle::new(index, generation)
        } else {
            let index = self.items.len() as u32;
            self.items.push(Some((value, 0)));
            self.generations.push(0);
            Handle::new(index, 0)
        }
    }

    /// Get item
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index as usize)
            .and_then(|opt| opt.as_ref())
            .filter(|(_, g)| *g == handle.generation)
            .map(|(val, _)| val)
    }

    /// Get item mutably
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.items.get_mut(handle.index as usize)
            .and_then(|opt| opt.as_mut())
            .filter(|(_, g)| *g == handle.generation)
            .map(|(val, _)| val)
    }

    /// Remove item
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.items.get_mut(handle.index as usize)?;
        if !matches!(slot, Some((_, g)) if *g == handle.generation) {
            return None;
        }
        let (val, _) = slot.take()?;
        let generation = &mut self.generations[handle.index as usize];
        *generation = generation.wrapping_add(1);
        self.free_list.push(handle.index);
        Some(val)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|i| i.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
