//  The arena of entries.
//
//  Entries live in a vector of slots, and are designated by their index. Released slots are threaded into a free
//  list, and reused by later insertions. Each slot carries a generation, bumped on release, so that a stale handle
//  never designates the entry which reuses its slot.

use alloc::vec::Vec;

use crate::{
    entry::Entry,
    error::TableError,
    id::{Generation, SlotIndex},
};

/// The arena of entries.
#[derive(Debug, Default)]
pub(crate) struct Slots {
    slots: Vec<Slot>,
    free: Option<SlotIndex>,
    live: usize,
}

impl Slots {
    /// Returns the number of live entries.
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Returns the entry at `index`, if live.
    #[inline(always)]
    pub(crate) fn get(&self, index: SlotIndex) -> Option<&Entry> {
        match self.slots.get(index.get()) {
            Some(Slot {
                state: SlotState::Occupied(entry),
                ..
            }) => Some(entry),
            _ => None,
        }
    }

    /// Returns the entry at `index`, if live.
    #[inline(always)]
    pub(crate) fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Entry> {
        match self.slots.get_mut(index.get()) {
            Some(Slot {
                state: SlotState::Occupied(entry),
                ..
            }) => Some(entry),
            _ => None,
        }
    }

    /// Returns the entry at `index`, if live and of the specified `generation`.
    pub(crate) fn get_checked(&self, index: SlotIndex, generation: Generation) -> Option<&Entry> {
        let slot = self.slots.get(index.get())?;

        if slot.generation != generation {
            return None;
        }

        match &slot.state {
            SlotState::Occupied(entry) => Some(entry),
            SlotState::Vacant(_) => None,
        }
    }

    /// Returns the current generation of the slot at `index`.
    pub(crate) fn generation(&self, index: SlotIndex) -> Option<Generation> {
        self.slots.get(index.get()).map(|slot| slot.generation)
    }

    /// Ensures that the next call to `insert` will not need to allocate.
    pub(crate) fn reserve(&mut self) -> Result<(), TableError> {
        if self.free.is_some() {
            return Ok(());
        }

        if SlotIndex::from_position(self.slots.len()).is_none() {
            return Err(TableError::EntryPoolExhausted);
        }

        self.slots.try_reserve(1).map_err(|_| TableError::AllocationFailure)
    }

    /// Inserts an entry, returning its index and the generation of its slot.
    ///
    /// Reuses a released slot if any, otherwise appends a new one.
    pub(crate) fn insert(&mut self, entry: Entry) -> Result<(SlotIndex, Generation), TableError> {
        self.reserve()?;

        let index = if let Some(index) = self.free {
            let slot = &mut self.slots[index.get()];

            let SlotState::Vacant(next_free) = slot.state else {
                unreachable!("Free list points to an occupied slot");
            };

            self.free = next_free;
            slot.state = SlotState::Occupied(entry);

            index
        } else {
            let index = SlotIndex::from_position(self.slots.len()).ok_or(TableError::EntryPoolExhausted)?;

            self.slots.push(Slot {
                generation: Generation::default(),
                state: SlotState::Occupied(entry),
            });

            index
        };

        self.live += 1;

        Ok((index, self.slots[index.get()].generation))
    }

    /// Removes the entry at `index`, returning it.
    ///
    /// The slot generation is bumped, and the slot queued for reuse.
    pub(crate) fn remove(&mut self, index: SlotIndex) -> Option<Entry> {
        let slot = self.slots.get_mut(index.get())?;

        if let SlotState::Vacant(_) = slot.state {
            return None;
        }

        let state = core::mem::replace(&mut slot.state, SlotState::Vacant(self.free));

        slot.generation = slot.generation.next();

        self.free = Some(index);
        self.live -= 1;

        match state {
            SlotState::Occupied(entry) => Some(entry),
            SlotState::Vacant(_) => None,
        }
    }

    /// Removes all entries.
    ///
    /// Slots are kept, with bumped generations, so that no outstanding handle remains valid.
    pub(crate) fn clear(&mut self) {
        let mut free = None;

        for (position, slot) in self.slots.iter_mut().enumerate().rev() {
            if let SlotState::Occupied(_) = slot.state {
                slot.generation = slot.generation.next();
            }

            slot.state = SlotState::Vacant(free);

            free = SlotIndex::from_position(position);
        }

        self.free = free;
        self.live = 0;
    }

    /// Returns an iterator over the live entries, with their index and generation.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (SlotIndex, Generation, &Entry)> + '_ {
        self.slots.iter().enumerate().filter_map(|(position, slot)| {
            let SlotState::Occupied(entry) = &slot.state else {
                return None;
            };

            let index = SlotIndex::from_position(position)?;

            Some((index, slot.generation, entry))
        })
    }
}

//
//  Implementation
//

#[derive(Debug)]
struct Slot {
    generation: Generation,
    state: SlotState,
}

#[derive(Debug)]
enum SlotState {
    Occupied(Entry),
    //  Link to the next free slot.
    Vacant(Option<SlotIndex>),
}

// mod tests
