//  The identity of a table, and the handles of its entries.

use core::{
    fmt,
    num::NonZeroU32,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::error::TableError;

/// A `Id` uniquely identifies a `StringTable`, unless `new_unchecked` is used to create it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Id(NonZeroU32);

impl Id {
    /// The maximum value of the `Id`.
    pub const MAX_ID: u32 = u32::MAX;

    /// Creates a new instance, with a guaranteed fresh new ID.
    ///
    /// Only 2^32 - 1 instances can be created by this method during the lifetime of the process, after which it fails
    /// unconditionally.
    pub fn new() -> Result<Self, TableError> {
        static ID_POOL: AtomicU32 = AtomicU32::new(0);

        let mut current = ID_POOL.load(Ordering::Relaxed);

        loop {
            if current == Self::MAX_ID {
                return Err(TableError::IdPoolExhausted);
            }

            let result = ID_POOL.compare_exchange_weak(current, current + 1, Ordering::Relaxed, Ordering::Relaxed);

            if let Err(new_current) = result {
                current = new_current;
                continue;
            }

            let id = NonZeroU32::new(current + 1).ok_or(TableError::IdPoolExhausted)?;

            return Ok(Self(id));
        }
    }

    /// Creates a new instance with the specified ID.
    ///
    /// This instance can then be used to build a `StringTable` using its builder `set_id` method, at the risk and
    /// perils of the caller.
    pub fn new_unchecked(n: NonZeroU32) -> Self {
        Self(n)
    }

    /// Returns the raw value of the ID.
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

/// A `StringHandle` uniquely identifies an interned short string.
///
/// Two handles obtained from the same table compare equal if and only if they designate the same entry, hence if and
/// only if their contents are equal, as long as neither has been released.
///
/// #   Tied to the `StringTable` instance.
///
/// A `StringHandle` is only meaningful for the `StringTable` instance which created it, and only until it is
/// released. Released handles are detected, and never alias the entry which later reuses their slot.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct StringHandle {
    slot: SlotIndex,
    generation: Generation,
    table: Id,
}

//  Public methods
impl StringHandle {
    /// Returns the `Id` of the `StringTable` which created this instance.
    pub fn table_id(&self) -> Id {
        self.table
    }
}

//  Crate methods
impl StringHandle {
    /// Creates a new instance.
    pub(crate) fn new(slot: SlotIndex, generation: Generation, table: Id) -> Self {
        Self {
            slot,
            generation,
            table,
        }
    }

    /// Returns the index of the slot within the `StringTable`.
    pub(crate) fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Returns the generation of the slot at the time the handle was created.
    pub(crate) fn generation(&self) -> Generation {
        self.generation
    }
}

impl fmt::Debug for StringHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("StringHandle")
            .field("slot", &self.slot.get())
            .field("generation", &self.generation.0)
            .field("table", &self.table.0)
            .finish()
    }
}

/// The index of an entry slot within the `StringTable`.
///
/// Stored off by one, so that `Option<SlotIndex>` is as compact as a `u32`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct SlotIndex(NonZeroU32);

impl SlotIndex {
    /// Creates an index from a position within the slots.
    ///
    /// Returns `None` if the position cannot be represented.
    pub(crate) fn from_position(position: usize) -> Option<Self> {
        let raw = u32::try_from(position).ok()?.checked_add(1)?;

        NonZeroU32::new(raw).map(Self)
    }

    /// Returns the position within the slots.
    pub(crate) fn get(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// The generation of a slot, bumped every time its entry is released.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Generation(pub u32);

impl Generation {
    /// Returns the following generation.
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

// mod tests
