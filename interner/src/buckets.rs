//  The bucket array, with its chains.
//
//  Each bucket holds the head of a singly-linked chain threaded through the entries' `next` links. The number of
//  buckets is always a power of 2, so that the bucket of a hash is obtained by masking.

use alloc::vec::Vec;

use crate::{
    error::TableError,
    hash::bucket_index,
    id::SlotIndex,
    slots::Slots,
};

/// The maximum number of buckets.
pub const MAX_BUCKETS: usize = 1 << 31;

/// The array of chain heads.
#[derive(Debug)]
pub(crate) struct Buckets {
    heads: Vec<Option<SlotIndex>>,
}

impl Buckets {
    /// Creates `count` empty buckets.
    pub(crate) fn new(count: usize) -> Result<Self, TableError> {
        let heads = Self::allocate(count)?;

        Ok(Self { heads })
    }

    /// Returns the number of buckets.
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.heads.len()
    }

    /// Returns the index of the bucket in which an entry with this `hash` belongs.
    #[inline(always)]
    pub(crate) fn index_of(&self, hash: u32) -> usize {
        bucket_index(hash, self.heads.len())
    }

    /// Returns the first entry of the chain of `bucket`.
    #[inline(always)]
    pub(crate) fn head(&self, bucket: usize) -> Option<SlotIndex> {
        self.heads[bucket]
    }

    /// Returns an iterator over the chain of `bucket`.
    pub(crate) fn chain<'a>(&self, bucket: usize, slots: &'a Slots) -> Chain<'a> {
        Chain {
            current: self.head(bucket),
            slots,
        }
    }

    /// Finds the entry matching `bytes` in the chain of `bucket`.
    pub(crate) fn find(&self, bucket: usize, bytes: &[u8], slots: &Slots) -> Option<SlotIndex> {
        self.chain(bucket, slots)
            .find(|(_, entry)| entry.matches(bytes))
            .map(|(index, _)| index)
    }

    /// Links the entry at `index` at the head of its bucket's chain.
    ///
    /// The entry must be live, and not already linked.
    pub(crate) fn link(&mut self, index: SlotIndex, slots: &mut Slots) {
        let Some(entry) = slots.get_mut(index) else {
            debug_assert!(false, "Linking a vacant slot {index:?}");
            return;
        };

        let bucket = bucket_index(entry.hash(), self.heads.len());

        entry.set_next(self.heads[bucket]);
        self.heads[bucket] = Some(index);
    }

    /// Unlinks the entry at `index` from its bucket's chain.
    ///
    /// The chain is scanned from its head; if the entry is not found, the chain is left untouched and an error is
    /// returned.
    pub(crate) fn unlink(&mut self, index: SlotIndex, slots: &mut Slots) -> Result<(), TableError> {
        let (hash, next) = match slots.get(index) {
            Some(entry) => (entry.hash(), entry.next()),
            None => return Err(TableError::StaleHandle),
        };

        let bucket = bucket_index(hash, self.heads.len());

        let mut previous: Option<SlotIndex> = None;
        let mut current = self.heads[bucket];

        while let Some(candidate) = current {
            if candidate == index {
                match previous {
                    None => self.heads[bucket] = next,
                    Some(previous) => {
                        if let Some(previous) = slots.get_mut(previous) {
                            previous.set_next(next);
                        }
                    }
                }

                if let Some(entry) = slots.get_mut(index) {
                    entry.set_next(None);
                }

                return Ok(());
            }

            previous = current;
            current = slots.get(candidate).and_then(|entry| entry.next());
        }

        Err(TableError::EntryNotInBucket { bucket })
    }

    /// Redistributes all entries amongst `new_count` buckets.
    ///
    /// The new array of buckets is allocated first, so that on failure the table is left untouched. Then every chain
    /// of the old array is relinked, entry by entry, into the new one; the order within a chain is not preserved.
    pub(crate) fn rehash(&mut self, new_count: usize, slots: &mut Slots) -> Result<(), TableError> {
        let new_heads = Self::allocate(new_count)?;

        let old_heads = core::mem::replace(&mut self.heads, new_heads);

        for head in old_heads {
            let mut current = head;

            while let Some(index) = current {
                current = slots.get(index).and_then(|entry| entry.next());

                self.link(index, slots);
            }
        }

        Ok(())
    }

    /// Empties all buckets, without changing their number.
    pub(crate) fn clear(&mut self) {
        self.heads.fill(None);
    }

    /// Returns the number of non-empty buckets, and the length of the longest chain.
    pub(crate) fn occupancy(&self, slots: &Slots) -> (usize, usize) {
        let mut occupied = 0;
        let mut longest = 0;

        for bucket in 0..self.heads.len() {
            let length = self.chain(bucket, slots).count();

            if length > 0 {
                occupied += 1;
            }

            longest = core::cmp::max(longest, length);
        }

        (occupied, longest)
    }

    fn allocate(count: usize) -> Result<Vec<Option<SlotIndex>>, TableError> {
        if !count.is_power_of_two() {
            return Err(TableError::PowerOfTwoViolation(count));
        }

        if count > MAX_BUCKETS {
            return Err(TableError::BucketLimitExceeded {
                requested: count,
                max: MAX_BUCKETS,
            });
        }

        let mut heads = Vec::new();

        heads.try_reserve_exact(count).map_err(|_| TableError::AllocationFailure)?;
        heads.resize(count, None);

        Ok(heads)
    }
}

/// An iterator over the entries of a chain, in chain order.
pub(crate) struct Chain<'a> {
    current: Option<SlotIndex>,
    slots: &'a Slots,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (SlotIndex, &'a crate::entry::Entry);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let entry = self.slots.get(index)?;

        self.current = entry.next();

        Some((index, entry))
    }
}

// mod tests
