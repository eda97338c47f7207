//  Implementation of the `StringTable`.

use core::fmt;

use crate::{
    buckets::{Buckets, MAX_BUCKETS},
    entry::{Entry, MAX_SHORT_LEN},
    error::TableError,
    hash::HashSeed,
    id::{Id, StringHandle},
    slots::Slots,
};

/// The number of buckets of a table, unless specified otherwise.
pub const DEFAULT_BUCKETS: usize = 16;

/// A short string interning table.
///
/// Each distinct content is stored once; interning equal contents yields the same `StringHandle`, hence comparing
/// handles is equivalent to comparing contents.
///
/// The table is meant for single-threaded use: all modifications require `&mut self`. To share a table between
/// threads, wrap it in a lock.
pub struct StringTable {
    id: Id,
    seed: HashSeed,
    buckets: Buckets,
    slots: Slots,
}

impl StringTable {
    /// Creates a new table, with default configuration.
    ///
    /// This may fail either because the pool of IDs is exhausted, or because the allocator cannot currently allocate
    /// enough memory for the buckets.
    ///
    /// To customize the table, use the `builder()` method instead.
    pub fn new() -> Result<Self, TableError> {
        Self::builder().build()
    }

    /// Creates a new table with `bucket_count` initial buckets, and the default seed.
    ///
    /// Fails with `PowerOfTwoViolation` if `bucket_count` is not a power of 2.
    pub fn with_buckets(bucket_count: usize) -> Result<Self, TableError> {
        let mut builder = Self::builder();
        builder.set_initial_buckets(bucket_count);
        builder.build()
    }

    /// Creates a builder for the table, allowing finer-grained tuning.
    pub fn builder() -> StringTableBuilder {
        StringTableBuilder {
            id: None,
            seed: HashSeed::default(),
            initial_buckets: DEFAULT_BUCKETS,
        }
    }

    /// Returns the `Id` of this table.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the seed used to hash the contents.
    pub fn seed(&self) -> HashSeed {
        self.seed
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether the table has no live entry.
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    /// Returns the current number of buckets, always a power of 2.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Interns a slice of bytes.
    ///
    /// Returns the handle of the existing entry if one with equal content is live, otherwise creates a new entry,
    /// growing the table beforehand if the number of entries reaches the number of buckets.
    ///
    /// Fails with `InvalidLength` if `bytes` is longer than `MAX_SHORT_LEN`, and with `AllocationFailure` if
    /// memory is exhausted, in which case the table is left unchanged.
    pub fn intern(&mut self, bytes: &[u8]) -> Result<StringHandle, TableError> {
        Self::check_length(bytes)?;

        let hash = self.seed.hash(bytes);
        let bucket = self.buckets.index_of(hash);

        if let Some(handle) = self.find(bucket, bytes) {
            return Ok(handle);
        }

        self.slots.reserve()?;

        let count = self.slots.len() + 1;

        if count >= self.buckets.len() {
            self.grow()?;
        }

        let (index, generation) = self.slots.insert(Entry::new(hash, bytes))?;

        self.buckets.link(index, &mut self.slots);

        tracing::trace!(table = self.id.get(), hash, length = bytes.len(), "interned new entry");

        Ok(StringHandle::new(index, generation, self.id))
    }

    /// Interns a string.
    ///
    /// See `intern`.
    pub fn intern_str(&mut self, string: &str) -> Result<StringHandle, TableError> {
        self.intern(string.as_bytes())
    }

    /// Looks up a slice of bytes, without interning it.
    ///
    /// Returns `None` if no live entry has this content, including when `bytes` is too long to ever be interned.
    pub fn lookup(&self, bytes: &[u8]) -> Option<StringHandle> {
        if bytes.len() > MAX_SHORT_LEN {
            return None;
        }

        let bucket = self.buckets.index_of(self.seed.hash(bytes));

        self.find(bucket, bytes)
    }

    /// Releases an entry.
    ///
    /// The entry is unlinked from its bucket and freed; the table is never shrunk. The `handle`, and any copy of it,
    /// is invalid afterwards: using it is reported as `StaleHandle`.
    ///
    /// Fails with `IdMismatch` if `handle` is from another table, `StaleHandle` if it was already released, and
    /// `EntryNotInBucket` if the entry cannot be found in the bucket its hash designates.
    pub fn release(&mut self, handle: StringHandle) -> Result<(), TableError> {
        self.get_entry(handle)?;

        if let Err(error) = self.buckets.unlink(handle.slot(), &mut self.slots) {
            tracing::warn!(table = self.id.get(), ?handle, %error, "failed to release entry");

            return Err(error);
        }

        self.slots.remove(handle.slot());

        tracing::trace!(table = self.id.get(), ?handle, "released entry");

        Ok(())
    }

    /// Releases all entries, keeping the current number of buckets.
    ///
    /// All outstanding handles are invalid afterwards.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.slots.clear();
    }

    /// Redistributes the entries amongst `bucket_count` buckets.
    ///
    /// Both growing and shrinking allocate the new array of buckets first, then rehash every entry.
    ///
    /// Fails with `PowerOfTwoViolation` if `bucket_count` is not a power of 2, `BucketLimitExceeded` if it exceeds
    /// `MAX_BUCKETS`, and `AllocationFailure` if memory is exhausted. On failure, the table is left unchanged.
    pub fn resize(&mut self, bucket_count: usize) -> Result<(), TableError> {
        let old = self.buckets.len();

        if bucket_count == old {
            return Ok(());
        }

        self.buckets.rehash(bucket_count, &mut self.slots)?;

        tracing::debug!(table = self.id.get(), old, new = bucket_count, entries = self.len(), "resized table");

        Ok(())
    }

    /// Gets the content of a previously interned entry.
    ///
    /// Returns an error if the `handle` is NOT for this instance, or was released.
    pub fn content_of(&self, handle: StringHandle) -> Result<&[u8], TableError> {
        self.get_entry(handle).map(Entry::bytes)
    }

    /// Gets the content of a previously interned entry, followed by a NUL terminator.
    ///
    /// The terminator is not part of the content: the content itself may contain NUL bytes.
    pub fn content_with_nul(&self, handle: StringHandle) -> Result<&[u8], TableError> {
        self.get_entry(handle).map(Entry::bytes_with_nul)
    }

    /// Gets the content of a previously interned entry, as a string.
    ///
    /// Fails with `InvalidUtf8` if the content is not UTF-8.
    pub fn get_str(&self, handle: StringHandle) -> Result<&str, TableError> {
        let bytes = self.content_of(handle)?;

        core::str::from_utf8(bytes).map_err(|_| TableError::InvalidUtf8)
    }

    /// Gets the cached hash of a previously interned entry.
    pub fn hash_of(&self, handle: StringHandle) -> Result<u32, TableError> {
        self.get_entry(handle).map(Entry::hash)
    }

    /// Returns whether two handles designate the same entry.
    ///
    /// Since contents are interned, this is equivalent to comparing the contents of both, in O(1).
    #[inline(always)]
    pub fn equals(left: StringHandle, right: StringHandle) -> bool {
        left == right
    }

    /// Returns an iterator over the live entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (StringHandle, &[u8])> + '_ {
        let id = self.id;

        self.slots
            .iter()
            .map(move |(index, generation, entry)| (StringHandle::new(index, generation, id), entry.bytes()))
    }

    /// Returns statistics about the distribution of the entries.
    pub fn statistics(&self) -> TableStatistics {
        let (occupied_buckets, longest_chain) = self.buckets.occupancy(&self.slots);

        TableStatistics {
            entries: self.len(),
            buckets: self.bucket_count(),
            occupied_buckets,
            longest_chain,
        }
    }
}

impl fmt::Debug for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{{ id: {}, seed: {:#x}, buckets: [", self.id.get(), self.seed.get())?;

        let mut first = true;

        for bucket in 0..self.buckets.len() {
            if self.buckets.head(bucket).is_none() {
                continue;
            }

            let separator = if first { "" } else { ", " };
            first = false;

            write!(f, "{separator}{bucket}: [")?;

            for (index, (_, entry)) in self.buckets.chain(bucket, &self.slots).enumerate() {
                let separator = if index > 0 { ", " } else { "" };

                write!(f, "{separator}{entry:?}")?;
            }

            write!(f, "]")?;
        }

        write!(f, "] }}")
    }
}

/// Statistics about a `StringTable`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TableStatistics {
    /// Number of live entries.
    pub entries: usize,
    /// Number of buckets.
    pub buckets: usize,
    /// Number of buckets with at least one entry.
    pub occupied_buckets: usize,
    /// Number of entries in the longest chain.
    pub longest_chain: usize,
}

impl TableStatistics {
    /// Returns the ratio of live entries to buckets.
    pub fn load_factor(&self) -> f64 {
        self.entries as f64 / self.buckets as f64
    }
}

/// A builder for the StringTable.
pub struct StringTableBuilder {
    id: Option<Id>,
    seed: HashSeed,
    initial_buckets: usize,
}

impl StringTableBuilder {
    /// Sets the ID with which to build the table.
    ///
    /// The ID is used to tie a `StringHandle` to its matching `StringTable`, the user should ensure that no
    /// `StringHandle` with this `id` from another `StringTable` are ever used with this instance, lest they designate
    /// unrelated entries.
    pub fn set_id(&mut self, id: Id) -> &mut Self {
        self.id = Some(id);
        self
    }

    /// Sets the seed of the hash.
    pub fn set_seed(&mut self, seed: HashSeed) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Sets the initial number of buckets.
    ///
    /// It should be a power of 2, no greater than `MAX_BUCKETS`, or `build` will fail.
    pub fn set_initial_buckets(&mut self, bucket_count: usize) -> &mut Self {
        self.initial_buckets = bucket_count;
        self
    }

    /// Attempts to build a StringTable with the current configuration.
    ///
    /// This may fail either because:
    ///
    /// -   No ID was specified, and the pool of IDs is exhausted,
    /// -   or the initial number of buckets is invalid,
    /// -   or the allocator cannot currently allocate the buckets.
    pub fn build(&self) -> Result<StringTable, TableError> {
        let buckets = Buckets::new(self.initial_buckets)?;

        let id = if let Some(id) = self.id { id } else { Id::new()? };

        tracing::debug!(table = id.get(), buckets = buckets.len(), seed = self.seed.get(), "created table");

        Ok(StringTable {
            id,
            seed: self.seed,
            buckets,
            slots: Slots::default(),
        })
    }
}

//
//  Implementation
//

impl StringTable {
    fn check_length(bytes: &[u8]) -> Result<(), TableError> {
        if bytes.len() > MAX_SHORT_LEN {
            return Err(TableError::InvalidLength {
                length: bytes.len(),
                max: MAX_SHORT_LEN,
            });
        }

        Ok(())
    }

    //  Doubles the number of buckets, unless already at the maximum.
    fn grow(&mut self) -> Result<(), TableError> {
        let current = self.buckets.len();

        if current >= MAX_BUCKETS {
            tracing::warn!(table = self.id.get(), buckets = current, "table at maximum size, not growing");

            return Ok(());
        }

        self.resize(current * 2)
    }

    fn get_entry(&self, handle: StringHandle) -> Result<&Entry, TableError> {
        if handle.table_id() != self.id {
            return Err(TableError::IdMismatch);
        }

        self.slots
            .get_checked(handle.slot(), handle.generation())
            .ok_or(TableError::StaleHandle)
    }

    fn find(&self, bucket: usize, bytes: &[u8]) -> Option<StringHandle> {
        let index = self.buckets.find(bucket, bytes, &self.slots)?;
        let generation = self.slots.generation(index)?;

        Some(StringHandle::new(index, generation, self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_send<T: Send>() {}
    fn ensure_sync<T: Sync>() {}

    #[test]
    fn table_send() {
        ensure_send::<StringTable>();
        ensure_send::<StringHandle>();
    }

    #[test]
    fn table_sync() {
        ensure_sync::<StringTable>();
    }

    #[test]
    fn table_defaults() {
        let table = StringTable::new().unwrap();

        assert_eq!(DEFAULT_BUCKETS, table.bucket_count());
        assert_eq!(HashSeed::default(), table.seed());
        assert!(table.is_empty());
    }

    #[test]
    fn table_builder_invalid_buckets() {
        assert_eq!(TableError::PowerOfTwoViolation(10), StringTable::with_buckets(10).unwrap_err());
        assert_eq!(TableError::PowerOfTwoViolation(0), StringTable::with_buckets(0).unwrap_err());
    }

    #[test]
    fn table_builder_seed() {
        let mut builder = StringTable::builder();
        builder.set_seed(HashSeed::new(42)).set_initial_buckets(4);

        let mut table = builder.build().unwrap();

        let handle = table.intern(b"Hotaru").unwrap();

        assert_eq!(4, table.bucket_count());
        assert_eq!(HashSeed::new(42).hash(b"Hotaru"), table.hash_of(handle).unwrap());
    }

    #[test]
    fn table_builder_id() {
        let id = Id::new().unwrap();

        let table = StringTable::builder().set_id(id).build().unwrap();

        assert_eq!(id, table.id());
    }

    #[test]
    fn table_intern_too_long() {
        let mut table = StringTable::new().unwrap();

        let result = table.intern(&[b'x'; MAX_SHORT_LEN + 1]);

        assert_eq!(
            TableError::InvalidLength {
                length: MAX_SHORT_LEN + 1,
                max: MAX_SHORT_LEN
            },
            result.unwrap_err()
        );
        assert!(table.is_empty());
    }

    #[test]
    fn table_lookup() {
        let mut table = StringTable::new().unwrap();

        assert_eq!(None, table.lookup(b"Suki"));

        let handle = table.intern(b"Suki").unwrap();

        assert_eq!(Some(handle), table.lookup(b"Suki"));
        assert_eq!(None, table.lookup(&[0; MAX_SHORT_LEN + 1]));
        assert_eq!(1, table.len());
    }

    #[test]
    fn table_lookup_after_reuse() {
        let mut table = StringTable::new().unwrap();

        let first = table.intern(b"Suki").unwrap();
        table.release(first).unwrap();

        let second = table.intern(b"Hotaru").unwrap();

        assert_eq!(Some(second), table.lookup(b"Hotaru"));
        assert_ne!(first, second);
    }

    #[test]
    fn table_views() {
        let mut table = StringTable::new().unwrap();

        let handle = table.intern_str("Hotaru").unwrap();

        assert_eq!(b"Hotaru", table.content_of(handle).unwrap());
        assert_eq!(b"Hotaru\0", table.content_with_nul(handle).unwrap());
        assert_eq!("Hotaru", table.get_str(handle).unwrap());

        let invalid = table.intern(&[0xC3]).unwrap();

        assert_eq!(TableError::InvalidUtf8, table.get_str(invalid).unwrap_err());
    }

    #[test]
    fn table_id_mismatch() {
        let mut one = StringTable::new().unwrap();
        let mut two = StringTable::new().unwrap();

        let handle = one.intern(b"Suki").unwrap();
        two.intern(b"Suki").unwrap();

        assert_eq!(TableError::IdMismatch, two.content_of(handle).unwrap_err());
        assert_eq!(TableError::IdMismatch, two.release(handle).unwrap_err());
        assert_eq!(1, two.len());
    }

    #[test]
    fn table_double_release() {
        let mut table = StringTable::new().unwrap();

        let handle = table.intern(b"Suki").unwrap();

        table.release(handle).unwrap();

        assert_eq!(TableError::StaleHandle, table.release(handle).unwrap_err());
        assert_eq!(TableError::StaleHandle, table.content_of(handle).unwrap_err());
        assert!(table.is_empty());
    }

    #[test]
    fn table_release_keeps_buckets() {
        let mut table = StringTable::with_buckets(4).unwrap();

        let handles: Vec<_> = (0..8u8).map(|i| table.intern(&[i]).unwrap()).collect();
        let buckets = table.bucket_count();

        for handle in handles {
            table.release(handle).unwrap();
        }

        assert_eq!(buckets, table.bucket_count());
        assert!(table.is_empty());
    }

    #[test]
    fn table_resize_same() {
        let mut table = StringTable::new().unwrap();

        table.resize(DEFAULT_BUCKETS).unwrap();

        assert_eq!(DEFAULT_BUCKETS, table.bucket_count());
    }

    #[test]
    fn table_resize_invalid() {
        let mut table = StringTable::new().unwrap();

        let handle = table.intern(b"Suki").unwrap();

        assert_eq!(TableError::PowerOfTwoViolation(24), table.resize(24).unwrap_err());
        assert_eq!(DEFAULT_BUCKETS, table.bucket_count());
        assert_eq!(Some(handle), table.lookup(b"Suki"));
    }

    #[test]
    fn table_resize_shrink() {
        let mut table = StringTable::with_buckets(64).unwrap();

        let handles: Vec<_> = (0..20u8).map(|i| table.intern(&[b'k', i]).unwrap()).collect();

        table.resize(2).unwrap();

        assert_eq!(2, table.bucket_count());

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(Some(handle), table.lookup(&[b'k', i as u8]));
        }
    }

    #[test]
    fn table_clear() {
        let mut table = StringTable::new().unwrap();

        let handle = table.intern(b"Suki").unwrap();

        table.clear();

        assert!(table.is_empty());
        assert_eq!(None, table.lookup(b"Suki"));
        assert_eq!(TableError::StaleHandle, table.content_of(handle).unwrap_err());

        let again = table.intern(b"Suki").unwrap();

        assert_ne!(handle, again);
    }

    #[test]
    fn table_iter() {
        let mut table = StringTable::new().unwrap();

        let suki = table.intern(b"Suki").unwrap();
        let hotaru = table.intern(b"Hotaru").unwrap();

        let mut entries: Vec<_> = table.iter().collect();
        entries.sort_by_key(|(_, bytes)| bytes.to_vec());

        assert_eq!(vec![(hotaru, &b"Hotaru"[..]), (suki, &b"Suki"[..])], entries);
    }

    #[test]
    fn table_statistics() {
        let mut table = StringTable::new().unwrap();

        table.intern(b"Hotaru").unwrap();
        table.intern(b"Suki").unwrap();

        let statistics = table.statistics();

        assert_eq!(2, statistics.entries);
        assert_eq!(DEFAULT_BUCKETS, statistics.buckets);
        assert!(statistics.occupied_buckets >= 1);
        assert!(statistics.longest_chain >= 1);
        assert_eq!(2.0 / 16.0, statistics.load_factor());
    }

    #[test]
    fn table_debug() {
        let mut table = StringTable::with_buckets(1).unwrap();

        assert_eq!(format!("{{ id: {}, seed: 0xaaab, buckets: [] }}", table.id().get()), format!("{table:?}"));

        table.intern(b"Suki").unwrap();

        //  Interning into a single bucket immediately grows the table.
        assert_eq!(2, table.bucket_count());

        let bucket = HashSeed::default().hash(b"Suki") & 1;

        assert_eq!(
            format!("{{ id: {}, seed: 0xaaab, buckets: [{bucket}: [\"Suki\"]] }}", table.id().get()),
            format!("{table:?}")
        );
    }
} // mod tests
