//! Short string interning table.
//!
//! The `StringTable` stores each distinct short byte string once, and hands out a `StringHandle` per entry. Interning
//! equal contents yields the same handle, so that comparing strings boils down to comparing handles.
//!
//!
//! #   How to use?
//!
//! If you just want to get going, use the `new` method, and you'll get a default configured `StringTable` which
//! will be quite fine.
//!
//! ```
//! use shortstr_interner::StringTable;
//!
//! let mut table = StringTable::new()?;
//!
//! let hotaru = table.intern_str("Hotaru")?;
//! let suki = table.intern_str("Suki")?;
//!
//! assert_eq!(hotaru, table.intern_str("Hotaru")?);
//! assert_ne!(hotaru, suki);
//! assert_eq!(b"Suki", table.content_of(suki)?);
//! # Ok::<(), shortstr_interner::TableError>(())
//! ```
//!
//!
//! #   Configuration options
//!
//! The `StringTable` offers a few configuration options, available via the `StringTableBuilder`:
//!
//! -   The seed of the hash, it defaults to `DEFAULT_SEED`.
//! -   The initial number of buckets, it defaults to 16. It must be a power of 2.
//!
//!
//! #   Limits
//!
//! The `StringTable` has some hard limits, due to design constraints:
//!
//! -   It supports only strings up to `MAX_SHORT_LEN` bytes, eg. 48. Longer strings are rejected, and should be
//!     stored by other means.
//! -   It supports only up to 2**31 buckets, past which chains simply lengthen.
//! -   It supports only up to 4 billions live entries, eg. 2**32 - 1.
//!
//!
//! #   Internals
//!
//! The `StringTable` is a hash table with separate chaining:
//!
//! -   Entries live in an arena, and are designated by their slot index. Each entry caches the hash of its content,
//!     and stores its content inline, followed by a NUL terminator.
//! -   The buckets form a power-of-2 sized array of chain heads; the chains are threaded through the entries.
//! -   When the number of entries reaches the number of buckets, the number of buckets is doubled and every entry is
//!     rehashed, before the new entry is inserted.
//!
//! Released slots are reused, with a bumped generation, so that a `StringHandle` to a released entry is detected
//! rather than silently designating another entry.

//  Use only core and alloc, guaranteeing no I/O nor threads.
#![cfg_attr(not(test), no_std)]
//  Indexes all the way down.
#![forbid(unsafe_code)]
//  Ensure proper documentation.
#![deny(missing_docs)]

//  Non-core must be explicitly depended on in no_std.
extern crate alloc;

mod buckets;
mod entry;
mod error;
mod hash;
mod id;
mod slots;
mod table;

pub use buckets::MAX_BUCKETS;
pub use entry::MAX_SHORT_LEN;
pub use error::TableError;
pub use hash::{bucket_index, hash_short, HashSeed, DEFAULT_SEED};
pub use id::{Id, StringHandle};
pub use table::{StringTable, StringTableBuilder, TableStatistics, DEFAULT_BUCKETS};
