//  A single interned short string.

use core::fmt;

use crate::id::SlotIndex;

/// The maximum length, in bytes, of a short string.
pub const MAX_SHORT_LEN: usize = 48;

/// An interned short string: its cached hash, its chain link, and its content.
///
/// The content is stored inline, followed by a NUL terminator which is not counted in its length.
pub(crate) struct Entry {
    hash: u32,
    length: u8,
    next: Option<SlotIndex>,
    content: [u8; MAX_SHORT_LEN + 1],
}

impl Entry {
    /// Creates a new, unlinked, entry.
    ///
    /// #   Panics
    ///
    /// If `bytes` is longer than `MAX_SHORT_LEN`.
    pub(crate) fn new(hash: u32, bytes: &[u8]) -> Self {
        assert!(bytes.len() <= MAX_SHORT_LEN);

        let mut content = [0; MAX_SHORT_LEN + 1];
        content[..bytes.len()].copy_from_slice(bytes);

        Self {
            hash,
            length: bytes.len() as u8,
            next: None,
            content,
        }
    }

    /// Returns the cached hash.
    #[inline(always)]
    pub(crate) fn hash(&self) -> u32 {
        self.hash
    }

    /// Returns the content, without terminator.
    #[inline(always)]
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.content[..self.length as usize]
    }

    /// Returns the content, followed by its NUL terminator.
    pub(crate) fn bytes_with_nul(&self) -> &[u8] {
        &self.content[..=self.length as usize]
    }

    /// Returns whether the content is exactly `bytes`.
    ///
    /// The length is checked first, as a cheap reject.
    #[inline(always)]
    pub(crate) fn matches(&self, bytes: &[u8]) -> bool {
        self.length as usize == bytes.len() && self.bytes() == bytes
    }

    /// Returns the next entry in the chain, if any.
    #[inline(always)]
    pub(crate) fn next(&self) -> Option<SlotIndex> {
        self.next
    }

    /// Sets the next entry in the chain.
    #[inline(always)]
    pub(crate) fn set_next(&mut self, next: Option<SlotIndex>) {
        self.next = next;
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let bytes = self.bytes();

        if let Ok(string) = core::str::from_utf8(bytes) {
            write!(f, "{string:?}")
        } else {
            write!(f, "{bytes:x?}")
        }
    }
}

// mod tests
