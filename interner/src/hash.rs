//  The hash function of short strings, and the mapping of hashes to buckets.
//
//  The mixing is the classic runtime string pool hash: the seed is combined with the length, then the bytes are
//  folded in from last to first. The shift amounts and the iteration order are part of the format: any other
//  implementation must match them exactly to produce the same hashes.

use core::ops::BitXor;

/// The seed used when none is specified.
pub const DEFAULT_SEED: u32 = 0xAAAB;

/// A seed for the short string hash.
///
/// All hashes computed by a `StringTable` use its seed, so that two tables with distinct seeds distribute the same
/// strings differently.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HashSeed(u32);

impl HashSeed {
    /// Creates a new instance with this specific seed.
    #[inline(always)]
    pub const fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Returns the raw value of the seed.
    #[inline(always)]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Hashes `bytes` with this seed.
    #[inline(always)]
    pub fn hash(&self, bytes: &[u8]) -> u32 {
        hash_short(bytes, self.0)
    }
}

impl Default for HashSeed {
    fn default() -> Self {
        Self(DEFAULT_SEED)
    }
}

/// Computes the hash of a short string.
///
/// The hash starts as `seed ^ length`, then each byte, from the last to the first, is mixed in as
/// `hash ^= (hash << 5) + (hash >> 2) + byte`, all in wrapping 32-bits arithmetic.
///
/// This is NOT a cryptographic algorithm.
#[inline]
pub fn hash_short(bytes: &[u8], seed: u32) -> u32 {
    //  Short strings are at most a few dozen bytes, so truncation never occurs in practice.
    let mut hash = seed.bitxor(bytes.len() as u32);

    for &byte in bytes.iter().rev() {
        hash.mix_byte(byte);
    }

    hash
}

/// Returns the index of the bucket for `hash`, among `bucket_count` buckets.
///
/// #   Panics
///
/// If `bucket_count` is not a power of 2.
#[inline(always)]
pub fn bucket_index(hash: u32, bucket_count: usize) -> usize {
    assert!(bucket_count.is_power_of_two(), "{bucket_count} is not a power of 2");

    (hash as usize) & (bucket_count - 1)
}

//
//  Implementation
//

const SHIFT_LEFT: u32 = 5;
const SHIFT_RIGHT: u32 = 2;

trait MixByte {
    fn mix_byte(&mut self, byte: u8);
}

impl MixByte for u32 {
    #[inline(always)]
    fn mix_byte(&mut self, byte: u8) {
        let hash = *self;

        let mixed = (hash << SHIFT_LEFT)
            .wrapping_add(hash >> SHIFT_RIGHT)
            .wrapping_add(u32::from(byte));

        *self = hash.bitxor(mixed);
    }
}

// mod tests
