//! Bit-level inspection of keys.
//!
//! The trie never touches the bits of a key itself. Every bit-level decision
//! flows through a [`KeyAnalyzer`], a stateless capability implemented once
//! per key type. The analyzers in this module cover the common key shapes;
//! anything with a well-defined bit string can be made a key by implementing
//! the trait.

use std::cmp::Ordering;

mod bigint;
mod bytes;
mod integers;
mod strings;

pub use bigint::BigUintKeyAnalyzer;
pub use bytes::{BoundedByteKeyAnalyzer, ByteKeyAnalyzer};
pub use integers::{
    IntegerKeyAnalyzer, U16KeyAnalyzer, U32KeyAnalyzer, U64KeyAnalyzer,
    U8KeyAnalyzer,
};
pub use strings::StringKeyAnalyzer;

//------------ BitComparison -------------------------------------------------

/// The outcome of comparing two key windows bit by bit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BitComparison {
    /// The first bit index, relative to the start of the windows, at which
    /// the two disagree.
    Differs(u32),
    /// The windows are bit-identical.
    Equal,
    /// The first key is absent, or every inspected bit of it is zero.
    Null,
    /// The requested window extends past the analyzer's declared maximum.
    OutOfBounds,
}

//------------ KeyAnalyzer ---------------------------------------------------

/// Bit-level inspection and comparison of keys of type `K`.
///
/// All operations must be pure and mutually consistent: `compare` must be
/// the lexicographic order over the bit strings that `is_bit_set` exposes,
/// and `bit_index` must report the first position at which those bit strings
/// disagree. Bits past the end of a key read as zero.
pub trait KeyAnalyzer<K> {
    /// The number of meaningful bits in `key`.
    fn length_in_bits(&self, key: &K) -> u32;

    /// The natural element size of the key type, e.g. 8 for byte strings.
    /// Only used by callers that address keys in elements rather than bits.
    fn bits_per_element(&self) -> u32;

    /// Whether the bit at `bit_index` of `key` is set. Bits at or past
    /// `length_in_bits` are zero.
    fn is_bit_set(&self, key: &K, bit_index: u32, length_in_bits: u32)
        -> bool;

    /// The first bit at which the window `[offset, offset + length)` of
    /// `key` differs from the window `[other_offset, other_offset +
    /// other_length)` of `other`, counted from the start of the windows.
    /// The shorter window is read as padded with zero bits; an absent
    /// `other` is an all-zero window.
    #[allow(clippy::too_many_arguments)]
    fn bit_index(
        &self,
        key: &K,
        offset: u32,
        length: u32,
        other: Option<&K>,
        other_offset: u32,
        other_length: u32,
    ) -> BitComparison;

    /// Total order over keys, consistent with the bit order above.
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// Whether the bits `[offset, offset + length)` of `prefix` equal the
    /// first `length` bits of `key`.
    fn is_prefix(&self, prefix: &K, offset: u32, length: u32, key: &K) -> bool {
        if length == 0 {
            return true;
        }
        let prefix_len = self.length_in_bits(prefix);
        let key_len = self.length_in_bits(key);
        if length > key_len {
            return false;
        }
        (0..length).all(|i| {
            self.is_bit_set(prefix, offset + i, prefix_len)
                == self.is_bit_set(key, i, key_len)
        })
    }
}
