use std::cmp::Ordering;

use num_bigint::BigUint;
use serde_derive::{Deserialize, Serialize};

use super::{BitComparison, KeyAnalyzer};

//------------ BigUintKeyAnalyzer --------------------------------------------

/// Analyzer for arbitrary-precision unsigned integer keys.
///
/// Bit `i` of a key is its `i`-th least significant bit and the length of a
/// key is the position of its highest set bit, so the bit string of `0b1101`
/// reads `1, 0, 1, 1`. Zero has no meaningful bits and lives at the trie's
/// root. Note that the induced key order is the lexicographic order over
/// these bit strings, not the numeric order: all even numbers sort before
/// all odd ones.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct BigUintKeyAnalyzer;

impl BigUintKeyAnalyzer {
    pub const fn new() -> Self {
        BigUintKeyAnalyzer
    }
}

impl KeyAnalyzer<BigUint> for BigUintKeyAnalyzer {
    fn length_in_bits(&self, key: &BigUint) -> u32 {
        key.bits() as u32
    }

    fn bits_per_element(&self) -> u32 {
        1
    }

    fn is_bit_set(
        &self,
        key: &BigUint,
        bit_index: u32,
        length_in_bits: u32,
    ) -> bool {
        bit_index < length_in_bits && key.bit(bit_index as u64)
    }

    fn bit_index(
        &self,
        key: &BigUint,
        offset: u32,
        length: u32,
        other: Option<&BigUint>,
        other_offset: u32,
        other_length: u32,
    ) -> BitComparison {
        let mut all_null = true;
        for i in 0..length.max(other_length) {
            let k = i < length && key.bit((offset + i) as u64);
            let f = match other {
                Some(o) if i < other_length => o.bit((other_offset + i) as u64),
                _ => false,
            };
            if k != f {
                return BitComparison::Differs(i);
            }
            if k {
                all_null = false;
            }
        }
        if all_null {
            BitComparison::Null
        } else {
            BitComparison::Equal
        }
    }

    fn compare(&self, a: &BigUint, b: &BigUint) -> Ordering {
        let la = a.bits();
        let lb = b.bits();
        for i in 0..la.max(lb) {
            match (a.bit(i), b.bit(i)) {
                (false, true) => return Ordering::Less,
                (true, false) => return Ordering::Greater,
                _ => {}
            }
        }
        Ordering::Equal
    }
}
