use std::cmp::Ordering;
use std::marker::PhantomData;

use num_traits::{One, PrimInt, Unsigned, Zero};
use serde_derive::{Deserialize, Serialize};

use super::{BitComparison, KeyAnalyzer};

//------------ IntegerKeyAnalyzer --------------------------------------------

/// Analyzer for fixed-width unsigned integer keys, most significant bit
/// first.
///
/// Every bit of the integer is meaningful, so the bit string of a key always
/// has the full width of the type. Windowed comparisons must start at bit
/// zero; fixed-width keys have no sub-key ranges worth addressing.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct IntegerKeyAnalyzer<T>(PhantomData<T>);

pub type U8KeyAnalyzer = IntegerKeyAnalyzer<u8>;
pub type U16KeyAnalyzer = IntegerKeyAnalyzer<u16>;
pub type U32KeyAnalyzer = IntegerKeyAnalyzer<u32>;
pub type U64KeyAnalyzer = IntegerKeyAnalyzer<u64>;

impl<T> IntegerKeyAnalyzer<T> {
    pub const fn new() -> Self {
        IntegerKeyAnalyzer(PhantomData)
    }
}

impl<T: PrimInt + Unsigned> KeyAnalyzer<T> for IntegerKeyAnalyzer<T> {
    fn length_in_bits(&self, _key: &T) -> u32 {
        std::mem::size_of::<T>() as u32 * 8
    }

    fn bits_per_element(&self) -> u32 {
        1
    }

    fn is_bit_set(&self, key: &T, bit_index: u32, length_in_bits: u32) -> bool {
        let width = std::mem::size_of::<T>() as u32 * 8;
        if bit_index >= length_in_bits || bit_index >= width {
            return false;
        }
        !((*key >> (width - 1 - bit_index) as usize) & T::one()).is_zero()
    }

    fn bit_index(
        &self,
        key: &T,
        offset: u32,
        _length: u32,
        other: Option<&T>,
        other_offset: u32,
        _other_length: u32,
    ) -> BitComparison {
        assert!(
            offset == 0 && other_offset == 0,
            "fixed-width integer keys are compared from bit 0"
        );
        if key.is_zero() {
            return BitComparison::Null;
        }
        let other = other.copied().unwrap_or_else(T::zero);
        if *key != other {
            BitComparison::Differs((*key ^ other).leading_zeros())
        } else {
            BitComparison::Equal
        }
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_comes_first() {
        let an = U32KeyAnalyzer::new();
        assert!(an.is_bit_set(&0x8000_0000u32, 0, 32));
        assert!(!an.is_bit_set(&0x8000_0000u32, 1, 32));
        assert!(an.is_bit_set(&1u32, 31, 32));
    }

    #[test]
    fn bits_past_the_window_read_zero() {
        let an = U16KeyAnalyzer::new();
        assert!(!an.is_bit_set(&0xFFFFu16, 4, 4));
        assert!(!an.is_bit_set(&0xFFFFu16, 16, 16));
    }

    #[test]
    fn discriminating_bit() {
        let an = U32KeyAnalyzer::new();
        assert_eq!(
            an.bit_index(&0b0100u32, 0, 32, Some(&0b0110u32), 0, 32),
            BitComparison::Differs(30)
        );
        assert_eq!(
            an.bit_index(&7u32, 0, 32, Some(&7u32), 0, 32),
            BitComparison::Equal
        );
        assert_eq!(
            an.bit_index(&0u32, 0, 32, Some(&7u32), 0, 32),
            BitComparison::Null
        );
        assert_eq!(
            an.bit_index(&0x80u32, 0, 32, None, 0, 0),
            BitComparison::Differs(24)
        );
    }

    #[test]
    fn order_matches_bit_order() {
        let an = U8KeyAnalyzer::new();
        let mut keys = [0x01u8, 0xFF, 0x80, 0x00];
        keys.sort_by(|a, b| an.compare(a, b));
        assert_eq!(keys, [0x00, 0x01, 0x80, 0xFF]);
    }
}
