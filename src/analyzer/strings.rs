use std::cmp::Ordering;

use serde_derive::{Deserialize, Serialize};

use super::{BitComparison, KeyAnalyzer};

//------------ StringKeyAnalyzer ---------------------------------------------

/// Analyzer for string keys over their UTF-16 code units, 16 bits per
/// element, most significant bit first within each unit.
///
/// Offsets and lengths handed to the windowed operations must sit on 16-bit
/// boundaries. Anything else is a caller bug and panics.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct StringKeyAnalyzer;

const UNIT: u32 = 16;

impl StringKeyAnalyzer {
    pub const fn new() -> Self {
        StringKeyAnalyzer
    }

    fn unit_at(key: &str, index: usize) -> u16 {
        key.encode_utf16().nth(index).unwrap_or(0)
    }
}

impl KeyAnalyzer<String> for StringKeyAnalyzer {
    fn length_in_bits(&self, key: &String) -> u32 {
        key.encode_utf16().count() as u32 * UNIT
    }

    fn bits_per_element(&self) -> u32 {
        UNIT
    }

    fn is_bit_set(
        &self,
        key: &String,
        bit_index: u32,
        length_in_bits: u32,
    ) -> bool {
        if bit_index >= length_in_bits {
            return false;
        }
        let unit = Self::unit_at(key, (bit_index / UNIT) as usize);
        unit & (0x8000 >> (bit_index % UNIT)) != 0
    }

    fn bit_index(
        &self,
        key: &String,
        offset: u32,
        length: u32,
        other: Option<&String>,
        other_offset: u32,
        other_length: u32,
    ) -> BitComparison {
        assert!(
            offset % UNIT == 0
                && other_offset % UNIT == 0
                && length % UNIT == 0
                && other_length % UNIT == 0,
            "string key windows must sit on 16 bit boundaries"
        );
        let begin1 = (offset / UNIT) as usize;
        let begin2 = (other_offset / UNIT) as usize;
        let units1 = (length / UNIT) as usize;
        let units2 = (other_length / UNIT) as usize;

        let mut it1 = key.encode_utf16().skip(begin1);
        let mut it2 = other.map(|o| o.encode_utf16().skip(begin2));

        let mut all_null = true;
        for i in 0..units1.max(units2) {
            let k = if i < units1 { it1.next().unwrap_or(0) } else { 0 };
            let f = match &mut it2 {
                Some(it) if i < units2 => it.next().unwrap_or(0),
                _ => 0,
            };
            if k != f {
                let x = (k ^ f) as u32;
                return BitComparison::Differs(
                    i as u32 * UNIT + (x.leading_zeros() - UNIT),
                );
            }
            if k != 0 {
                all_null = false;
            }
        }
        if all_null {
            BitComparison::Null
        } else {
            BitComparison::Equal
        }
    }

    fn compare(&self, a: &String, b: &String) -> Ordering {
        // UTF-16 code unit order; this differs from the code point order
        // of str's own Ord for supplementary plane characters.
        a.encode_utf16().cmp(b.encode_utf16())
    }

    fn is_prefix(
        &self,
        prefix: &String,
        offset: u32,
        length: u32,
        key: &String,
    ) -> bool {
        assert!(
            offset % UNIT == 0 && length % UNIT == 0,
            "string key windows must sit on 16 bit boundaries"
        );
        let begin = (offset / UNIT) as usize;
        let units = (length / UNIT) as usize;
        let window: Vec<u16> =
            prefix.encode_utf16().skip(begin).take(units).collect();
        if window.len() < units {
            return false;
        }
        let head: Vec<u16> = key.encode_utf16().take(units).collect();
        head == window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_follow_code_units() {
        let an = StringKeyAnalyzer::new();
        let key = "A".to_string(); // 0x0041
        assert_eq!(an.length_in_bits(&key), 16);
        assert!(!an.is_bit_set(&key, 0, 16));
        assert!(an.is_bit_set(&key, 9, 16));
        assert!(an.is_bit_set(&key, 15, 16));
        // past the end of the key everything reads zero
        assert!(!an.is_bit_set(&key, 16, 16));
        assert!(!an.is_bit_set(&key, 200, 16));
    }

    #[test]
    fn discriminating_bit_between_strings() {
        let an = StringKeyAnalyzer::new();
        let a = "Anna".to_string();
        let b = "Alex".to_string();
        // 'n' = 0x6E, 'l' = 0x6C: first difference inside unit 1 is bit 30
        assert_eq!(
            an.bit_index(&a, 0, 64, Some(&b), 0, 64),
            BitComparison::Differs(30)
        );
        assert_eq!(
            an.bit_index(&a, 0, 64, Some(&a), 0, 64),
            BitComparison::Equal
        );
        assert_eq!(
            an.bit_index(&a, 0, 64, None, 0, 0),
            BitComparison::Differs(9)
        );
    }

    #[test]
    fn null_window() {
        let an = StringKeyAnalyzer::new();
        let zero = "\u{0}\u{0}".to_string();
        assert_eq!(
            an.bit_index(&zero, 0, 32, None, 0, 0),
            BitComparison::Null
        );
    }

    #[test]
    fn shared_prefixes() {
        let an = StringKeyAnalyzer::new();
        let lime = "Lime".to_string();
        assert!(an.is_prefix(&lime, 0, 64, &"LimeWire".to_string()));
        assert!(an.is_prefix(&lime, 0, 64, &"Lime".to_string()));
        assert!(!an.is_prefix(&lime, 0, 64, &"Lax".to_string()));
        assert!(an.is_prefix(&lime, 16, 32, &"imozzz".to_string()));
    }

    #[test]
    #[should_panic(expected = "16 bit boundaries")]
    fn misaligned_window_is_a_caller_bug() {
        let an = StringKeyAnalyzer::new();
        let a = "ab".to_string();
        an.bit_index(&a, 3, 16, None, 0, 0);
    }
}
