//! A library for storing and retrieving keys by their bit patterns.
//!
//! The central type is [`PatriciaTrie`], an ordered map keyed by arbitrary
//! bit strings. Keys are inspected exclusively through a
//! [`KeyAnalyzer`][analyzer::KeyAnalyzer]; analyzers for integers, strings,
//! byte strings and arbitrary-precision integers ship with the crate.
//! Entries iterate in lexicographic bit order, and beyond the usual map
//! surface the trie answers nearest-neighbor queries over its bit metric
//! and carves out live prefix and range sub-maps.
//!
//! ```
//! use patricia_store::prelude::*;
//!
//! let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
//! trie.insert(vec![0x50], "P")?;
//! trie.insert(vec![0x41], "A")?;
//!
//! assert_eq!(trie.first_key_value(), Some((&vec![0x41], &"A")));
//! // nearest stored key by shared leading bits
//! let (key, _) = trie.select(&vec![0x52]).unwrap();
//! assert_eq!(key, &vec![0x50]);
//! # Ok::<(), TrieError>(())
//! ```

pub mod analyzer;
pub mod iter;
pub mod prelude;
pub mod trie;
pub mod types;
pub mod views;

mod node;
mod serde_impl;
mod store;

pub use crate::analyzer::{BitComparison, KeyAnalyzer};
pub use crate::trie::PatriciaTrie;
pub use crate::types::{Cursor, Decision, TrieError};
