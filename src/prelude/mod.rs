pub use crate::analyzer::{
    BigUintKeyAnalyzer, BitComparison, BoundedByteKeyAnalyzer,
    ByteKeyAnalyzer, IntegerKeyAnalyzer, KeyAnalyzer, StringKeyAnalyzer,
    U16KeyAnalyzer, U32KeyAnalyzer, U64KeyAnalyzer, U8KeyAnalyzer,
};
pub use crate::trie::PatriciaTrie;
pub use crate::types::{Cursor, Decision, TrieError};
pub use crate::views::{PrefixView, PrefixViewMut, RangeView, RangeViewMut};
