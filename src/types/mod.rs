mod bit_index;

pub mod cursor;
pub mod errors;

pub(crate) use bit_index::BitIndex;

pub use cursor::{Cursor, Decision};
pub use errors::TrieError;
