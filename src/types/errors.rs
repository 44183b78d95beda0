use std::fmt;

/// Possible errors returned by methods on a trie or one of its views
#[derive(Debug, PartialEq, Eq)]
pub enum TrieError {
    /// A prefix view was requested over a bit range that extends past the
    /// meaningful bits of the prefix key, or over an empty bit range.
    InvalidBitRange,
    /// A range view was requested with a lower endpoint that orders after
    /// its upper endpoint.
    InvertedRange,
    /// A range view was requested without a single bounded endpoint.
    UnboundedRange,
    /// An insert through a view was attempted with a key that lies outside
    /// the view, or a sub-view was requested that leaves its parent's
    /// bounds. The underlying trie is unchanged.
    KeyOutsideView,
    /// A cursor asked for removal while driving a nearest-match selection.
    /// Selection is read-only; removal during traversal is available through
    /// the traverse method instead.
    RemoveDuringSelect,
    /// The key analyzer contradicted itself while an entry was being placed.
    /// This cannot happen for a well-behaved analyzer; it exists to catch
    /// analyzer bugs. The trie must be considered corrupted once this is
    /// returned.
    InconsistentAnalyzer,
}

impl std::error::Error for TrieError {}

impl fmt::Display for TrieError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TrieError::InvalidBitRange => {
                write!(
                    f,
                    "Error: The requested bit range does not fit the prefix \
                    key."
                )
            }
            TrieError::InvertedRange => {
                write!(
                    f,
                    "Error: The lower endpoint of the range orders after \
                    the upper endpoint."
                )
            }
            TrieError::UnboundedRange => {
                write!(
                    f,
                    "Error: A range view needs at least one bounded endpoint."
                )
            }
            TrieError::KeyOutsideView => {
                write!(f, "Error: The key lies outside the bounds of this view.")
            }
            TrieError::RemoveDuringSelect => {
                write!(
                    f,
                    "Error: A cursor cannot remove entries during selection. \
                    Use traverse for cursor-driven removal."
                )
            }
            TrieError::InconsistentAnalyzer => {
                write!(
                    f,
                    "Error: The key analyzer returned an inconsistent bit \
                    comparison. The trie must be considered corrupted."
                )
            }
        }
    }
}
