//------------ Decision / Cursor ---------------------------------------------

/// What a [`Cursor`] wants to happen after it has seen an entry.
///
/// Note that not every operation accepts every decision: selection rejects
/// [`Decision::Remove`], since it is read-only. The operations that take a
/// cursor document which decisions they reject, and fail immediately on a
/// rejected one instead of silently ignoring it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Proceed to the next entry.
    Continue,
    /// Stop; the current entry is the result.
    Exit,
    /// Remove the current entry and proceed.
    Remove,
    /// Remove the current entry and stop; the removed pair is the result.
    RemoveAndExit,
}

/// A caller-supplied decision procedure driving an entry-by-entry walk.
///
/// Implemented for every `FnMut(&K, &V) -> Decision`, so a closure can be
/// passed directly to the traversal and selection methods.
pub trait Cursor<K, V> {
    /// Decide what to do with the entry the walk is currently on.
    fn select(&mut self, key: &K, value: &V) -> Decision;
}

impl<K, V, F> Cursor<K, V> for F
where
    F: FnMut(&K, &V) -> Decision,
{
    fn select(&mut self, key: &K, value: &V) -> Decision {
        self(key, value)
    }
}
