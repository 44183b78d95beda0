//! Bit-order traversal.
//!
//! Walking the trie in key order never needs a parent stack: the uplink that
//! ends at an entry, recorded in its `predecessor` link, tells the walk
//! where it came in, and the `parent` links carry it back out. The iterators
//! here drive those walks; the step functions themselves also back the
//! ordered-neighbor lookups and the views.

use crate::analyzer::KeyAnalyzer;
use crate::store::{NodeId, ROOT};
use crate::trie::PatriciaTrie;

impl<K, V, A: KeyAnalyzer<K>> PatriciaTrie<K, V, A> {
    /// The entry with the least key, together with its value.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.first_entry().and_then(|id| self.entry_ref(id))
    }

    /// The entry with the greatest key, together with its value.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.last_entry().and_then(|id| self.entry_ref(id))
    }

    pub(crate) fn first_entry(&self) -> Option<NodeId> {
        if self.is_empty() {
            return None;
        }
        Some(self.follow_left(ROOT))
    }

    pub(crate) fn last_entry(&self) -> Option<NodeId> {
        match self.follow_right(self.store[ROOT].left) {
            Some(id) => Some(id),
            // only the root can end the walk without a right child, which
            // happens when it holds the sole entry
            None => {
                if self.store[ROOT].is_empty() {
                    None
                } else {
                    Some(ROOT)
                }
            }
        }
    }

    // Keep taking left edges, falling through to the right where the left
    // child is the empty root sentinel, until an edge stops increasing the
    // bit index. That edge's target is the least entry below `node`.
    pub(crate) fn follow_left(&self, mut node: NodeId) -> NodeId {
        loop {
            let mut child = self.store[node].left;
            if self.store[child].is_empty() {
                child = self.right_of(node);
            }
            if self.store[child].bit_index <= self.store[node].bit_index {
                return child;
            }
            node = child;
        }
    }

    // The greatest entry below `node`: keep to the right until the edge
    // turns into an uplink.
    pub(crate) fn follow_right(&self, mut node: NodeId) -> Option<NodeId> {
        self.store[node].right?;
        loop {
            let right = self.right_of(node);
            if self.store[right].bit_index <= self.store[node].bit_index {
                return Some(right);
            }
            node = right;
        }
    }

    // The least entry at or below `start`, without ever climbing above it.
    pub(crate) fn first_below(&self, start: NodeId) -> Option<NodeId> {
        self.next_entry_impl(start, None, None)
    }

    /// The entry following `node` in bit order, or the first entry when
    /// called with `None`.
    pub(crate) fn next_entry(&self, node: Option<NodeId>) -> Option<NodeId> {
        match node {
            None => self.first_entry(),
            Some(node) => self.next_entry_impl(
                self.store[node].predecessor,
                Some(node),
                None,
            ),
        }
    }

    /// Like [`next_entry`][Self::next_entry], but never walks above
    /// `subtree_root`.
    pub(crate) fn next_entry_in_subtree(
        &self,
        node: NodeId,
        subtree_root: NodeId,
    ) -> Option<NodeId> {
        self.next_entry_impl(
            self.store[node].predecessor,
            Some(node),
            Some(subtree_root),
        )
    }

    // The workhorse behind forward traversal. `start` is where to resume
    // the walk, `previous` the entry handed out last, and `bound` an
    // optional subtree root the walk must not leave.
    fn next_entry_impl(
        &self,
        start: NodeId,
        previous: Option<NodeId>,
        bound: Option<NodeId>,
    ) -> Option<NodeId> {
        let mut current = start;

        // Unless the left side below `start` was already handed out, walk
        // it first, returning the first uplink target on the way down.
        if previous.is_none()
            || previous
                .map(|p| self.store[p].predecessor != start)
                .unwrap_or(false)
        {
            loop {
                let left = self.store[current].left;
                if self.store[left].is_empty() || previous == Some(left) {
                    break;
                }
                if self.is_valid_uplink(Some(left), current) {
                    return Some(left);
                }
                current = left;
            }
        }

        if self.store[current].is_empty() {
            return None;
        }
        let right = self.store[current].right?;

        if previous != Some(right) {
            if self.is_valid_uplink(Some(right), current) {
                return Some(right);
            }
            return self.next_entry_impl(right, previous, bound);
        }

        // The right side was handed out as well; climb until we stop being
        // a right child, giving up at the subtree bound.
        loop {
            let parent = self.store[current].parent?;
            if self.store[parent].right != Some(current) {
                break;
            }
            if Some(current) == bound {
                return None;
            }
            current = parent;
        }
        if Some(current) == bound {
            return None;
        }
        let parent = self.store[current].parent?;
        let pright = self.store[parent].right?;
        if previous != Some(pright)
            && self.is_valid_uplink(Some(pright), parent)
        {
            return Some(pright);
        }
        if pright == parent {
            return None;
        }
        self.next_entry_impl(pright, previous, bound)
    }

    /// The entry preceding `start` in bit order. Runs off the uplink that
    /// ends at `start` rather than retracing the downward path.
    pub(crate) fn previous_entry(&self, start: NodeId) -> Option<NodeId> {
        let pred = self.store[start].predecessor;
        if self.store[pred].right == Some(start) {
            // the walk came in through the right; the predecessor's left
            // side holds everything smaller
            let left = self.store[pred].left;
            if self.is_valid_uplink(Some(left), pred) {
                return Some(left);
            }
            return self.follow_right(left);
        }
        let mut node = pred;
        let parent = loop {
            match self.store[node].parent {
                // on the left flank of the tree nothing comes before us
                None => return None,
                Some(parent) => {
                    if self.store[parent].left != node {
                        break parent;
                    }
                    node = parent;
                }
            }
        };
        let left = self.store[parent].left;
        if self.is_valid_uplink(Some(left), parent) {
            if left == ROOT {
                return if self.store[ROOT].is_empty() {
                    None
                } else {
                    Some(ROOT)
                };
            }
            return Some(left);
        }
        self.follow_right(left)
    }

    //--- Public iterators

    /// Iterate over the entries in bit order.
    pub fn iter(&self) -> Iter<'_, K, V, A> {
        Iter {
            front: self.first_entry(),
            back: self.last_entry(),
            remaining: self.len(),
            trie: self,
        }
    }

    /// Iterate over the keys in bit order.
    pub fn keys(&self) -> Keys<'_, K, V, A> {
        Keys { inner: self.iter() }
    }

    /// Iterate over the values, in bit order of their keys.
    pub fn values(&self) -> Values<'_, K, V, A> {
        Values { inner: self.iter() }
    }
}

//------------ Iter ----------------------------------------------------------

/// Iterator over the entries of a trie in bit order.
pub struct Iter<'a, K, V, A> {
    trie: &'a PatriciaTrie<K, V, A>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V, A: KeyAnalyzer<K>> Iterator for Iter<'a, K, V, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = self.trie.next_entry(Some(id));
        }
        self.trie.entry_ref(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, A: KeyAnalyzer<K>> DoubleEndedIterator for Iter<'a, K, V, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = self.trie.previous_entry(id);
        }
        self.trie.entry_ref(id)
    }
}

impl<K, V, A: KeyAnalyzer<K>> ExactSizeIterator for Iter<'_, K, V, A> {}

//------------ Keys / Values -------------------------------------------------

/// Iterator over the keys of a trie in bit order.
pub struct Keys<'a, K, V, A> {
    inner: Iter<'a, K, V, A>,
}

impl<'a, K, V, A: KeyAnalyzer<K>> Iterator for Keys<'a, K, V, A> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over the values of a trie in bit order of their keys.
pub struct Values<'a, K, V, A> {
    inner: Iter<'a, K, V, A>,
}

impl<'a, K, V, A: KeyAnalyzer<K>> Iterator for Values<'a, K, V, A> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

//------------ IntoIter ------------------------------------------------------

/// Owning iterator over the entries of a trie in bit order.
pub struct IntoIter<K, V, A> {
    trie: PatriciaTrie<K, V, A>,
    order: std::vec::IntoIter<NodeId>,
}

impl<K, V, A: KeyAnalyzer<K>> Iterator for IntoIter<K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        let node = &mut self.trie.store[id];
        node.key.take().zip(node.value.take())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<'a, K, V, A: KeyAnalyzer<K>> IntoIterator for &'a PatriciaTrie<K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, A: KeyAnalyzer<K>> IntoIterator for PatriciaTrie<K, V, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        // The walk order is pinned down first; taking the payloads out
        // afterwards does not disturb the links it was derived from.
        let mut order = Vec::with_capacity(self.len());
        let mut entry = self.first_entry();
        while let Some(id) = entry {
            order.push(id);
            entry = self.next_entry(Some(id));
        }
        IntoIter {
            trie: self,
            order: order.into_iter(),
        }
    }
}
