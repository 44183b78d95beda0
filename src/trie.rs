use std::cmp::Ordering;
use std::fmt;

use log::trace;

use crate::analyzer::{BitComparison, KeyAnalyzer};
use crate::store::{NodeId, NodeStore, ROOT};
use crate::types::{BitIndex, Cursor, Decision, TrieError};

//------------ PatriciaTrie --------------------------------------------------

/// An ordered map from bit string keys to values.
///
/// Keys are stored in a PATRICIA trie: every node carries a key and the
/// index of the single bit on which it splits its subtree, and descent ends
/// when it runs into an edge that points back up the tree. On top of the
/// usual map operations this supports nearest-neighbor selection under the
/// trie's bit metric ([`select`][Self::select]), live sub-maps over a bit
/// prefix or a key range, and cursor-driven traversal where the caller
/// decides per entry whether to continue, stop, or remove.
///
/// All bit-level access to keys goes through the [`KeyAnalyzer`] the trie is
/// created with; iteration order is the lexicographic bit order that
/// analyzer induces.
#[derive(Clone)]
pub struct PatriciaTrie<K, V, A> {
    pub(crate) store: NodeStore<K, V>,
    pub(crate) size: usize,
    pub(crate) mod_count: u64,
    pub(crate) analyzer: A,
}

impl<K, V, A: Default> Default for PatriciaTrie<K, V, A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<K, V, A> PatriciaTrie<K, V, A> {
    /// Create an empty trie that inspects keys through `analyzer`.
    pub fn new(analyzer: A) -> Self {
        PatriciaTrie {
            store: NodeStore::init(),
            size: 0,
            mod_count: 0,
            analyzer,
        }
    }

    /// The analyzer this trie inspects keys with. Its
    /// [`compare`][KeyAnalyzer::compare] is the order entries are iterated
    /// in.
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// The number of entries in the trie.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.store = NodeStore::init();
        self.size = 0;
        self.mod_count += 1;
    }

    /// The number of structural changes this trie has seen. Every insert,
    /// replacement, removal and clear bumps it; read-only operations,
    /// including the ordered-neighbor lookups, leave it alone.
    pub fn mod_count(&self) -> u64 {
        self.mod_count
    }
}

impl<K, V, A: KeyAnalyzer<K>> PatriciaTrie<K, V, A> {
    //--- Lookup

    /// Look up the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = self.get_entry(key)?;
        self.store[id].value.as_ref()
    }

    /// Look up the value stored for `key` for in-place modification.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.get_entry(key)?;
        self.store[id].value.as_mut()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get_entry(key).is_some()
    }

    pub(crate) fn get_entry(&self, key: &K) -> Option<NodeId> {
        let key_len = self.analyzer.length_in_bits(key);
        let near = self.nearest(key, key_len);
        if self.keys_equal(key, near) {
            Some(near)
        } else {
            None
        }
    }

    // Descend from the top of the tree, steering by the discriminating bit
    // of each node, until an edge no longer increases the bit index. That
    // edge is an uplink and its target holds the key that agrees with `key`
    // on every bit tested along the way.
    pub(crate) fn nearest(&self, key: &K, key_len: u32) -> NodeId {
        let mut path = ROOT;
        let mut current = self.store[ROOT].left;
        loop {
            let cur_bit = self.store[current].bit_index;
            if cur_bit <= self.store[path].bit_index {
                return current;
            }
            path = current;
            current = if self.bit_set(key, cur_bit, key_len) {
                self.right_of(current)
            } else {
                self.store[current].left
            };
        }
    }

    //--- Insertion

    /// Store `value` for `key`, returning the value the key held before.
    ///
    /// Fails with [`TrieError::InconsistentAnalyzer`] only when the analyzer
    /// contradicts itself; for a correct analyzer this method always
    /// succeeds.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TrieError> {
        let key_len = self.analyzer.length_in_bits(&key);

        // The only place for a key without meaningful bits is the root.
        if key_len == 0 {
            return Ok(self.replace_root(key, value));
        }

        let found = self.nearest(&key, key_len);
        if self.keys_equal(&key, found) {
            self.mod_count += 1;
            return Ok(self.store[found].set_key_value(key, value));
        }

        let bit = {
            let other = self.store[found].key.as_ref();
            let other_len = other.map_or(0, |k| self.analyzer.length_in_bits(k));
            self.analyzer.bit_index(&key, 0, key_len, other, 0, other_len)
        };
        trace!("discriminating bit {:?} for new entry", bit);

        match bit {
            BitComparison::Differs(bit) => {
                let entry = self.store.store_node(
                    key,
                    Some(value),
                    BitIndex::Bit(bit),
                );
                self.add_entry(entry, key_len);
                self.size += 1;
                self.mod_count += 1;
                Ok(None)
            }
            // Every meaningful bit of the key is zero; it joins the
            // zero-length keys at the root.
            BitComparison::Null => Ok(self.replace_root(key, value)),
            BitComparison::Equal if found != ROOT => {
                self.mod_count += 1;
                Ok(self.store[found].set_key_value(key, value))
            }
            _ => Err(TrieError::InconsistentAnalyzer),
        }
    }

    fn replace_root(&mut self, key: K, value: V) -> Option<V> {
        if self.store[ROOT].is_empty() {
            self.size += 1;
        }
        self.mod_count += 1;
        self.store[ROOT].set_key_value(key, value)
    }

    // Walk down to the insertion point of `entry` and splice it in. The
    // insertion point is the first node that either discriminates at or past
    // the entry's own bit, or sits at the end of an uplink.
    fn add_entry(&mut self, entry: NodeId, key_len: u32) {
        let entry_bit = self.store[entry].bit_index;
        let mut path = ROOT;
        let mut current = self.store[ROOT].left;
        loop {
            let cur_bit = self.store[current].bit_index;
            let path_bit = self.store[path].bit_index;
            if cur_bit >= entry_bit || cur_bit <= path_bit {
                trace!(
                    "splicing at bit {}, displacing bit {}",
                    entry_bit,
                    cur_bit
                );
                // One child self-loops, forming the uplink the new node
                // owns; the other absorbs the displaced edge.
                if self.node_bit_set(entry, entry_bit, key_len) {
                    self.store[entry].left = current;
                    self.store[entry].right = Some(entry);
                } else {
                    self.store[entry].left = entry;
                    self.store[entry].right = Some(current);
                }
                self.store[entry].parent = Some(path);
                if cur_bit >= entry_bit {
                    // the displaced edge was a real subtree
                    self.store[current].parent = Some(entry);
                }
                if cur_bit <= path_bit {
                    // the displaced edge was an uplink; it now ends here
                    self.store[current].predecessor = entry;
                }
                if path == ROOT
                    || !self.node_bit_set(entry, path_bit, key_len)
                {
                    self.store[path].left = entry;
                } else {
                    self.store[path].right = Some(entry);
                }
                return;
            }
            path = current;
            current = if self.node_bit_set(entry, cur_bit, key_len) {
                self.right_of(current)
            } else {
                self.store[current].left
            };
        }
    }

    //--- Removal

    /// Remove the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.get_entry(key)?;
        self.remove_entry(id).1
    }

    // Splice the node out of the tree and take its payload. The slot is
    // cleared before it is released.
    pub(crate) fn remove_entry(&mut self, h: NodeId) -> (Option<K>, Option<V>) {
        if h != ROOT {
            if self.store[h].is_internal(h) {
                trace!("removing internal node");
                self.remove_internal_entry(h);
            } else {
                trace!("removing external node");
                self.remove_external_entry(h);
            }
        }
        self.size -= 1;
        self.mod_count += 1;
        let node = &mut self.store[h];
        let kv = (node.key.take(), node.value.take());
        if h != ROOT {
            self.store.release_node(h);
        }
        kv
    }

    // At least one child of `h` is a self-loop; its other child simply moves
    // up into h's place.
    fn remove_external_entry(&mut self, h: NodeId) {
        let parent = self.parent_of(h);
        let child = if self.store[h].left == h {
            self.right_of(h)
        } else {
            self.store[h].left
        };
        if self.store[parent].left == h {
            self.store[parent].left = child;
        } else {
            self.store[parent].right = Some(child);
        }
        if self.store[child].bit_index > self.store[parent].bit_index {
            self.store[child].parent = Some(parent);
        } else {
            // the edge has become an uplink
            self.store[child].predecessor = parent;
        }
    }

    // Both children of `h` are real edges. The node whose uplink ends at
    // `h` leaves its own external position and takes over h's place and bit
    // index.
    fn remove_internal_entry(&mut self, h: NodeId) {
        let p = self.store[h].predecessor;
        let h_bit = self.store[h].bit_index;
        self.store[p].bit_index = h_bit;

        // Detach p from its current spot, substituting its other child.
        {
            let parent = self.parent_of(p);
            let child = if self.store[p].left == h {
                self.right_of(p)
            } else {
                self.store[p].left
            };
            // If p's uplink was a self-loop it is now pointed at from its
            // parent; taking over h's spot makes the self reference true
            // again later.
            if self.store[p].predecessor == p && self.store[p].parent != Some(h)
            {
                self.store[p].predecessor = parent;
            }
            if self.store[parent].left == p {
                self.store[parent].left = child;
            } else {
                self.store[parent].right = Some(child);
            }
            if self.store[child].bit_index > self.store[parent].bit_index {
                self.store[child].parent = Some(parent);
            }
        }

        // Point h's children and parent at p instead.
        {
            let h_left = self.store[h].left;
            let h_right = self.right_of(h);
            if self.store[h_left].parent == Some(h) {
                self.store[h_left].parent = Some(p);
            }
            if self.store[h_right].parent == Some(h) {
                self.store[h_right].parent = Some(p);
            }
            let h_parent = self.parent_of(h);
            if self.store[h_parent].left == h {
                self.store[h_parent].left = p;
            } else {
                self.store[h_parent].right = Some(p);
            }
        }

        // Copy the remaining links from h to p and repoint any uplinks that
        // ended at h.
        {
            let (h_parent, h_left, h_right) = {
                let h_node = &self.store[h];
                (h_node.parent, h_node.left, h_node.right)
            };
            self.store[p].parent = h_parent;
            self.store[p].left = h_left;
            self.store[p].right = h_right;
            let p_left = self.store[p].left;
            if self.is_valid_uplink(Some(p_left), p) {
                self.store[p_left].predecessor = p;
            }
            let p_right = self.store[p].right;
            if self.is_valid_uplink(p_right, p) {
                if let Some(r) = p_right {
                    self.store[r].predecessor = p;
                }
            }
        }
    }

    //--- Selection

    /// The entry whose key is closest to `key` under the trie's bit metric:
    /// the stored key with maximal agreement on the bits tested while
    /// walking down the tree. On a trie that is not empty this always finds
    /// an entry.
    pub fn select(&self, key: &K) -> Option<(&K, &V)> {
        if self.is_empty() {
            return None;
        }
        let key_len = self.analyzer.length_in_bits(key);
        let mut found = None;
        let start = self.store[ROOT].left;
        if !self.select_r(start, BitIndex::Root, key, key_len, &mut found) {
            return found.and_then(|id| self.entry_ref(id));
        }
        None
    }

    // Returns true while the search should keep going. The first non-empty
    // uplink target reached settles the selection.
    fn select_r(
        &self,
        h: NodeId,
        bit_index: BitIndex,
        key: &K,
        key_len: u32,
        found: &mut Option<NodeId>,
    ) -> bool {
        let h_bit = self.store[h].bit_index;
        if h_bit <= bit_index {
            if !self.store[h].is_empty() {
                *found = Some(h);
                return false;
            }
            return true;
        }
        let left = self.store[h].left;
        let right = self.right_of(h);
        let (near, far) = if self.bit_set(key, h_bit, key_len) {
            (right, left)
        } else {
            (left, right)
        };
        if self.select_r(near, h_bit, key, key_len, found) {
            return self.select_r(far, h_bit, key, key_len, found);
        }
        false
    }

    /// Like [`select`][Self::select], but the cursor decides per candidate
    /// whether to accept it. The walk visits candidates in order of
    /// decreasing bit agreement with `key`. [`Decision::Remove`] is rejected:
    /// selection is read-only apart from [`Decision::RemoveAndExit`], which
    /// removes the accepted entry and hands it back detached.
    pub fn select_with<C>(
        &mut self,
        key: &K,
        cursor: &mut C,
    ) -> Result<Option<(K, V)>, TrieError>
    where
        C: Cursor<K, V>,
        K: Clone,
        V: Clone,
    {
        if self.is_empty() {
            return Ok(None);
        }
        let key_len = self.analyzer.length_in_bits(key);
        let start = self.store[ROOT].left;
        let mut result = None;
        self.select_with_r(
            start,
            BitIndex::Root,
            key,
            key_len,
            cursor,
            &mut result,
        )?;
        Ok(result)
    }

    fn select_with_r<C>(
        &mut self,
        h: NodeId,
        bit_index: BitIndex,
        key: &K,
        key_len: u32,
        cursor: &mut C,
        result: &mut Option<(K, V)>,
    ) -> Result<bool, TrieError>
    where
        C: Cursor<K, V>,
        K: Clone,
        V: Clone,
    {
        let h_bit = self.store[h].bit_index;
        if h_bit <= bit_index {
            if !self.store[h].is_empty() {
                let decision = {
                    let node = &self.store[h];
                    match (node.key.as_ref(), node.value.as_ref()) {
                        (Some(k), Some(v)) => cursor.select(k, v),
                        _ => Decision::Continue,
                    }
                };
                match decision {
                    Decision::Remove => {
                        return Err(TrieError::RemoveDuringSelect);
                    }
                    Decision::Exit => {
                        *result = self.entry_cloned(h);
                        return Ok(false);
                    }
                    Decision::RemoveAndExit => {
                        let (k, v) = self.remove_entry(h);
                        *result = k.zip(v);
                        return Ok(false);
                    }
                    Decision::Continue => {}
                }
            }
            return Ok(true);
        }
        let left = self.store[h].left;
        let right = self.right_of(h);
        let (near, far) = if self.bit_set(key, h_bit, key_len) {
            (right, left)
        } else {
            (left, right)
        };
        if self.select_with_r(near, h_bit, key, key_len, cursor, result)? {
            return self.select_with_r(far, h_bit, key, key_len, cursor, result);
        }
        Ok(false)
    }

    //--- Cursor traversal

    /// Walk the entries in bit order, letting `cursor` decide per entry
    /// whether to continue, stop, remove and continue, or remove and stop.
    /// Returns the entry the cursor stopped on, detached from the trie, or
    /// `None` when the walk ran off the end.
    pub fn traverse<C>(&mut self, cursor: &mut C) -> Option<(K, V)>
    where
        C: Cursor<K, V>,
        K: Clone,
        V: Clone,
    {
        let mut entry = self.first_entry();
        while let Some(current) = entry {
            let decision = {
                let node = &self.store[current];
                match (node.key.as_ref(), node.value.as_ref()) {
                    (Some(k), Some(v)) => cursor.select(k, v),
                    _ => Decision::Continue,
                }
            };
            // the successor is read off before any removal rewires links
            entry = self.next_entry(Some(current));
            match decision {
                Decision::Exit => return self.entry_cloned(current),
                Decision::Remove => {
                    self.remove_entry(current);
                }
                Decision::RemoveAndExit => {
                    let (k, v) = self.remove_entry(current);
                    return k.zip(v);
                }
                Decision::Continue => {}
            }
        }
        None
    }

    //--- Ordered neighbors

    /// The entry with the least key at or above `key`.
    pub fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        self.ceiling_entry(key).and_then(|id| self.entry_ref(id))
    }

    /// The entry with the least key strictly above `key`.
    pub fn higher(&self, key: &K) -> Option<(&K, &V)> {
        self.higher_entry(key).and_then(|id| self.entry_ref(id))
    }

    /// The entry with the greatest key at or below `key`.
    pub fn floor(&self, key: &K) -> Option<(&K, &V)> {
        self.floor_entry(key).and_then(|id| self.entry_ref(id))
    }

    /// The entry with the greatest key strictly below `key`.
    pub fn lower(&self, key: &K) -> Option<(&K, &V)> {
        self.lower_entry(key).and_then(|id| self.entry_ref(id))
    }

    pub(crate) fn ceiling_entry(&self, key: &K) -> Option<NodeId> {
        let key_len = self.analyzer.length_in_bits(key);
        if key_len == 0 {
            return self.root_or_first();
        }
        let found = self.nearest(key, key_len);
        if self.keys_equal(key, found) {
            return Some(found);
        }
        match self.discriminating_bit(key, key_len, found) {
            BitComparison::Differs(bit) => {
                self.neighbor_above(key, key_len, bit)
            }
            BitComparison::Null => self.root_or_first(),
            BitComparison::Equal => Some(found),
            BitComparison::OutOfBounds => None,
        }
    }

    pub(crate) fn higher_entry(&self, key: &K) -> Option<NodeId> {
        let key_len = self.analyzer.length_in_bits(key);
        if key_len == 0 {
            return self.after_root_or_first();
        }
        let found = self.nearest(key, key_len);
        if self.keys_equal(key, found) {
            return self.next_entry(Some(found));
        }
        match self.discriminating_bit(key, key_len, found) {
            BitComparison::Differs(bit) => {
                self.neighbor_above(key, key_len, bit)
            }
            BitComparison::Null => self.after_root_or_first(),
            BitComparison::Equal => self.next_entry(Some(found)),
            BitComparison::OutOfBounds => None,
        }
    }

    pub(crate) fn floor_entry(&self, key: &K) -> Option<NodeId> {
        let key_len = self.analyzer.length_in_bits(key);
        if key_len == 0 {
            return self.root_if_occupied();
        }
        let found = self.nearest(key, key_len);
        if self.keys_equal(key, found) {
            return Some(found);
        }
        match self.discriminating_bit(key, key_len, found) {
            BitComparison::Differs(bit) => {
                self.neighbor_below(key, key_len, bit)
            }
            BitComparison::Null => self.root_if_occupied(),
            BitComparison::Equal => Some(found),
            BitComparison::OutOfBounds => None,
        }
    }

    pub(crate) fn lower_entry(&self, key: &K) -> Option<NodeId> {
        let key_len = self.analyzer.length_in_bits(key);
        if key_len == 0 {
            return None;
        }
        let found = self.nearest(key, key_len);
        if self.keys_equal(key, found) {
            return self.previous_entry(found);
        }
        match self.discriminating_bit(key, key_len, found) {
            BitComparison::Differs(bit) => {
                self.neighbor_below(key, key_len, bit)
            }
            // only the root position sorts at or below an all-zero key
            BitComparison::Null => None,
            BitComparison::Equal => self.previous_entry(found),
            BitComparison::OutOfBounds => None,
        }
    }

    fn discriminating_bit(
        &self,
        key: &K,
        key_len: u32,
        found: NodeId,
    ) -> BitComparison {
        let other = self.store[found].key.as_ref();
        let other_len = other.map_or(0, |k| self.analyzer.length_in_bits(k));
        self.analyzer.bit_index(key, 0, key_len, other, 0, other_len)
    }

    fn root_or_first(&self) -> Option<NodeId> {
        if !self.store[ROOT].is_empty() {
            Some(ROOT)
        } else {
            self.first_entry()
        }
    }

    fn after_root_or_first(&self) -> Option<NodeId> {
        if !self.store[ROOT].is_empty() {
            if self.size > 1 {
                self.next_entry(Some(ROOT))
            } else {
                None
            }
        } else {
            self.first_entry()
        }
    }

    fn root_if_occupied(&self) -> Option<NodeId> {
        if !self.store[ROOT].is_empty() {
            Some(ROOT)
        } else {
            None
        }
    }

    // The ordered successor a node with discriminating bit `bit` would have
    // if it were spliced in for `key`. Retraces the insertion walk and then
    // evaluates the ordinary successor steps against the would-be node's
    // known neighborhood, without touching the tree.
    fn neighbor_above(
        &self,
        key: &K,
        key_len: u32,
        bit: u32,
    ) -> Option<NodeId> {
        let (path, current, displaced_uplink) =
            self.insertion_point(key, key_len, bit);
        if self.bit_set_at(key, bit, key_len) {
            // The displaced edge would hang off the left of the new node;
            // everything below it precedes the key. Climb instead.
            let from_right = path != ROOT
                && self.node_key_bit(key, key_len, path);
            self.successor_above(path, from_right)
        } else if displaced_uplink && !self.store[current].is_empty() {
            // The displaced uplink's target agrees with the key on every
            // tested bit and sorts right after it.
            Some(current)
        } else {
            self.first_below(current)
        }
    }

    // Mirror image of `neighbor_above` for the ordered predecessor.
    fn neighbor_below(
        &self,
        key: &K,
        key_len: u32,
        bit: u32,
    ) -> Option<NodeId> {
        let (path, current, displaced_uplink) =
            self.insertion_point(key, key_len, bit);
        if self.bit_set_at(key, bit, key_len) {
            if displaced_uplink && !self.store[current].is_empty() {
                Some(current)
            } else {
                self.follow_right(current)
            }
        } else {
            let from_left = path == ROOT
                || !self.node_key_bit(key, key_len, path);
            self.predecessor_below(path, from_left)
        }
    }

    // Where the insertion walk for (`key`, `bit`) stops: the node about to
    // be displaced, its parent on the path, and whether the displaced edge
    // is an uplink.
    fn insertion_point(
        &self,
        key: &K,
        key_len: u32,
        bit: u32,
    ) -> (NodeId, NodeId, bool) {
        let entry_bit = BitIndex::Bit(bit);
        let mut path = ROOT;
        let mut current = self.store[ROOT].left;
        loop {
            let cur_bit = self.store[current].bit_index;
            let path_bit = self.store[path].bit_index;
            if cur_bit >= entry_bit || cur_bit <= path_bit {
                return (path, current, cur_bit <= path_bit);
            }
            path = current;
            current = if self.bit_set(key, cur_bit, key_len) {
                self.right_of(current)
            } else {
                self.store[current].left
            };
        }
    }

    // Successor steps from a would-be node that hangs under `parent`, on
    // its right side iff `from_right`.
    fn successor_above(
        &self,
        mut parent: NodeId,
        mut from_right: bool,
    ) -> Option<NodeId> {
        while from_right {
            match self.store[parent].parent {
                None => return None,
                Some(gp) => {
                    from_right = self.store[gp].right == Some(parent);
                    parent = gp;
                }
            }
        }
        let pright = self.store[parent].right?;
        if self.is_valid_uplink(Some(pright), parent) {
            return Some(pright);
        }
        if pright == parent {
            return None;
        }
        self.first_below(pright)
    }

    // Predecessor steps from a would-be node that hangs under `parent`, on
    // its left side iff `from_left`.
    fn predecessor_below(
        &self,
        mut parent: NodeId,
        mut from_left: bool,
    ) -> Option<NodeId> {
        while from_left {
            match self.store[parent].parent {
                None => return None,
                Some(gp) => {
                    from_left = self.store[gp].left == parent;
                    parent = gp;
                }
            }
        }
        let left = self.store[parent].left;
        if self.is_valid_uplink(Some(left), parent) {
            if left == ROOT {
                return self.root_if_occupied();
            }
            return Some(left);
        }
        self.follow_right(left)
    }

    fn node_key_bit(&self, key: &K, key_len: u32, node: NodeId) -> bool {
        self.bit_set(key, self.store[node].bit_index, key_len)
    }

    fn bit_set_at(&self, key: &K, bit: u32, key_len: u32) -> bool {
        self.analyzer.is_bit_set(key, bit, key_len)
    }

    //--- Subtree location for prefix views

    // Locate the node that roots the subtree of all keys matching the bits
    // `[offset, offset + length)` of `prefix`, if any key does.
    pub(crate) fn subtree(
        &self,
        prefix: &K,
        offset: u32,
        length: u32,
    ) -> Option<NodeId> {
        let mut path = ROOT;
        let mut current = self.store[ROOT].left;
        loop {
            let cur_bit = self.store[current].bit_index;
            if cur_bit <= self.store[path].bit_index || !cur_bit.within(length)
            {
                break;
            }
            path = current;
            let set = match cur_bit.bit() {
                Some(bit) => self.analyzer.is_bit_set(
                    prefix,
                    offset + bit,
                    offset + length,
                ),
                None => false,
            };
            current = if set {
                self.right_of(current)
            } else {
                self.store[current].left
            };
        }

        let entry = if self.store[current].is_empty() { path } else { current };
        if self.store[entry].is_empty() {
            trace!("no subtree for the requested prefix");
            return None;
        }

        let entry_len = self.key_length(entry);
        let end = offset + length;
        if entry == ROOT && entry_len < end {
            return None;
        }

        // The bit just before the end of the prefix must agree; if it does
        // not, the candidate merely shares the higher bits.
        let last_prefix_bit = self.analyzer.is_bit_set(prefix, end - 1, end);
        let last_entry_bit = match self.store[entry].key.as_ref() {
            Some(k) => self.analyzer.is_bit_set(k, length - 1, entry_len),
            None => false,
        };
        if last_prefix_bit != last_entry_bit {
            return None;
        }

        let cmp = self.analyzer.bit_index(
            prefix,
            offset,
            length,
            self.store[entry].key.as_ref(),
            0,
            entry_len,
        );
        if let BitComparison::Differs(i) = cmp {
            if i < length {
                return None;
            }
        }
        Some(entry)
    }

    //--- Shared internal helpers

    pub(crate) fn entry_ref(&self, id: NodeId) -> Option<(&K, &V)> {
        let node = &self.store[id];
        Some((node.key.as_ref()?, node.value.as_ref()?))
    }

    pub(crate) fn entry_cloned(&self, id: NodeId) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.entry_ref(id).map(|(k, v)| (k.clone(), v.clone()))
    }

    pub(crate) fn key_length(&self, id: NodeId) -> u32 {
        self.store[id]
            .key
            .as_ref()
            .map_or(0, |k| self.analyzer.length_in_bits(k))
    }

    fn keys_equal(&self, key: &K, id: NodeId) -> bool {
        match self.store[id].key.as_ref() {
            Some(k) => self.analyzer.compare(key, k) == Ordering::Equal,
            None => false,
        }
    }

    fn bit_set(&self, key: &K, bit: BitIndex, key_len: u32) -> bool {
        match bit {
            BitIndex::Root => false,
            BitIndex::Bit(bit) => self.analyzer.is_bit_set(key, bit, key_len),
        }
    }

    // The bit of a node's own key at `bit`, for the node's key length.
    fn node_bit_set(&self, id: NodeId, bit: BitIndex, key_len: u32) -> bool {
        match (self.store[id].key.as_ref(), bit) {
            (Some(k), BitIndex::Bit(bit)) => {
                self.analyzer.is_bit_set(k, bit, key_len)
            }
            _ => false,
        }
    }

    // The right child; non-root nodes always have one.
    pub(crate) fn right_of(&self, id: NodeId) -> NodeId {
        match self.store[id].right {
            Some(right) => right,
            None => id,
        }
    }

    fn parent_of(&self, id: NodeId) -> NodeId {
        match self.store[id].parent {
            Some(parent) => parent,
            None => ROOT,
        }
    }

    pub(crate) fn is_valid_uplink(
        &self,
        next: Option<NodeId>,
        from: NodeId,
    ) -> bool {
        match next {
            Some(next) => {
                self.store[next].bit_index <= self.store[from].bit_index
                    && !self.store[next].is_empty()
            }
            None => false,
        }
    }
}

impl<K, V, A> fmt::Debug for PatriciaTrie<K, V, A>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: KeyAnalyzer<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
