use std::cell::Cell;

use crate::analyzer::KeyAnalyzer;
use crate::store::{NodeId, ROOT};
use crate::trie::PatriciaTrie;
use crate::types::{BitIndex, TrieError};

//------------ PrefixView ----------------------------------------------------

/// A live view of all entries whose key bits match the bits
/// `[offset, offset + length)` of a prefix key.
///
/// Created by [`PatriciaTrie::prefix_view`]. The view is located once, at
/// creation: the shared borrow it holds keeps the trie from changing
/// underneath it.
pub struct PrefixView<'a, K, V, A> {
    trie: &'a PatriciaTrie<K, V, A>,
    prefix: &'a K,
    offset: u32,
    length: u32,
    subtree: Option<NodeId>,
    cached_len: Cell<Option<usize>>,
}

impl<K, V, A: KeyAnalyzer<K>> PatriciaTrie<K, V, A> {
    /// A live view over every entry whose key starts with the bits
    /// `[offset, offset + length)` of `prefix`.
    ///
    /// Fails with [`TrieError::InvalidBitRange`] when the requested window
    /// is empty or does not fit inside the prefix key.
    pub fn prefix_view<'a>(
        &'a self,
        prefix: &'a K,
        offset: u32,
        length: u32,
    ) -> Result<PrefixView<'a, K, V, A>, TrieError> {
        check_window(&self.analyzer, prefix, offset, length)?;
        Ok(PrefixView {
            trie: self,
            prefix,
            offset,
            length,
            subtree: self.subtree(prefix, offset, length),
            cached_len: Cell::new(None),
        })
    }

    /// Like [`prefix_view`][Self::prefix_view], but the view can also
    /// insert and remove. The prefix key is taken by value so the view is
    /// self-contained.
    pub fn prefix_view_mut(
        &mut self,
        prefix: K,
        offset: u32,
        length: u32,
    ) -> Result<PrefixViewMut<'_, K, V, A>, TrieError> {
        check_window(&self.analyzer, &prefix, offset, length)?;
        Ok(PrefixViewMut {
            trie: self,
            prefix,
            offset,
            length,
        })
    }
}

fn check_window<K, A: KeyAnalyzer<K>>(
    analyzer: &A,
    prefix: &K,
    offset: u32,
    length: u32,
) -> Result<(), TrieError> {
    if length == 0 || offset + length > analyzer.length_in_bits(prefix) {
        return Err(TrieError::InvalidBitRange);
    }
    Ok(())
}

impl<'a, K, V, A: KeyAnalyzer<K>> PrefixView<'a, K, V, A> {
    /// Whether `key` belongs to this view's prefix.
    pub fn contains_prefix(&self, key: &K) -> bool {
        self.trie
            .analyzer()
            .is_prefix(self.prefix, self.offset, self.length, key)
    }

    /// The value for `key`, if present and inside the prefix.
    pub fn get(&self, key: &K) -> Option<&'a V> {
        if !self.contains_prefix(key) {
            return None;
        }
        let id = self.trie.get_entry(key)?;
        self.trie.entry_ref(id).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.contains_prefix(key) && self.trie.contains_key(key)
    }

    /// Iterate over the matching entries in bit order.
    pub fn iter(&self) -> PrefixIter<'a, K, V, A> {
        PrefixIter::new(
            self.trie,
            self.subtree,
            self.prefix,
            self.offset,
            self.length,
        )
    }

    pub fn first_key_value(&self) -> Option<(&'a K, &'a V)> {
        self.iter().next()
    }

    pub fn last_key_value(&self) -> Option<(&'a K, &'a V)> {
        self.iter().last()
    }

    /// The number of matching entries. Computed by iterating once and
    /// cached for the life of the view.
    pub fn len(&self) -> usize {
        match self.cached_len.get() {
            Some(len) => len,
            None => {
                let len = self.iter().count();
                self.cached_len.set(Some(len));
                len
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a, K, V, A: KeyAnalyzer<K>> IntoIterator for &PrefixView<'a, K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = PrefixIter<'a, K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------ PrefixIter ----------------------------------------------------

/// Iterator over the entries of a [`PrefixView`] in bit order.
pub struct PrefixIter<'a, K, V, A> {
    trie: &'a PatriciaTrie<K, V, A>,
    root: NodeId,
    next: Option<NodeId>,
    singleton: bool,
    prefix: &'a K,
    offset: u32,
    length: u32,
}

impl<'a, K, V, A: KeyAnalyzer<K>> PrefixIter<'a, K, V, A> {
    fn new(
        trie: &'a PatriciaTrie<K, V, A>,
        subtree: Option<NodeId>,
        prefix: &'a K,
        offset: u32,
        length: u32,
    ) -> Self {
        let (root, next, singleton) = match subtree {
            None => (ROOT, None, true),
            Some(root) => {
                // A subtree root that cannot discriminate inside the prefix
                // window is the lone matching entry. Otherwise the walk
                // starts at the least entry below it and never climbs out.
                let singleton = match trie.store[root].bit_index {
                    BitIndex::Root => true,
                    BitIndex::Bit(bit) => length > bit,
                };
                let next = if singleton {
                    Some(root)
                } else {
                    Some(trie.follow_left(root))
                };
                (root, next, singleton)
            }
        };
        PrefixIter {
            trie,
            root,
            next,
            singleton,
            prefix,
            offset,
            length,
        }
    }
}

impl<'a, K, V, A: KeyAnalyzer<K>> Iterator for PrefixIter<'a, K, V, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // The subtree confines the walk, but its fringe can hold a key that
        // is shorter than the prefix window and merely zero-extends into
        // it. Those are not prefixed by the window and are skipped.
        loop {
            let id = self.next?;
            self.next = if self.singleton {
                None
            } else {
                self.trie.next_entry_in_subtree(id, self.root)
            };
            let (key, value) = self.trie.entry_ref(id)?;
            if self.trie.analyzer().is_prefix(
                self.prefix,
                self.offset,
                self.length,
                key,
            ) {
                return Some((key, value));
            }
        }
    }
}

//------------ PrefixViewMut -------------------------------------------------

/// A live, mutating view over every entry whose key bits match a prefix.
///
/// Created by [`PatriciaTrie::prefix_view_mut`]. Inserts of keys outside
/// the prefix fail with [`TrieError::KeyOutsideView`]; reads and removals
/// of such keys report the key as absent.
pub struct PrefixViewMut<'a, K, V, A> {
    trie: &'a mut PatriciaTrie<K, V, A>,
    prefix: K,
    offset: u32,
    length: u32,
}

impl<K, V, A: KeyAnalyzer<K>> PrefixViewMut<'_, K, V, A> {
    /// The current read-only rendition of this view. Re-locates the
    /// matching subtree, so it reflects all changes made so far.
    pub fn as_view(&self) -> PrefixView<'_, K, V, A> {
        let subtree =
            self.trie.subtree(&self.prefix, self.offset, self.length);
        PrefixView {
            trie: &*self.trie,
            prefix: &self.prefix,
            offset: self.offset,
            length: self.length,
            subtree,
            cached_len: Cell::new(None),
        }
    }

    pub fn contains_prefix(&self, key: &K) -> bool {
        self.trie
            .analyzer()
            .is_prefix(&self.prefix, self.offset, self.length, key)
    }

    /// Store `value` for `key`, which must match the view's prefix.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TrieError> {
        if !self.contains_prefix(&key) {
            return Err(TrieError::KeyOutsideView);
        }
        self.trie.insert(key, value)
    }

    /// Remove the entry for `key`. Keys outside the prefix are simply not
    /// present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        if !self.contains_prefix(key) {
            return None;
        }
        self.trie.remove(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        if !self.contains_prefix(key) {
            return None;
        }
        self.trie.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.contains_prefix(key) && self.trie.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.as_view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_view().is_empty()
    }
}
