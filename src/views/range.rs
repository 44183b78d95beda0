use std::cmp::Ordering;
use std::ops::Bound;

use crate::analyzer::KeyAnalyzer;
use crate::store::NodeId;
use crate::trie::PatriciaTrie;
use crate::types::TrieError;

//------------ RangeView -----------------------------------------------------

/// A live view of all entries between two key endpoints, each of which is
/// independently inclusive, exclusive or absent.
///
/// Created by [`PatriciaTrie::range_view`]. At least one endpoint must be
/// bounded.
pub struct RangeView<'a, K, V, A> {
    trie: &'a PatriciaTrie<K, V, A>,
    from: Bound<&'a K>,
    to: Bound<&'a K>,
}

impl<K, V, A> Clone for RangeView<'_, K, V, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, A> Copy for RangeView<'_, K, V, A> {}

impl<K, V, A: KeyAnalyzer<K>> PatriciaTrie<K, V, A> {
    /// A live view over every entry between `from` and `to`.
    ///
    /// Fails with [`TrieError::UnboundedRange`] when neither endpoint is
    /// bounded and with [`TrieError::InvertedRange`] when the lower
    /// endpoint orders after the upper one.
    pub fn range_view<'a>(
        &'a self,
        from: Bound<&'a K>,
        to: Bound<&'a K>,
    ) -> Result<RangeView<'a, K, V, A>, TrieError> {
        check_bounds(&self.analyzer, from, to)?;
        Ok(RangeView {
            trie: self,
            from,
            to,
        })
    }

    /// Like [`range_view`][Self::range_view], but the view can also insert
    /// and remove. The endpoint keys are taken by value so the view is
    /// self-contained.
    pub fn range_view_mut(
        &mut self,
        from: Bound<K>,
        to: Bound<K>,
    ) -> Result<RangeViewMut<'_, K, V, A>, TrieError> {
        check_bounds(&self.analyzer, from.as_ref(), to.as_ref())?;
        Ok(RangeViewMut {
            trie: self,
            from,
            to,
        })
    }
}

fn check_bounds<K, A: KeyAnalyzer<K>>(
    analyzer: &A,
    from: Bound<&K>,
    to: Bound<&K>,
) -> Result<(), TrieError> {
    match (bound_key(from), bound_key(to)) {
        (None, None) => Err(TrieError::UnboundedRange),
        (Some(f), Some(t)) if analyzer.compare(f, t) == Ordering::Greater => {
            Err(TrieError::InvertedRange)
        }
        _ => Ok(()),
    }
}

fn bound_key<K>(bound: Bound<&K>) -> Option<&K> {
    match bound {
        Bound::Included(key) | Bound::Excluded(key) => Some(key),
        Bound::Unbounded => None,
    }
}

fn key_in_bounds<K, A: KeyAnalyzer<K>>(
    analyzer: &A,
    key: &K,
    from: Bound<&K>,
    to: Bound<&K>,
) -> bool {
    let lower_ok = match from {
        Bound::Unbounded => true,
        Bound::Included(f) => analyzer.compare(key, f) != Ordering::Less,
        Bound::Excluded(f) => analyzer.compare(key, f) == Ordering::Greater,
    };
    let upper_ok = match to {
        Bound::Unbounded => true,
        Bound::Included(t) => analyzer.compare(key, t) != Ordering::Greater,
        Bound::Excluded(t) => analyzer.compare(key, t) == Ordering::Less,
    };
    lower_ok && upper_ok
}

impl<'a, K, V, A: KeyAnalyzer<K>> RangeView<'a, K, V, A> {
    /// Whether `key` falls inside the view's bounds.
    pub fn in_range(&self, key: &K) -> bool {
        key_in_bounds(self.trie.analyzer(), key, self.from, self.to)
    }

    /// The value for `key`, if present and inside the bounds.
    pub fn get(&self, key: &K) -> Option<&'a V> {
        if !self.in_range(key) {
            return None;
        }
        let id = self.trie.get_entry(key)?;
        self.trie.entry_ref(id).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.in_range(key) && self.trie.contains_key(key)
    }

    // The least entry admitted by the lower bound.
    fn first_in_range(&self) -> Option<NodeId> {
        match self.from {
            Bound::Unbounded => self.trie.first_entry(),
            Bound::Included(key) => self.trie.ceiling_entry(key),
            Bound::Excluded(key) => self.trie.higher_entry(key),
        }
    }

    // The first entry past the upper bound; iteration stops there.
    fn excluded_entry(&self) -> Option<NodeId> {
        match self.to {
            Bound::Unbounded => None,
            Bound::Included(key) => self.trie.higher_entry(key),
            Bound::Excluded(key) => self.trie.ceiling_entry(key),
        }
    }

    /// Iterate over the entries inside the bounds in bit order.
    pub fn iter(&self) -> RangeIter<'a, K, V, A> {
        let excluded = self.excluded_entry();
        // A degenerate range can start past its own upper bound; catch that
        // before handing out a single entry.
        let first = self.first_in_range().filter(|&id| {
            self.trie
                .entry_ref(id)
                .map(|(k, _)| self.in_range(k))
                .unwrap_or(false)
        });
        RangeIter {
            trie: self.trie,
            next: first,
            excluded,
        }
    }

    pub fn first_key_value(&self) -> Option<(&'a K, &'a V)> {
        let id = self.first_in_range()?;
        let (k, v) = self.trie.entry_ref(id)?;
        if self.in_range(k) {
            Some((k, v))
        } else {
            None
        }
    }

    pub fn last_key_value(&self) -> Option<(&'a K, &'a V)> {
        let id = match self.to {
            Bound::Unbounded => self.trie.last_entry(),
            Bound::Included(key) => self.trie.floor_entry(key),
            Bound::Excluded(key) => self.trie.lower_entry(key),
        }?;
        let (k, v) = self.trie.entry_ref(id)?;
        if self.in_range(k) {
            Some((k, v))
        } else {
            None
        }
    }

    /// The number of entries inside the bounds, by counting them.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first_key_value().is_none()
    }

    /// A narrower view inside this one. Endpoints left unbounded inherit
    /// this view's endpoints; bounded ones must not reach outside it, or
    /// the sub-view fails with [`TrieError::KeyOutsideView`].
    pub fn sub_view(
        &self,
        from: Bound<&'a K>,
        to: Bound<&'a K>,
    ) -> Result<RangeView<'a, K, V, A>, TrieError> {
        let analyzer = self.trie.analyzer();
        let from = match bound_key(from) {
            None => self.from,
            Some(key) => {
                if !self.covers_endpoint(analyzer, key) {
                    return Err(TrieError::KeyOutsideView);
                }
                from
            }
        };
        let to = match bound_key(to) {
            None => self.to,
            Some(key) => {
                if !self.covers_endpoint(analyzer, key) {
                    return Err(TrieError::KeyOutsideView);
                }
                to
            }
        };
        check_bounds(analyzer, from, to)?;
        Ok(RangeView {
            trie: self.trie,
            from,
            to,
        })
    }

    // Endpoint containment is lenient: a sub-view may reuse this view's own
    // endpoint keys even where they are excluded from the entry set.
    fn covers_endpoint(&self, analyzer: &A, key: &K) -> bool {
        let lower_ok = match bound_key(self.from) {
            None => true,
            Some(f) => analyzer.compare(key, f) != Ordering::Less,
        };
        let upper_ok = match bound_key(self.to) {
            None => true,
            Some(t) => analyzer.compare(key, t) != Ordering::Greater,
        };
        lower_ok && upper_ok
    }
}

impl<'a, K, V, A: KeyAnalyzer<K>> IntoIterator for &RangeView<'a, K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = RangeIter<'a, K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------ RangeIter -----------------------------------------------------

/// Iterator over the entries of a [`RangeView`] in bit order.
pub struct RangeIter<'a, K, V, A> {
    trie: &'a PatriciaTrie<K, V, A>,
    next: Option<NodeId>,
    excluded: Option<NodeId>,
}

impl<'a, K, V, A: KeyAnalyzer<K>> Iterator for RangeIter<'a, K, V, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let following = self.trie.next_entry(Some(id));
        self.next = if following == self.excluded {
            None
        } else {
            following
        };
        self.trie.entry_ref(id)
    }
}

//------------ RangeViewMut --------------------------------------------------

/// A live, mutating view over every entry between two key endpoints.
///
/// Created by [`PatriciaTrie::range_view_mut`]. Inserts of keys outside the
/// bounds fail with [`TrieError::KeyOutsideView`]; reads and removals of
/// such keys report the key as absent.
pub struct RangeViewMut<'a, K, V, A> {
    trie: &'a mut PatriciaTrie<K, V, A>,
    from: Bound<K>,
    to: Bound<K>,
}

impl<K, V, A: KeyAnalyzer<K>> RangeViewMut<'_, K, V, A> {
    /// The current read-only rendition of this view.
    pub fn as_view(&self) -> RangeView<'_, K, V, A> {
        RangeView {
            trie: &*self.trie,
            from: self.from.as_ref(),
            to: self.to.as_ref(),
        }
    }

    pub fn in_range(&self, key: &K) -> bool {
        key_in_bounds(
            self.trie.analyzer(),
            key,
            self.from.as_ref(),
            self.to.as_ref(),
        )
    }

    /// Store `value` for `key`, which must fall inside the bounds.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TrieError> {
        if !self.in_range(&key) {
            return Err(TrieError::KeyOutsideView);
        }
        self.trie.insert(key, value)
    }

    /// Remove the entry for `key`. Keys outside the bounds are simply not
    /// present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        if !self.in_range(key) {
            return None;
        }
        self.trie.remove(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        if !self.in_range(key) {
            return None;
        }
        self.trie.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.in_range(key) && self.trie.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.as_view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_view().is_empty()
    }
}
