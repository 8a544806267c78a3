use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::Index;

use crate::compare::{Compare, Natural};
use crate::error::InvariantViolation;
use crate::raw::{Handle, RawRBTree, Slot};

mod capacity;
mod cursor;
mod dump;

pub use cursor::{Cursor, CursorMut};
pub use dump::Dump;

/// An ordered map based on a [red-black tree].
///
/// Entries are kept sorted by key under a comparator chosen at construction:
/// the key's own [`Ord`] by default ([`Natural`]), or any [`Compare`]
/// strategy such as [`Reversed`](crate::Reversed) or a closure. Each key is
/// stored at most once; inserting a key that is already present leaves the
/// stored entry untouched.
///
/// Lookups return [`Cursor`]s: positions in the map that can be dereferenced
/// and moved in either direction. A cursor is either at an entry or at the
/// *end* position, which is what a failed lookup returns.
///
/// Iterators obtained from functions such as [`RBTreeMap::iter`],
/// [`RBTreeMap::keys`] or [`RBTreeMap::into_iter`] produce their items in key
/// order and take worst-case logarithmic and amortized constant time per item.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the map, or for
/// the comparator to not be a strict weak order. The behavior resulting from
/// such a logic error is not specified, but will be encapsulated to the
/// `RBTreeMap` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// let mut movie_reviews = RBTreeMap::new();
///
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
///
/// // A second insert of the same key is ignored.
/// let (cursor, inserted) = movie_reviews.insert("Pulp Fiction", "Overrated.");
/// assert!(!inserted);
/// assert_eq!(cursor.value(), Some(&"Masterpiece."));
///
/// assert_eq!(movie_reviews.erase(&"The Godfather"), 1);
/// assert_eq!(movie_reviews.erase(&"The Blues Brothers"), 0);
///
/// // Lookups hand back cursors.
/// let cursor = movie_reviews.find(&"Office Space");
/// assert_eq!(cursor.value(), Some(&"Deals with real issues in the workplace."));
/// assert!(movie_reviews.find(&"Les Misérables").is_end());
///
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A map with a custom ordering:
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// let mut by_length = RBTreeMap::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// by_length.insert("three", 3);
/// by_length.insert("one", 1);
/// by_length.insert("two", 2); // same length as "one"
///
/// assert_eq!(by_length.len(), 2);
/// assert_eq!(by_length.keys().copied().collect::<Vec<_>>(), ["one", "three"]);
/// ```
///
/// # Implementation
///
/// Nodes live in an arena and link to each other by index, with a parent link
/// for stepping between neighbours. The tree keeps the classic red-black
/// invariants, so its height never exceeds `2 * log2(n + 1)`. Removing an
/// entry relinks its neighbour node rather than moving entries between nodes,
/// so the position of every other entry is unaffected.
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct RBTreeMap<K, V, C = Natural> {
    raw: RawRBTree<K, V, C>,
}

/// An iterator over the entries of a `RBTreeMap`.
///
/// This `struct` is created by the [`iter`] method on [`RBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// let map = RBTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: RBTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C = Natural> {
    tree: Option<&'a RawRBTree<K, V, C>>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// A mutable iterator over the entries of a `RBTreeMap`.
///
/// This `struct` is created by the [`iter_mut`] method on [`RBTreeMap`]. See
/// its documentation for more.
///
/// [`iter_mut`]: RBTreeMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K, V, C = Natural> {
    tree: Option<&'a RawRBTree<K, V, C>>,
    slots: *mut Slot<V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    _marker: PhantomData<&'a mut V>,
}

// SAFETY: IterMut behaves as (&RawRBTree<K, _, C>, &mut [V]), so it is Send when
// keys and the comparator can be shared and values can be sent.
unsafe impl<K: Sync, V: Send, C: Sync> Send for IterMut<'_, K, V, C> {}

/// An owning iterator over the entries of a `RBTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`RBTreeMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `RBTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`RBTreeMap`]. See its
/// documentation for more.
///
/// [`keys`]: RBTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, C = Natural> {
    inner: Iter<'a, K, V, C>,
}

/// An iterator over the values of a `RBTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`RBTreeMap`]. See its
/// documentation for more.
///
/// [`values`]: RBTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, C = Natural> {
    inner: Iter<'a, K, V, C>,
}

/// A mutable iterator over the values of a `RBTreeMap`.
///
/// This `struct` is created by the [`values_mut`] method on [`RBTreeMap`]. See
/// its documentation for more.
///
/// [`values_mut`]: RBTreeMap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V, C = Natural> {
    inner: IterMut<'a, K, V, C>,
}

impl<K, V> RBTreeMap<K, V> {
    /// Makes a new, empty `RBTreeMap` ordered by `K: Ord`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> RBTreeMap<K, V> {
        RBTreeMap::with_comparator(Natural)
    }
}

impl<K, V, C> RBTreeMap<K, V, C> {
    /// Makes a new, empty `RBTreeMap` ordered by `comparator`.
    ///
    /// The comparator is stored in the map and consulted on every lookup; it
    /// must be a strict weak order over the keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::{RBTreeMap, Reversed};
    ///
    /// let mut map = RBTreeMap::with_comparator(Reversed);
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        RBTreeMap {
            raw: RawRBTree::new(comparator),
        }
    }

    /// Returns the comparator that orders the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::cmp::Ordering;
    /// use rb_tree_map::{Compare, RBTreeMap, Reversed};
    ///
    /// let map: RBTreeMap<i32, (), _> = RBTreeMap::with_comparator(Reversed);
    /// assert_eq!(map.comparator().compare(&1, &2), Ordering::Greater);
    /// ```
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Clears the map, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// assert!(a.cursor_first().is_end());
    /// ```
    pub fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(len = self.raw.len(), "clear");

        self.raw.clear();
    }

    /// Swaps the contents, including the comparators, of two maps.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::from([(1, "a")]);
    /// let mut b = RBTreeMap::from([(2, "b"), (3, "c")]);
    /// a.swap(&mut b);
    /// assert_eq!(a.len(), 2);
    /// assert_eq!(b.get(&1), Some(&"a"));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(len = self.raw.len(), other_len = other.raw.len(), "swap");

        core::mem::swap(&mut self.raw, &mut other.raw);
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of nodes on the longest path from the root to a
    /// leaf; 0 for an empty map.
    ///
    /// The red-black invariants bound this by `2 * log2(len + 1)`.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map: RBTreeMap<u32, ()> = (0..1000).map(|k| (k, ())).collect();
    /// assert!(map.height() <= 2 * 10);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns a [`Display`](fmt::Display)able dump of the tree structure,
    /// for debugging. See [`Dump`] for the format.
    pub fn dump(&self) -> Dump<'_, K, V, C> {
        Dump::new(&self.raw)
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.key_value(handle))
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.key_value(handle))
    }

    /// Removes and returns the first element in the map.
    /// The key of this element is the minimum key that was in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last element in the map.
    /// The key of this element is the maximum key that was in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all pairs `(k, v)` for which `f(&k, &mut v)`
    /// returns `false`. The elements are visited in ascending key order.
    ///
    /// # Complexity
    ///
    /// O(n log n) in the worst case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map: RBTreeMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// // Keep only the elements with even-numbered keys.
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.raw.retain(f);
    }

    /// Returns a cursor at the first entry, or at the end position if the map
    /// is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(2, 'b'), (1, 'a')]);
    /// assert_eq!(map.cursor_first().key(), Some(&1));
    /// ```
    pub fn cursor_first(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.raw, self.raw.first())
    }

    /// Returns a cursor at the last entry, or at the end position if the map
    /// is empty.
    ///
    /// Iterating backwards from here with [`Cursor::move_prev`] visits the
    /// entries in descending order and ends at the end position.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn cursor_last(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.raw, self.raw.last())
    }

    /// Returns a cursor at the end position.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(1, 'a'), (2, 'b')]);
    /// let mut cursor = map.cursor_end();
    /// assert!(cursor.is_end());
    /// cursor.move_prev();
    /// assert_eq!(cursor.key(), Some(&2));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.raw, None)
    }

    /// Returns a mutable cursor at the first entry, or at the end position if
    /// the map is empty.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, K, V, C> {
        let first = self.raw.first();
        CursorMut::new(&mut self.raw, first)
    }

    /// Returns a mutable cursor at the last entry, or at the end position if
    /// the map is empty.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, K, V, C> {
        let last = self.raw.last();
        CursorMut::new(&mut self.raw, last)
    }

    /// Returns a mutable cursor at the end position.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(&mut self.raw, None)
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    ///
    /// // Reverse traversal starts at the largest key.
    /// assert_eq!(map.iter().rev().next(), Some((&3, &"c")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; each step is O(log n) worst case and O(1)
    /// amortized.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: Some(&self.raw),
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    ///
    /// // add 10 to the value if the key isn't "a"
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [1, 12, 13]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, C> {
        let (tree, slots) = self.raw.split_value_slots();
        IterMut {
            tree: Some(tree),
            slots,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.values().cloned().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(1, String::from("hello"));
    /// a.insert(2, String::from("goodbye"));
    ///
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    ///
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"), String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, C> {
        ValuesMut { inner: self.iter_mut() }
    }
}

impl<K, V, C> RBTreeMap<K, V, C> {
    /// Inserts a key-value pair unless an equal key is already present.
    ///
    /// Returns a cursor at the entry holding the key, and whether the pair was
    /// inserted. If the key was present, the stored key and value are left as
    /// they were and `value` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the map already holds [`max_size`](Self::max_size) entries.
    /// Use [`try_insert`](Self::try_insert) to handle that case.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// let (cursor, inserted) = map.insert(37, "a");
    /// assert!(inserted);
    /// assert_eq!(cursor.value(), Some(&"a"));
    ///
    /// let (cursor, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(cursor.value(), Some(&"a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V, C>, bool)
    where
        C: Compare<K>,
    {
        let (handle, inserted) = self.raw.insert(key, value);
        (Cursor::new(&self.raw, Some(handle)), inserted)
    }

    /// Checks every structural invariant of the underlying red-black tree.
    ///
    /// This walks the whole tree and is meant for tests and debugging; a map
    /// driven only through its public API always passes.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map: RBTreeMap<i32, ()> = (0..100).map(|k| (k, ())).collect();
    /// map.retain(|k, _| k % 7 != 0);
    /// assert_eq!(map.check_invariants(), Ok(()));
    /// ```
    pub fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        C: Compare<K>,
    {
        self.raw.check_invariants()
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// comparator must order the borrowed form the same way as the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.raw.get(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(String::from("a"), 1)]);
    /// assert_eq!(map.get_key_value("a"), Some((&String::from("a"), &1)));
    /// assert_eq!(map.get_key_value("b"), None);
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.raw.find(key).map(|handle| self.raw.key_value(handle))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.raw.find(key).is_some()
    }

    /// Returns the number of entries with the given key: 0 or 1.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        usize::from(self.contains_key(key))
    }

    /// Returns a cursor at the entry with the given key, or at the end
    /// position if there is none.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(1, 'a'), (3, 'c')]);
    /// assert_eq!(map.find(&3).value(), Some(&'c'));
    /// assert_eq!(map.find(&2), map.cursor_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        Cursor::new(&self.raw, self.raw.find(key))
    }

    /// Returns a mutable cursor at the entry with the given key, or at the end
    /// position if there is none.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let position = self.raw.find(key);
        CursorMut::new(&mut self.raw, position)
    }

    /// Returns a cursor at the first entry whose key is not less than `key`,
    /// or at the end position if every key is less.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.lower_bound(&20).key(), Some(&20));
    /// assert_eq!(map.lower_bound(&21).key(), Some(&30));
    /// assert!(map.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(key))
    }

    /// Returns a cursor at the first entry whose key is greater than `key`,
    /// or at the end position if there is none.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.upper_bound(&20).key(), Some(&30));
    /// assert_eq!(map.upper_bound(&5).key(), Some(&10));
    /// assert!(map.upper_bound(&30).is_end());
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(key))
    }

    /// Mutable counterpart of [`lower_bound`](Self::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let position = self.raw.lower_bound(key);
        CursorMut::new(&mut self.raw, position)
    }

    /// Mutable counterpart of [`upper_bound`](Self::upper_bound).
    pub fn upper_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let position = self.raw.upper_bound(key);
        CursorMut::new(&mut self.raw, position)
    }

    /// Returns the pair `(lower_bound(key), upper_bound(key))`: the cursors
    /// delimiting the entries equal to `key`. Both are equal when the key is
    /// absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    ///
    /// let (mut first, last) = map.equal_range(&2);
    /// assert_eq!(first.key(), Some(&2));
    /// first.move_next();
    /// assert_eq!(first, last);
    ///
    /// let (first, last) = map.equal_range(&5);
    /// assert!(first.is_end() && last.is_end());
    /// ```
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V, C>, Cursor<'_, K, V, C>)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Removes the entry with the given key, returning the number of entries
    /// removed: 0 or 1.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::from([(1, "a")]);
    /// assert_eq!(map.erase(&1), 1);
    /// assert_eq!(map.erase(&1), 0);
    /// ```
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        usize::from(self.raw.remove_entry(key).is_some())
    }

    /// Removes every entry whose key lies in `lower..upper` and returns how
    /// many were removed. Nothing is removed unless `lower` orders before
    /// `upper`.
    ///
    /// # Complexity
    ///
    /// O(log n + m), where m is the number of entries removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map: RBTreeMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
    /// assert_eq!(map.erase_range(&3, &7), 4);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 1, 2, 7, 8, 9]);
    /// assert_eq!(map.erase_range(&8, &8), 0);
    /// ```
    pub fn erase_range<Q>(&mut self, lower: &Q, upper: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        if self.raw.comparator().compare(lower, upper) != Ordering::Less {
            return 0;
        }
        let start = self.raw.lower_bound(lower);
        let stop = self.raw.lower_bound(upper);
        self.raw.remove_range(start, stop)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.raw.remove_entry(key)
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RBTreeMap<K, V, C> {
    fn clone(&self) -> Self {
        RBTreeMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash, C> Hash for RBTreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RBTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, C> Eq for RBTreeMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for RBTreeMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for RBTreeMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RBTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for RBTreeMap<K, V, C> {
    fn default() -> Self {
        RBTreeMap::with_comparator(C::default())
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for RBTreeMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = RBTreeMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for RBTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>> Extend<(&'a K, &'a V)> for RBTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a RBTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut RBTreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, C>;

    fn into_iter(self) -> IterMut<'a, K, V, C> {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for RBTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V, C> Index<&Q> for RBTreeMap<K, V, C>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Compare<Q>,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `RBTreeMap`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RBTreeMap<K, V> {
    /// Converts a `[(K, V); N]` into a `RBTreeMap<K, V>`. Of pairs with equal
    /// keys, the first one is kept.
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map1 = RBTreeMap::from([(1, 2), (3, 4), (1, 9)]);
    /// assert_eq!(map1[&1], 2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let handle = self.front?;

        self.front = tree.successor(handle);
        self.remaining -= 1;
        Some(tree.key_value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let handle = self.back?;

        self.back = tree.predecessor(handle);
        self.remaining -= 1;
        Some(tree.key_value(handle))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Iter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V, C> Default for Iter<'_, K, V, C> {
    /// Creates an empty `rb_tree_map::Iter`.
    ///
    /// ```
    /// let iter: rb_tree_map::rb_tree_map::Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            tree: None,
            front: None,
            back: None,
            remaining: 0,
        }
    }
}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, C> Iterator for IterMut<'a, K, V, C> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let handle = self.front?;

        self.front = tree.successor(handle);
        self.remaining -= 1;
        // SAFETY: `slots` was split off `tree` by `iter_mut`, which holds the map
        // exclusively for 'a. `remaining` stops the two ends before they cross,
        // so no handle is yielded twice.
        let value = unsafe { tree.value_mut_raw(self.slots, handle) };
        Some((tree.key(handle), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, C> DoubleEndedIterator for IterMut<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let handle = self.back?;

        self.back = tree.predecessor(handle);
        self.remaining -= 1;
        // SAFETY: see `next`.
        let value = unsafe { tree.value_mut_raw(self.slots, handle) };
        Some((tree.key(handle), value))
    }
}

impl<K, V, C> ExactSizeIterator for IterMut<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for IterMut<'_, K, V, C> {}

impl<K, V, C> fmt::Debug for IterMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish()
    }
}

impl<K, V, C> Default for IterMut<'_, K, V, C> {
    /// Creates an empty `rb_tree_map::IterMut`.
    ///
    /// ```
    /// let iter: rb_tree_map::rb_tree_map::IterMut<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IterMut {
            tree: None,
            slots: core::ptr::null_mut(),
            front: None,
            back: None,
            remaining: 0,
            _marker: PhantomData,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: alloc::vec::Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

impl<K: fmt::Debug, V, C> fmt::Debug for Keys<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V, C> Default for Keys<'_, K, V, C> {
    fn default() -> Self {
        Keys { inner: Iter::default() }
    }
}

impl<K, V, C> Clone for Keys<'_, K, V, C> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

impl<K, V, C> Clone for Values<'_, K, V, C> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, C> Default for Values<'_, K, V, C> {
    fn default() -> Self {
        Values { inner: Iter::default() }
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for Values<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, C> Iterator for ValuesMut<'a, K, V, C> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, C> DoubleEndedIterator for ValuesMut<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for ValuesMut<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for ValuesMut<'_, K, V, C> {}

impl<K, V, C> fmt::Debug for ValuesMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.remaining).finish()
    }
}

impl<K, V, C> Default for ValuesMut<'_, K, V, C> {
    fn default() -> Self {
        ValuesMut {
            inner: IterMut::default(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Reversed;
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(RBTreeMap<String, Vec<u8>>: Send, Sync);
    assert_impl_all!(Iter<'static, String, u8>: Send, Sync);
    assert_impl_all!(IterMut<'static, String, u8>: Send);

    #[test]
    fn scenario_insert_then_erase() {
        let mut map = RBTreeMap::new();
        for key in [10, 20, 5, 15, 30, 25] {
            assert!(map.insert(key, key.to_string()).1);
        }
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [5, 10, 15, 20, 25, 30]);

        assert_eq!(map.erase(&10), 1);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [5, 15, 20, 25, 30]);
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn bounds_on_empty_map_are_end() {
        let map: RBTreeMap<i32, ()> = RBTreeMap::new();
        assert!(map.lower_bound(&0).is_end());
        assert!(map.upper_bound(&0).is_end());
        assert!(map.cursor_first().is_end());
        assert!(map.cursor_last().is_end());
        assert_eq!(map.equal_range(&0), (map.cursor_end(), map.cursor_end()));
        assert_eq!(map.height(), 0);
    }

    #[test]
    fn mutable_bounds_edit_in_place() {
        let mut map: RBTreeMap<i32, i32> = (0..10).map(|k| (k * 10, 0)).collect();
        *map.lower_bound_mut(&35).value_mut().unwrap() = 1;
        *map.upper_bound_mut(&40).value_mut().unwrap() = 2;
        assert!(map.upper_bound_mut(&90).is_end());

        let mut cursor = map.cursor_last_mut();
        assert_eq!(cursor.remove_current(), Some((90, 0)));
        assert!(cursor.is_end());

        assert_eq!(map.get(&40), Some(&1));
        assert_eq!(map.get(&50), Some(&2));
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn borrowed_lookups() {
        let mut map = RBTreeMap::new();
        map.insert(String::from("b"), 2);
        map.insert(String::from("a"), 1);

        assert_eq!(map["a"], 1);
        assert_eq!(map.count("b"), 1);
        assert_eq!(map.count("c"), 0);
        assert_eq!(map.find("b").value(), Some(&2));
        assert_eq!(map.remove_entry("a"), Some((String::from("a"), 1)));
        assert!(!map.contains_key("a"));
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing_key() {
        let map = RBTreeMap::from([(1, 1)]);
        let _ = map[&2];
    }

    #[test]
    fn reversed_comparator_flips_everything() {
        let map: RBTreeMap<i32, (), Reversed> = (0..5).map(|k| (k, ())).collect();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [4, 3, 2, 1, 0]);
        assert_eq!(map.first_key_value(), Some((&4, &())));
        assert_eq!(map.lower_bound(&2).key(), Some(&2));
        assert_eq!(map.upper_bound(&2).key(), Some(&1));
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn swap_exchanges_contents_and_comparators() {
        let mut a = RBTreeMap::with_comparator(Reversed);
        a.insert(1, 'a');
        a.insert(2, 'b');
        let mut b = RBTreeMap::with_comparator(Reversed);
        b.insert(3, 'c');

        a.swap(&mut b);
        assert_eq!(a.iter().collect::<Vec<_>>(), [(&3, &'c')]);
        assert_eq!(b.iter().collect::<Vec<_>>(), [(&2, &'b'), (&1, &'a')]);
    }

    #[test]
    fn clone_is_independent() {
        let mut original = RBTreeMap::from([(1, 1), (2, 2), (3, 3)]);
        let copy = original.clone();
        original.remove(&2);
        *original.get_mut(&1).unwrap() = 10;

        assert_eq!(copy, RBTreeMap::from([(1, 1), (2, 2), (3, 3)]));
        assert_ne!(copy, original);
        assert_eq!(copy.check_invariants(), Ok(()));
    }

    #[test]
    fn comparisons_and_debug() {
        let a = RBTreeMap::from([(1, 'a'), (2, 'b')]);
        let b = RBTreeMap::from([(1, 'a'), (3, 'b')]);
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
        assert_eq!(format!("{a:?}"), "{1: 'a', 2: 'b'}");
        assert_eq!(format!("{:?}", a.keys()), "[1, 2]");
        assert_eq!(format!("{:?}", a.values()), "['a', 'b']");
    }

    #[test]
    fn extend_from_references() {
        let source = RBTreeMap::from([(1, 10), (2, 20)]);
        let mut target = RBTreeMap::from([(2, 0), (3, 30)]);
        target.extend(&source);
        assert_eq!(target.into_iter().collect::<Vec<_>>(), [(1, 10), (2, 0), (3, 30)]);
    }

    #[test]
    fn iterators_meet_in_the_middle() {
        let mut map: RBTreeMap<i32, i32> = (0..6).map(|k| (k, k)).collect();

        let mut iter = map.iter();
        assert_eq!(iter.len(), 6);
        assert_eq!(iter.next(), Some((&0, &0)));
        assert_eq!(iter.next_back(), Some((&5, &5)));
        assert_eq!(iter.by_ref().rev().map(|(k, _)| *k).collect::<Vec<_>>(), [4, 3, 2, 1]);
        assert_eq!(iter.next(), None);

        let mut values = map.values_mut();
        *values.next().unwrap() = -1;
        *values.next_back().unwrap() = -2;
        for value in values {
            *value *= 100;
        }
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [-1, 100, 200, 300, 400, -2]);

        let mut into_iter = map.into_iter();
        assert_eq!(into_iter.next_back(), Some((5, -2)));
        assert_eq!(into_iter.len(), 5);
    }

    #[test]
    fn default_iterators_are_empty() {
        assert_eq!(Iter::<u8, u8>::default().next(), None);
        assert_eq!(IterMut::<u8, u8>::default().next_back(), None);
        assert_eq!(Keys::<u8, u8>::default().len(), 0);
        assert_eq!(Values::<u8, u8>::default().len(), 0);
        assert_eq!(ValuesMut::<u8, u8>::default().len(), 0);
        assert_eq!(IntoIter::<u8, u8>::default().len(), 0);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(u8, u16),
        Remove(u8),
        PopFirst,
        PopLast,
        Retain(u8),
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            10 => (any::<u8>(), any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
            6 => any::<u8>().prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
            1 => (2u8..8).prop_map(Op::Retain),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn map_matches_btreemap(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut map = RBTreeMap::new();
            let mut model = alloc::collections::BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        let inserted = map.insert(k, v).1;
                        prop_assert_eq!(inserted, !model.contains_key(&k));
                        model.entry(k).or_insert(v);
                    }
                    Op::Remove(k) => {
                        prop_assert_eq!(map.remove(&k), model.remove(&k));
                    }
                    Op::PopFirst => {
                        prop_assert_eq!(map.pop_first(), model.pop_first());
                    }
                    Op::PopLast => {
                        prop_assert_eq!(map.pop_last(), model.pop_last());
                    }
                    Op::Retain(m) => {
                        map.retain(|k, _| k % m != 0);
                        model.retain(|k, _| k % m != 0);
                    }
                    Op::Clear => {
                        map.clear();
                        model.clear();
                    }
                }
                prop_assert_eq!(map.check_invariants(), Ok(()));
                prop_assert_eq!(map.len(), model.len());
            }

            prop_assert!(map.iter().eq(model.iter()));
            prop_assert!(map.iter().rev().eq(model.iter().rev()));
        }
    }
}
