use super::{Cursor, RBTreeMap};
use crate::compare::{Compare, Natural};
use crate::error::Error;
use crate::raw::RawRBTree;

impl<K, V> RBTreeMap<K, V> {
    /// Creates an empty map, ordered by `K: Ord`, with room for at least
    /// `capacity` entries before it reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, i32> = RBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RBTreeMap::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V, C> RBTreeMap<K, V, C> {
    /// Creates an empty map ordered by `comparator`, with room for at least
    /// `capacity` entries before it reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::{RBTreeMap, Reversed};
    ///
    /// let mut map = RBTreeMap::with_capacity_and_comparator(8, Reversed);
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.first_key_value(), Some((&2, &"b")));
    /// ```
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        RBTreeMap {
            raw: RawRBTree::with_capacity(capacity, comparator),
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the largest number of entries the map can ever hold.
    ///
    /// Nodes are addressed by 32-bit handles, so this is the size of the
    /// handle space rather than a memory limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let map: RBTreeMap<u8, u8> = RBTreeMap::new();
    /// assert_eq!(map.max_size(), u32::MAX as usize);
    /// ```
    #[must_use]
    pub const fn max_size(&self) -> usize {
        RawRBTree::<K, V, C>::max_size()
    }

    /// Inserts a key-value pair, reporting allocation failure instead of
    /// aborting.
    ///
    /// Behaves like [`insert`](Self::insert): an equal key already in the map
    /// wins, and `value` is dropped. Node storage is reserved before the tree
    /// is touched, so on error the map is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if node storage cannot be allocated, or
    /// [`Error::CapacityExceeded`] if the map already holds
    /// [`max_size`](Self::max_size) entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_tree_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// let (cursor, inserted) = map.try_insert(37, "a")?;
    /// assert!(inserted);
    /// assert_eq!(cursor.key(), Some(&37));
    ///
    /// assert!(!map.try_insert(37, "b")?.1);
    /// assert_eq!(map[&37], "a");
    /// # Ok::<(), rb_tree_map::Error>(())
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(Cursor<'_, K, V, C>, bool), Error>
    where
        C: Compare<K>,
    {
        let (handle, inserted) = self.raw.try_insert(key, value)?;
        Ok((Cursor::new(&self.raw, Some(handle)), inserted))
    }
}
