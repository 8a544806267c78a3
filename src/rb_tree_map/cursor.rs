use core::fmt;

use crate::compare::Natural;
use crate::error::Error;
use crate::raw::{Handle, RawRBTree};

/// A read-only position in a [`RBTreeMap`](crate::RBTreeMap).
///
/// A cursor either points at an entry or at the *end* position, which sits
/// both one past the last entry and one before the first. Moving next from
/// the end wraps to the first entry; moving back from the end reaches the
/// last entry. The `try_` variants follow the strict bidirectional-iterator
/// contract instead and refuse to cross either boundary.
///
/// Two cursors are equal when they point into the same map at the same
/// position.
///
/// # Examples
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// let map = RBTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
///
/// let mut cursor = map.lower_bound(&2);
/// assert_eq!(cursor.key_value(), Some((&2, &"b")));
/// cursor.move_next();
/// assert_eq!(cursor.key(), Some(&3));
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert_eq!(cursor, map.cursor_end());
///
/// // Stepping back from the end reaches the largest key.
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&3));
/// ```
pub struct Cursor<'a, K, V, C = Natural> {
    tree: &'a RawRBTree<K, V, C>,
    position: Option<Handle>,
}

impl<'a, K, V, C> Cursor<'a, K, V, C> {
    pub(crate) const fn new(tree: &'a RawRBTree<K, V, C>, position: Option<Handle>) -> Self {
        Self { tree, position }
    }

    /// Returns `true` if the cursor is at the end position.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Returns the entry under the cursor, or `None` at the end position.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.position.map(|handle| tree.key_value(handle))
    }

    /// Returns the entry under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] at the end position.
    pub fn try_key_value(&self) -> Result<(&'a K, &'a V), Error> {
        self.key_value().ok_or(Error::InvalidCursor)
    }

    /// Returns the key under the cursor, or `None` at the end position.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` at the end position.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Moves to the next entry in key order.
    ///
    /// From the last entry this reaches the end position; from the end
    /// position it wraps to the first entry.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    pub fn move_next(&mut self) {
        self.position = self.tree.next_position(self.position);
    }

    /// Moves to the previous entry in key order.
    ///
    /// From the first entry this reaches the end position; from the end
    /// position it moves to the last entry.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    pub fn move_prev(&mut self) {
        self.position = self.tree.prev_position(self.position);
    }

    /// Moves to the next entry, refusing to advance from the end position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`], leaving the cursor in place, if the
    /// cursor is at the end position.
    pub fn try_move_next(&mut self) -> Result<(), Error> {
        let handle = self.position.ok_or(Error::InvalidCursor)?;
        self.position = self.tree.successor(handle);
        Ok(())
    }

    /// Moves to the previous entry, refusing to retreat from the first entry.
    ///
    /// From the end position this moves to the last entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`], leaving the cursor in place, if the
    /// cursor is at the first entry or the map is empty.
    pub fn try_move_prev(&mut self) -> Result<(), Error> {
        let previous = self.tree.prev_position(self.position);
        if previous.is_none() {
            return Err(Error::InvalidCursor);
        }
        self.position = previous;
        Ok(())
    }

    /// Returns the entry [`move_next`](Self::move_next) would reach, without
    /// moving.
    #[must_use]
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        tree.next_position(self.position).map(|handle| tree.key_value(handle))
    }

    /// Returns the entry [`move_prev`](Self::move_prev) would reach, without
    /// moving.
    #[must_use]
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        tree.prev_position(self.position).map(|handle| tree.key_value(handle))
    }
}

impl<K, V, C> Clone for Cursor<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for Cursor<'_, K, V, C> {}

impl<K, V, C> PartialEq for Cursor<'_, K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.position == other.position
    }
}

impl<K, V, C> Eq for Cursor<'_, K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Cursor<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

/// A position in a [`RBTreeMap`](crate::RBTreeMap) with mutable access to
/// values and the ability to remove the entry under it.
///
/// Navigation is the same as [`Cursor`]'s.
///
/// # Examples
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// let mut map = RBTreeMap::from([(1, 10), (2, 20), (3, 30)]);
///
/// let mut cursor = map.find_mut(&2);
/// *cursor.value_mut().unwrap() += 1;
///
/// // Removing moves the cursor on to the following entry.
/// assert_eq!(cursor.remove_current(), Some((2, 21)));
/// assert_eq!(cursor.key(), Some(&3));
///
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3]);
/// ```
pub struct CursorMut<'a, K, V, C = Natural> {
    tree: &'a mut RawRBTree<K, V, C>,
    position: Option<Handle>,
}

impl<'a, K, V, C> CursorMut<'a, K, V, C> {
    pub(crate) fn new(tree: &'a mut RawRBTree<K, V, C>, position: Option<Handle>) -> Self {
        Self { tree, position }
    }

    /// Returns `true` if the cursor is at the end position.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Returns the entry under the cursor, or `None` at the end position.
    #[must_use]
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.position.map(|handle| self.tree.key_value(handle))
    }

    /// Returns the key and a mutable reference to the value under the cursor,
    /// or `None` at the end position.
    #[must_use]
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        let handle = self.position?;
        Some(self.tree.key_value_mut(handle))
    }

    /// Returns the entry under the cursor with a mutable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] at the end position.
    pub fn try_key_value_mut(&mut self) -> Result<(&K, &mut V), Error> {
        self.key_value_mut().ok_or(Error::InvalidCursor)
    }

    /// Returns the key under the cursor, or `None` at the end position.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` at the end position.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value under the cursor, or `None` at
    /// the end position.
    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.key_value_mut().map(|(_, value)| value)
    }

    /// Moves to the next entry; see [`Cursor::move_next`].
    pub fn move_next(&mut self) {
        self.position = self.tree.next_position(self.position);
    }

    /// Moves to the previous entry; see [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.position = self.tree.prev_position(self.position);
    }

    /// Moves to the next entry; see [`Cursor::try_move_next`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] if the cursor is at the end position.
    pub fn try_move_next(&mut self) -> Result<(), Error> {
        let mut cursor = self.as_cursor();
        cursor.try_move_next()?;
        let position = cursor.position;
        self.position = position;
        Ok(())
    }

    /// Moves to the previous entry; see [`Cursor::try_move_prev`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] if the cursor is at the first entry or
    /// the map is empty.
    pub fn try_move_prev(&mut self) -> Result<(), Error> {
        let mut cursor = self.as_cursor();
        cursor.try_move_prev()?;
        let position = cursor.position;
        self.position = position;
        Ok(())
    }

    /// Removes the entry under the cursor and returns it, moving the cursor to
    /// the following entry (or the end position). Returns `None`, without
    /// moving, at the end position.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let handle = self.position?;
        let (entry, next) = self.tree.remove_at(handle);
        self.position = next;
        Some(entry)
    }

    /// Returns a read-only cursor at the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(self.tree, self.position)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CursorMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.key_value()).finish()
    }
}
