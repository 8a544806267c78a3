use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::{Arena, Slot};
use super::handle::Handle;
use super::node::{Color, Node, Side};
use crate::compare::Compare;
use crate::error::Error;

/// Where a missing key would be linked: `None` for an empty tree, otherwise
/// the parent and the side of its free child link.
pub(crate) type InsertPoint = Option<(Handle, Side)>;

/// The red-black tree engine backing `RBTreeMap`.
///
/// A `None` position is the terminal: "one past the end" going forward and
/// "one before the beginning" going backward. The leftmost and rightmost
/// handles are cached so both ends are reachable in O(1).
pub(crate) struct RawRBTree<K, V, C> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values, addressed by `Node::value`.
    values: Arena<V>,
    root: Option<Handle>,
    /// Leftmost node, the first entry in order.
    first: Option<Handle>,
    /// Rightmost node, reached by stepping back from the terminal.
    last: Option<Handle>,
    /// Number of entries, kept in step with every link/unlink.
    len: usize,
    comparator: C,
}

impl<K, V, C> RawRBTree<K, V, C> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(comparator: C) -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
            comparator,
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize, comparator: C) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            first: None,
            last: None,
            len: 0,
            comparator,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity().min(self.values.capacity())
    }

    /// The largest number of entries the handle space can address.
    pub(crate) const fn max_size() -> usize {
        Handle::MAX + 1
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Number of node slots currently allocated in the arena.
    pub(crate) const fn allocated(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) const fn first(&self) -> Option<Handle> {
        self.first
    }

    pub(crate) const fn last(&self) -> Option<Handle> {
        self.last
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    /// Returns the key and a mutable reference to the value of an entry.
    #[inline]
    pub(crate) fn key_value_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get_mut(node.value()))
    }

    /// Hands out the tree for navigation together with a raw pointer to the
    /// value slots, so distinct values can be borrowed mutably while walking.
    ///
    /// Navigation only reads the node arena; the returned tree must not be
    /// used to reach values while references from the pointer are alive.
    pub(crate) fn split_value_slots(&mut self) -> (&Self, *mut Slot<V>) {
        let slots = self.values.slots_ptr();
        (self, slots)
    }

    /// Returns a mutable reference to the value of the entry at `handle`.
    ///
    /// # Safety
    /// - `slots` must come from [`split_value_slots`](Self::split_value_slots)
    ///   on this tree, with no structural mutation since.
    /// - `handle` must be live and its value not otherwise borrowed for `'a`.
    #[inline]
    pub(crate) unsafe fn value_mut_raw<'a>(&self, slots: *mut Slot<V>, handle: Handle) -> &'a mut V {
        let value = self.nodes.get(handle).value();
        // SAFETY: forwarded from the caller; value handles are unique per node.
        unsafe { Arena::get_mut_raw(slots, value) }
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    /// Number of nodes on the longest root-to-leaf path; 0 for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: SmallVec<[(Handle, usize); 64]> = SmallVec::new();
        stack.extend(self.root.map(|root| (root, 1)));

        while let Some((handle, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.nodes.get(handle);
            stack.extend(node.left().map(|child| (child, depth + 1)));
            stack.extend(node.right().map(|child| (child, depth + 1)));
        }
        height
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    pub(crate) fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    pub(crate) fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right() {
            handle = right;
        }
        handle
    }

    /// In-order successor, or `None` (the terminal) after the last entry.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Right)
    }

    /// In-order predecessor, or `None` (the terminal) before the first entry.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Left)
    }

    /// One in-order step towards `side`: the nearest node of the subtree on
    /// that side, else the first ancestor reached from the opposite side.
    fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.nodes.get(handle).child(side) {
            return Some(match side {
                Side::Right => self.leftmost(child),
                Side::Left => self.rightmost(child),
            });
        }

        let mut current = handle;
        let mut parent = self.nodes.get(current).parent();
        while let Some(p) = parent {
            let node = self.nodes.get(p);
            if node.child(side.opposite()) == Some(current) {
                return Some(p);
            }
            current = p;
            parent = node.parent();
        }
        None
    }

    /// Position after `position`; the terminal wraps to the first entry.
    pub(crate) fn next_position(&self, position: Option<Handle>) -> Option<Handle> {
        match position {
            Some(handle) => self.successor(handle),
            None => self.first,
        }
    }

    /// Position before `position`; the terminal steps back to the last entry.
    pub(crate) fn prev_position(&self, position: Option<Handle>) -> Option<Handle> {
        match position {
            Some(handle) => self.predecessor(handle),
            None => self.last,
        }
    }

    // ─── Structural primitives ──────────────────────────────────────────────

    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.nodes.get(h).is_red())
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.nodes.get_mut(handle).set_color(color);
    }

    /// Points the link that referenced `old` (in `parent`, or the root) at
    /// `new`. Does not touch `new`'s parent link.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.nodes.get_mut(parent);
                let side = node.side_of(old).expect("`RawRBTree::replace_child()` - `old` is not a child of `parent`!");
                node.set_child(side, new);
            }
        }
    }

    /// Rotates around `pivot` so that it moves down towards `side`; the child
    /// on the opposite side takes its place.
    fn rotate(&mut self, pivot: Handle, side: Side) {
        #[cfg(feature = "tracing")]
        tracing::trace!(?pivot, ?side, "rotate");

        let rising_side = side.opposite();
        let rising = self
            .nodes
            .get(pivot)
            .child(rising_side)
            .expect("`RawRBTree::rotate()` - no child on the rising side!");
        let inner = self.nodes.get(rising).child(side);

        self.nodes.get_mut(pivot).set_child(rising_side, inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(pivot));
        }

        let parent = self.nodes.get(pivot).parent();
        self.replace_child(parent, pivot, Some(rising));
        let node = self.nodes.get_mut(rising);
        node.set_parent(parent);
        node.set_child(side, Some(pivot));
        self.nodes.get_mut(pivot).set_parent(Some(rising));
    }

    /// Replaces the subtree rooted at `old` with the one rooted at `new`.
    fn transplant(&mut self, old: Handle, new: Option<Handle>) {
        let parent = self.nodes.get(old).parent();
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.nodes.get_mut(new).set_parent(parent);
        }
    }

    // ─── Insertion ──────────────────────────────────────────────────────────

    /// Links a new red node at `point` and rebalances. Returns its handle.
    fn link(&mut self, point: InsertPoint, key: K, value: V) -> Handle {
        let value = self.values.alloc(value);
        let handle = self.nodes.alloc(Node::new(key, value));

        match point {
            None => {
                self.root = Some(handle);
                self.first = Some(handle);
                self.last = Some(handle);
            }
            Some((parent, side)) => {
                self.nodes.get_mut(handle).set_parent(Some(parent));
                self.nodes.get_mut(parent).set_child(side, Some(handle));
                match side {
                    Side::Left if self.first == Some(parent) => self.first = Some(handle),
                    Side::Right if self.last == Some(parent) => self.last = Some(handle),
                    _ => {}
                }
            }
        }

        self.len += 1;
        self.insert_fixup(handle);
        handle
    }

    /// Restores the red-black invariants after linking the red node `node`.
    fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(parent) = self.nodes.get(node).parent() {
            if !self.nodes.get(parent).is_red() {
                break;
            }

            let grandparent = self
                .nodes
                .get(parent)
                .parent()
                .expect("`RawRBTree::insert_fixup()` - red node without a parent!");
            let parent_side = self
                .nodes
                .get(grandparent)
                .side_of(parent)
                .expect("`RawRBTree::insert_fixup()` - broken parent link!");
            let uncle = self.nodes.get(grandparent).child(parent_side.opposite());

            let red_uncle = uncle.filter(|&u| self.nodes.get(u).is_red());
            if let Some(uncle) = red_uncle {
                #[cfg(feature = "tracing")]
                tracing::trace!(?node, ?grandparent, "insert fixup: red uncle, recolor");

                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(?node, ?grandparent, "insert fixup: black uncle, rotate");

            let mut top = parent;
            if self.nodes.get(parent).side_of(node) == Some(parent_side.opposite()) {
                self.rotate(parent, parent_side);
                top = node;
            }
            self.set_color(top, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, parent_side.opposite());
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    fn reserve_one(&mut self) -> Result<(), Error> {
        self.nodes.try_reserve_one()?;
        self.values.try_reserve_one()
    }

    // ─── Removal ────────────────────────────────────────────────────────────

    /// Unlinks and frees the node at `handle`, returning its entry and the
    /// position that followed it.
    ///
    /// A node with two children is replaced by relinking its successor node
    /// into its place, so every other handle keeps addressing the same entry.
    pub(crate) fn remove_at(&mut self, handle: Handle) -> ((K, V), Option<Handle>) {
        let next = self.successor(handle);
        if self.first == Some(handle) {
            self.first = next;
        }
        if self.last == Some(handle) {
            self.last = self.predecessor(handle);
        }

        let node = self.nodes.get(handle);
        let (left, right, parent, color) = (node.left(), node.right(), node.parent(), node.color());

        let mut removed_color = color;
        let (child, child_parent) = match (left, right) {
            (None, _) => {
                self.transplant(handle, right);
                (right, parent)
            }
            (_, None) => {
                self.transplant(handle, left);
                (left, parent)
            }
            (Some(left), Some(right)) => {
                let heir = self.leftmost(right);
                let heir_node = self.nodes.get(heir);
                removed_color = heir_node.color();
                let heir_right = heir_node.right();

                let child_parent = if heir == right {
                    heir
                } else {
                    let heir_parent = heir_node.parent();
                    self.transplant(heir, heir_right);
                    self.nodes.get_mut(heir).set_child(Side::Right, Some(right));
                    self.nodes.get_mut(right).set_parent(Some(heir));
                    heir_parent.expect("`RawRBTree::remove_at()` - successor without a parent!")
                };

                self.transplant(handle, Some(heir));
                let heir_node = self.nodes.get_mut(heir);
                heir_node.set_child(Side::Left, Some(left));
                heir_node.set_color(color);
                self.nodes.get_mut(left).set_parent(Some(heir));
                (heir_right, Some(child_parent))
            }
        };

        if removed_color == Color::Black {
            self.remove_fixup(child, child_parent);
        }

        self.len -= 1;
        let node = self.nodes.take(handle);
        let value = self.values.take(node.value());
        ((node.into_key(), value), next)
    }

    /// Restores uniform black-height after a black node was spliced out
    /// above `node` (which may be the terminal, hence the explicit parent).
    fn remove_fixup(&mut self, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while node != self.root && !self.is_red(node) {
            let Some(p) = parent else { break };

            let side = if self.nodes.get(p).left() == node {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();
            let sibling_of = |tree: &Self| {
                tree.nodes
                    .get(p)
                    .child(far)
                    .expect("`RawRBTree::remove_fixup()` - black-height deficit without a sibling!")
            };

            let mut sibling = sibling_of(self);
            if self.nodes.get(sibling).is_red() {
                #[cfg(feature = "tracing")]
                tracing::trace!(parent = ?p, "remove fixup: red sibling, rotate");

                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                sibling = sibling_of(self);
            }

            let near_nephew = self.nodes.get(sibling).child(side);
            let far_nephew = self.nodes.get(sibling).child(far);
            if !self.is_red(near_nephew) && !self.is_red(far_nephew) {
                #[cfg(feature = "tracing")]
                tracing::trace!(parent = ?p, "remove fixup: black nephews, move up");

                self.set_color(sibling, Color::Red);
                node = Some(p);
                parent = self.nodes.get(p).parent();
                continue;
            }

            if !self.is_red(far_nephew) {
                #[cfg(feature = "tracing")]
                tracing::trace!(parent = ?p, "remove fixup: red near nephew, rotate sibling");

                if let Some(near) = near_nephew {
                    self.set_color(near, Color::Black);
                }
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, far);
                sibling = sibling_of(self);
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(parent = ?p, "remove fixup: red far nephew, rotate parent");

            let parent_color = self.nodes.get(p).color();
            self.set_color(sibling, parent_color);
            self.set_color(p, Color::Black);
            if let Some(far) = self.nodes.get(sibling).child(far) {
                self.set_color(far, Color::Black);
            }
            self.rotate(p, side);
            node = self.root;
            break;
        }

        if let Some(node) = node {
            self.set_color(node, Color::Black);
        }
    }

    /// Removes the first entry.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let first = self.first?;
        Some(self.remove_at(first).0)
    }

    /// Removes the last entry.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.last?;
        Some(self.remove_at(last).0)
    }

    /// Keeps only the entries for which `keep` returns `true`, in key order.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut current = self.first;
        while let Some(handle) = current {
            let (key, value) = self.key_value_mut(handle);
            current = if keep(key, value) {
                self.successor(handle)
            } else {
                self.remove_at(handle).1
            };
        }
    }

    /// Removes the entries from `start` up to, but not including, `stop`, and
    /// returns how many were removed. `stop` must not precede `start`.
    pub(crate) fn remove_range(&mut self, start: Option<Handle>, stop: Option<Handle>) -> usize {
        let mut removed = 0;
        let mut current = start;
        while let Some(handle) = current {
            if current == stop {
                break;
            }
            current = self.remove_at(handle).1;
            removed += 1;
        }
        removed
    }

    /// Removes every entry in key order, handing them out as a vector.
    pub(crate) fn drain_to_vec(&mut self) -> alloc::vec::Vec<(K, V)> {
        // Links are still needed to walk the order, so free nodes afterwards.
        let mut order = alloc::vec::Vec::with_capacity(self.len);
        let mut current = self.first;
        while let Some(handle) = current {
            order.push(handle);
            current = self.successor(handle);
        }

        let entries = order
            .into_iter()
            .map(|handle| {
                let node = self.nodes.take(handle);
                let value = self.values.take(node.value());
                (node.into_key(), value)
            })
            .collect();
        self.clear();
        entries
    }
}

impl<K, V, C> RawRBTree<K, V, C> {
    /// Descends from the root looking for `key`. Returns the matching node, or
    /// the point a node for `key` would be linked at.
    pub(crate) fn search<Q>(&self, key: &Q) -> Result<Handle, InsertPoint>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let Some(mut current) = self.root else {
            return Err(None);
        };

        loop {
            let node = self.nodes.get(current);
            let side = match self.comparator.compare(key, node.key().borrow()) {
                Ordering::Equal => return Ok(current),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            match node.child(side) {
                Some(child) => current = child,
                None => return Err(Some((current, side))),
            }
        }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.search(key).ok()
    }

    /// First entry whose key is not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.bound(key, |ordering| ordering != Ordering::Greater)
    }

    /// First entry whose key is greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.bound(key, |ordering| ordering == Ordering::Less)
    }

    /// Descent remembering the last node where we went left. `go_left` is
    /// asked with the ordering of `key` against the node's key.
    fn bound<Q, F>(&self, key: &Q, go_left: F) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
        F: Fn(Ordering) -> bool,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if go_left(self.comparator.compare(key, node.key().borrow())) {
                best = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        best
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.find(key).map(|handle| self.key_value(handle).1)
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let handle = self.find(key)?;
        Some(self.key_value_mut(handle).1)
    }

    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let handle = self.find(key)?;
        Some(self.remove_at(handle).0)
    }

    /// Inserts `key` unless an equal key is present. Returns the handle of the
    /// entry holding the key and whether it was inserted; on a duplicate the
    /// stored entry is left untouched and `value` is dropped.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, bool)
    where
        C: Compare<K>,
    {
        match self.search(&key) {
            Ok(existing) => (existing, false),
            Err(point) => (self.link(point, key, value), true),
        }
    }

    /// Like [`insert`](Self::insert), but reserves node storage up front and
    /// reports allocation failure instead of aborting. On error the tree is
    /// unchanged.
    pub(crate) fn try_insert(&mut self, key: K, value: V) -> Result<(Handle, bool), Error>
    where
        C: Compare<K>,
    {
        let point = match self.search(&key) {
            Ok(existing) => return Ok((existing, false)),
            Err(point) => point,
        };

        if let Err(error) = self.reserve_one() {
            #[cfg(feature = "tracing")]
            tracing::warn!(%error, len = self.len, "insert: node allocation failed");
            return Err(error);
        }
        Ok((self.link(point, key, value), true))
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RawRBTree<K, V, C> {
    /// Clones the arenas slot for slot, so the copy has the same shape and the
    /// same handles as the original.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            values: self.values.clone(),
            root: self.root,
            first: self.first,
            last: self.last,
            len: self.len,
            comparator: self.comparator.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    type Tree = RawRBTree<i32, i32, Natural>;

    fn keys_in_order(tree: &Tree) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = tree.first();
        while let Some(handle) = current {
            keys.push(*tree.key(handle));
            current = tree.successor(handle);
        }
        keys
    }

    fn keys_in_reverse(tree: &Tree) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = tree.last();
        while let Some(handle) = current {
            keys.push(*tree.key(handle));
            current = tree.predecessor(handle);
        }
        keys
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree = Tree::new(Natural);
            let mut model = alloc::collections::BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let (handle, inserted) = tree.insert(key, key * 2);
                        prop_assert_eq!(inserted, model.insert(key));
                        prop_assert_eq!(*tree.key(handle), key);
                    }
                    Op::Remove(key) => {
                        let removed = tree.remove_entry(&key);
                        prop_assert_eq!(removed.map(|(k, _)| k), model.take(&key));
                    }
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
            }

            let expected: Vec<i32> = model.iter().copied().collect();
            prop_assert_eq!(keys_in_order(&tree), expected.clone());
            prop_assert_eq!(keys_in_reverse(&tree), expected.into_iter().rev().collect::<Vec<_>>());
        }

        #[test]
        fn bounds_match_a_sorted_model(keys in prop::collection::btree_set(0i32..200, 0..64), probe in -5i32..205) {
            let mut tree = Tree::new(Natural);
            for &key in &keys {
                tree.insert(key, key);
            }

            let lower = keys.range(probe..).next().copied();
            let upper = keys.range(probe + 1..).next().copied();
            prop_assert_eq!(tree.lower_bound(&probe).map(|h| *tree.key(h)), lower);
            prop_assert_eq!(tree.upper_bound(&probe).map(|h| *tree.key(h)), upper);
        }

        #[test]
        fn handles_survive_unrelated_removals(keys in prop::collection::btree_set(0i32..500, 2..128), pick in any::<prop::sample::Index>()) {
            let mut tree = Tree::new(Natural);
            let handles: Vec<(i32, Handle)> = keys.iter().map(|&k| (k, tree.insert(k, -k).0)).collect();
            let (kept_key, kept_handle) = handles[pick.index(handles.len())];

            for &(key, _) in &handles {
                if key != kept_key {
                    tree.remove_entry(&key);
                    prop_assert_eq!(tree.key_value(kept_handle), (&kept_key, &-kept_key));
                }
            }
            prop_assert_eq!(tree.len(), 1);
        }
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree = Tree::new(Natural);
        for i in 0..1023 {
            tree.insert(i, i);
            tree.check_invariants().unwrap();
        }
        // 2 * log2(1024)
        assert!(tree.height() <= 20, "height {} too large", tree.height());
    }

    #[test]
    fn three_ascending_inserts_rotate_to_the_middle() {
        let mut tree = Tree::new(Natural);
        let (one, _) = tree.insert(1, 1);
        let (two, _) = tree.insert(2, 2);
        let (three, _) = tree.insert(3, 3);

        let root = tree.root().unwrap();
        assert_eq!(root, two);
        assert_eq!(tree.node(root).color(), Color::Black);
        assert_eq!(tree.node(root).left(), Some(one));
        assert_eq!(tree.node(root).right(), Some(three));
        assert_eq!(tree.node(one).color(), Color::Red);
        assert_eq!(tree.node(three).color(), Color::Red);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn duplicate_insert_keeps_first_value() {
        let mut tree = Tree::new(Natural);
        let (first, inserted) = tree.insert(7, 70);
        assert!(inserted);
        let (again, inserted) = tree.insert(7, 700);
        assert!(!inserted);
        assert_eq!(first, again);
        assert_eq!(tree.key_value(first), (&7, &70));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_at_returns_the_following_position() {
        let mut tree = Tree::new(Natural);
        for key in [10, 20, 5, 15, 30, 25] {
            tree.insert(key, key);
        }
        let ten = tree.find(&10).unwrap();
        let (entry, next) = tree.remove_at(ten);
        assert_eq!(entry, (10, 10));
        assert_eq!(next.map(|h| *tree.key(h)), Some(15));

        let thirty = tree.find(&30).unwrap();
        assert_eq!(tree.remove_at(thirty).1, None);
        assert_eq!(keys_in_order(&tree), [5, 15, 20, 25]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn boundaries_follow_min_and_max() {
        let mut tree = Tree::new(Natural);
        assert_eq!(tree.prev_position(None), None);
        for key in [50, 40, 60, 30, 70] {
            tree.insert(key, key);
        }
        assert_eq!(tree.first().map(|h| *tree.key(h)), Some(30));
        assert_eq!(tree.prev_position(None).map(|h| *tree.key(h)), Some(70));
        assert_eq!(tree.next_position(None).map(|h| *tree.key(h)), Some(30));

        assert_eq!(tree.pop_last(), Some((70, 70)));
        assert_eq!(tree.pop_first(), Some((30, 30)));
        assert_eq!(tree.first().map(|h| *tree.key(h)), Some(40));
        assert_eq!(tree.last().map(|h| *tree.key(h)), Some(60));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn retain_removes_while_walking() {
        let mut tree = Tree::new(Natural);
        for key in 0..100 {
            tree.insert(key, key);
        }
        tree.retain(|key, value| {
            *value += 1;
            key % 3 == 0
        });
        tree.check_invariants().unwrap();
        assert_eq!(keys_in_order(&tree), (0..100).step_by(3).collect::<Vec<_>>());
        assert_eq!(tree.get(&99), Some(&100));
    }

    #[test]
    fn remove_range_stops_before_the_stop_handle() {
        let mut tree = Tree::new(Natural);
        for key in 0..64 {
            tree.insert(key, key);
        }
        let (start, stop) = (tree.find(&10), tree.find(&40));
        assert_eq!(tree.remove_range(start, stop), 30);
        tree.check_invariants().unwrap();
        assert_eq!(tree.key(stop.unwrap()), &40);
        assert_eq!(keys_in_order(&tree), (0..10).chain(40..64).collect::<Vec<_>>());

        assert_eq!(tree.remove_range(stop, None), 24);
        tree.check_invariants().unwrap();
        assert_eq!(tree.last(), tree.find(&9));
        assert_eq!(tree.remove_range(tree.first(), tree.first()), 0);
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn drain_hands_out_sorted_entries_and_empties() {
        let mut tree = Tree::new(Natural);
        for key in [3, 1, 2] {
            tree.insert(key, key * 10);
        }
        assert_eq!(tree.drain_to_vec(), [(1, 10), (2, 20), (3, 30)]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn try_insert_reports_full_handle_space_and_leaves_tree_intact() {
        let max = Tree::max_size();
        let mut tree = Tree::new(Natural);
        for key in 0..max as i32 {
            tree.insert(key, key);
        }

        let before = tree.height();
        assert_eq!(tree.try_insert(-1, -1), Err(Error::CapacityExceeded { max }));
        assert_eq!(tree.len(), max);
        assert_eq!(tree.height(), before);
        assert_eq!(tree.find(&-1), None);

        // A duplicate needs no storage and still succeeds.
        assert_eq!(tree.try_insert(5, 0).map(|(h, inserted)| (*tree.key(h), inserted)), Ok((5, false)));

        tree.remove_entry(&0);
        assert!(tree.try_insert(-1, -1).unwrap().1);
        tree.check_invariants().unwrap();
    }
}
