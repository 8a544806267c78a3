use core::cmp::Ordering;

use super::handle::Handle;
use super::raw_rb_tree::RawRBTree;
use crate::compare::Compare;
use crate::error::InvariantViolation;

impl<K, V, C: Compare<K>> RawRBTree<K, V, C> {
    /// Checks every structural invariant of the tree, stopping at the first
    /// violation found.
    ///
    /// Runs in O(n) time; links are checked before the in-order walk relies
    /// on them.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root() else {
            if self.len() != 0 || self.allocated() != 0 {
                return Err(InvariantViolation::LengthMismatch {
                    recorded: self.len(),
                    actual: 0,
                });
            }
            if self.first().is_some() || self.last().is_some() {
                return Err(InvariantViolation::StaleBoundary);
            }
            return Ok(());
        };

        let root_node = self.node(root);
        if root_node.parent().is_some() {
            return Err(InvariantViolation::BrokenParentLink { depth: 0 });
        }
        if root_node.is_red() {
            return Err(InvariantViolation::RedRoot);
        }

        let mut reachable = 0;
        self.check_subtree(root, 0, &mut reachable)?;
        for actual in [reachable, self.allocated()] {
            if actual != self.len() {
                return Err(InvariantViolation::LengthMismatch {
                    recorded: self.len(),
                    actual,
                });
            }
        }

        if self.first() != Some(self.leftmost(root)) || self.last() != Some(self.rightmost(root)) {
            return Err(InvariantViolation::StaleBoundary);
        }

        let mut previous: Option<Handle> = None;
        let mut current = self.first();
        let mut position = 0;
        while let Some(handle) = current {
            if let Some(previous) = previous
                && self.comparator().compare(self.key(previous), self.key(handle)) != Ordering::Less
            {
                return Err(InvariantViolation::Unordered { position });
            }
            previous = Some(handle);
            current = self.successor(handle);
            position += 1;
        }

        Ok(())
    }

    /// Checks links and colors below `handle`, returning its black-height
    /// with the terminal counted as one black leaf.
    fn check_subtree(&self, handle: Handle, depth: usize, reachable: &mut usize) -> Result<usize, InvariantViolation> {
        *reachable += 1;
        let node = self.node(handle);

        let mut heights = [1usize; 2];
        for (height, child) in heights.iter_mut().zip([node.left(), node.right()]) {
            let Some(child) = child else { continue };
            let child_node = self.node(child);
            if child_node.parent() != Some(handle) {
                return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 });
            }
            if node.is_red() && child_node.is_red() {
                return Err(InvariantViolation::RedRed { depth: depth + 1 });
            }
            *height = self.check_subtree(child, depth + 1, reachable)?;
        }

        let [left, right] = heights;
        if left != right {
            return Err(InvariantViolation::BlackHeight { depth, left, right });
        }
        Ok(left + usize::from(!node.is_red()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::compare::{Compare, Natural};
    use crate::error::InvariantViolation;
    use crate::raw::RawRBTree;
    use core::cmp::Ordering;

    #[test]
    fn empty_tree_is_valid() {
        let tree: RawRBTree<u8, (), Natural> = RawRBTree::new(Natural);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    /// Orders like `Natural` until `flipped` is set, then reversed.
    struct Flippable(core::cell::Cell<bool>);

    impl Compare<i32> for Flippable {
        fn compare(&self, a: &i32, b: &i32) -> Ordering {
            if self.0.get() { b.cmp(a) } else { a.cmp(b) }
        }
    }

    #[test]
    fn detects_an_ordering_change() {
        let mut tree = RawRBTree::new(Flippable(core::cell::Cell::new(false)));
        for key in 0..4 {
            tree.insert(key, ());
        }
        assert_eq!(tree.check_invariants(), Ok(()));

        tree.comparator().0.set(true);
        assert_eq!(tree.check_invariants(), Err(InvariantViolation::Unordered { position: 1 }));
    }
}
