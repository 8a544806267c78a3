use alloc::collections::TryReserveError;

/// Errors reported by the fallible operations of [`RBTreeMap`](crate::RBTreeMap)
/// and its cursors.
///
/// A missing key is never an error: lookups report absence with `None`, a
/// cursor at the end position, or a zero count.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Node storage could not be allocated. The map is left unmodified.
    #[error("failed to allocate tree node: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// Every node handle is in use. The map is left unmodified.
    #[error("map already holds the maximum of {max} entries")]
    CapacityExceeded {
        /// The value of [`RBTreeMap::max_size`](crate::RBTreeMap::max_size).
        max: usize,
    },

    /// The cursor was dereferenced at the end position or stepped past a
    /// boundary of the map.
    #[error("cursor is at the end position or would step past a boundary")]
    InvalidCursor,
}

/// A broken red-black tree invariant, as found by
/// [`RBTreeMap::check_invariants`](crate::RBTreeMap::check_invariants).
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// In-order traversal is not strictly ascending under the comparator.
    #[error("keys are not in strictly ascending order at in-order position {position}")]
    Unordered {
        /// Zero-based in-order position of the out-of-order entry.
        position: usize,
    },

    /// A red node has a red child.
    #[error("red node at depth {depth} has a red child")]
    RedRed {
        /// Depth of the child (root is depth 0).
        depth: usize,
    },

    /// Two paths from a node to the terminal cross a different number of
    /// black nodes.
    #[error("black-height mismatch at depth {depth}: left {left}, right {right}")]
    BlackHeight {
        /// Depth of the node whose subtrees disagree.
        depth: usize,
        /// Black-height of the left subtree.
        left: usize,
        /// Black-height of the right subtree.
        right: usize,
    },

    /// The root of a non-empty tree is red.
    #[error("root is red")]
    RedRoot,

    /// A child's parent link does not point back at its parent.
    #[error("parent link of the node at depth {depth} is broken")]
    BrokenParentLink {
        /// Depth of the child with the broken link.
        depth: usize,
    },

    /// The maintained entry count disagrees with the number of nodes reachable
    /// from the root.
    #[error("length is {recorded} but the tree holds {actual} entries")]
    LengthMismatch {
        /// Counter kept by the map.
        recorded: usize,
        /// Entries found by traversal.
        actual: usize,
    },

    /// The cached first or last entry is not the leftmost or rightmost node.
    #[error("cached first/last entry does not match the tree boundary")]
    StaleBoundary,
}
