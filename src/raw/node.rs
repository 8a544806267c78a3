use super::handle::Handle;

/// The color tag of a red-black node. The terminal is implicitly black.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child link of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A tree vertex: one key, the handle of its value, a color and the three
/// navigation links. `None` links point at the terminal.
#[derive(Clone)]
pub(crate) struct Node<K> {
    key: K,
    value: Handle,
    color: Color,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K> Node<K> {
    /// Creates a detached red node.
    pub(crate) const fn new(key: K, value: Handle) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) const fn value(&self) -> Handle {
        self.value
    }

    #[inline]
    pub(crate) const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns which side `child` hangs off, or `None` if it is not a child.
    #[inline]
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_red_and_detached() {
        let node = Node::new("k", Handle::from_index(0));
        assert!(node.is_red());
        assert_eq!(node.parent(), None);
        assert_eq!(node.left(), None);
        assert_eq!(node.right(), None);
    }

    #[test]
    fn child_links_by_side() {
        let (a, b) = (Handle::from_index(1), Handle::from_index(2));
        let mut node = Node::new(0, Handle::from_index(0));
        node.set_child(Side::Left, Some(a));
        node.set_child(Side::Left.opposite(), Some(b));

        assert_eq!(node.child(Side::Right), Some(b));
        assert_eq!(node.side_of(a), Some(Side::Left));
        assert_eq!(node.side_of(b), Some(Side::Right));
        assert_eq!(node.side_of(Handle::from_index(3)), None);
    }
}
