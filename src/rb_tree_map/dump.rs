use core::fmt;

use smallvec::SmallVec;

use crate::compare::Natural;
use crate::raw::{Color, Handle, RawRBTree, Side};

/// A structural dump of a [`RBTreeMap`](crate::RBTreeMap), for debugging.
///
/// Created by [`RBTreeMap::dump`](crate::RBTreeMap::dump). Each line shows one
/// node in pre-order, indented by depth, as
/// `<side> <color> <key> => <value>`, where side is `L`/`R` (blank for the
/// root) and color is `B` or `R`. The format is not stable.
///
/// # Examples
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// let map = RBTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
/// assert_eq!(
///     map.dump().to_string(),
///     "B 2 => 'b'\n  L R 1 => 'a'\n  R R 3 => 'c'\n",
/// );
/// ```
pub struct Dump<'a, K, V, C = Natural> {
    tree: &'a RawRBTree<K, V, C>,
}

impl<'a, K, V, C> Dump<'a, K, V, C> {
    pub(crate) const fn new(tree: &'a RawRBTree<K, V, C>) -> Self {
        Self { tree }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Display for Dump<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.tree.root() else {
            return writeln!(f, "(empty)");
        };

        let mut stack: SmallVec<[(Handle, usize, Option<Side>); 64]> = SmallVec::new();
        stack.push((root, 0, None));
        while let Some((handle, depth, side)) = stack.pop() {
            let node = self.tree.node(handle);
            let (key, value) = self.tree.key_value(handle);

            write!(f, "{:width$}", "", width = depth * 2)?;
            match side {
                Some(Side::Left) => f.write_str("L ")?,
                Some(Side::Right) => f.write_str("R ")?,
                None => {}
            }
            let color = match node.color() {
                Color::Red => 'R',
                Color::Black => 'B',
            };
            writeln!(f, "{color} {key:?} => {value:?}")?;

            stack.extend(node.right().map(|child| (child, depth + 1, Some(Side::Right))));
            stack.extend(node.left().map(|child| (child, depth + 1, Some(Side::Left))));
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Dump<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
