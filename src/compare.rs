use core::cmp::Ordering;

/// A strict weak ordering over keys, injected into a map at construction.
///
/// The map stores its comparator once and consults it on every descent. Any
/// `Fn(&Q, &Q) -> Ordering` closure is a comparator, as are [`Natural`] and
/// [`Reversed`].
///
/// It is a logic error for a comparator to be inconsistent (for example to
/// report `a < b` and `b < a`). The map stays memory safe but may return
/// incorrect results.
///
/// # Examples
///
/// ```
/// use rb_tree_map::RBTreeMap;
///
/// // Case-insensitive keys.
/// let mut map = RBTreeMap::with_comparator(|a: &&str, b: &&str| {
///     a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
/// });
/// map.insert("Apple", 1);
/// assert!(!map.insert("APPLE", 2).1);
/// assert_eq!(map.get(&"apple"), Some(&1));
/// ```
pub trait Compare<Q: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &Q, b: &Q) -> Ordering;
}

/// The key's own [`Ord`] implementation. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<Q: ?Sized + Ord> Compare<Q> for Natural {
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.cmp(b)
    }
}

/// The reverse of the key's [`Ord`] implementation.
///
/// ```
/// use rb_tree_map::{RBTreeMap, Reversed};
///
/// let map: RBTreeMap<_, _, Reversed> = [(1, 'a'), (3, 'c'), (2, 'b')].into_iter().collect();
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reversed;

impl<Q: ?Sized + Ord> Compare<Q> for Reversed {
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        b.cmp(a)
    }
}

impl<Q: ?Sized, F> Compare<Q> for F
where
    F: Fn(&Q, &Q) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn natural_and_reversed_disagree() {
        assert_eq!(Natural.compare(&1, &2), Ordering::Less);
        assert_eq!(Reversed.compare(&1, &2), Ordering::Greater);
        assert_eq!(Reversed.compare("b", "b"), Ordering::Equal);
    }

    #[test]
    fn closures_are_comparators() {
        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
        assert_eq!(by_len.compare(&"abc", &"z"), Ordering::Greater);
    }
}
