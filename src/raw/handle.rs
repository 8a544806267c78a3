use core::fmt;
use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// A stable address of an arena slot.
///
/// Handles are 1-based internally so `Option<Handle>` is the same size as a
/// `Handle`; `None` is the terminal position of the tree.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Largest slot index a handle can address.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        match NonZero::new((index + 1) as RawHandle) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_index())
    }
}
