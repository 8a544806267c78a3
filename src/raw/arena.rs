use alloc::vec::Vec;

use super::handle::Handle;
use crate::error::Error;

/// A slot is either a live element or a link in the free list.
#[derive(Clone)]
pub(crate) enum Slot<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// Node storage: acquire and release element slots addressed by [`Handle`].
///
/// Released slots are threaded into an intrusive free list and reused before
/// the backing vector grows, so a handle stays put for as long as its element
/// lives.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Makes sure the next [`alloc`](Self::alloc) neither reallocates nor
    /// runs out of handles.
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), Error> {
        if self.free_head.is_some() {
            return Ok(());
        }
        if self.slots.len() > Handle::MAX {
            return Err(Error::CapacityExceeded { max: Handle::MAX + 1 });
        }
        self.slots.try_reserve(1)?;
        Ok(())
    }

    /// # Panics
    /// Panics, leaving the arena unchanged, if every handle is in use.
    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        let handle = if let Some(h) = self.free_head {
            let slot = &mut self.slots[h.to_index()];
            match core::mem::replace(slot, Slot::Occupied(element)) {
                Slot::Vacant(next) => self.free_head = next,
                Slot::Occupied(_) => unreachable!("`Arena::alloc()` - free list points at a live slot!"),
            }
            h
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot::Occupied(element));
            Handle::from_index(self.slots.len() - 1)
        };
        self.len += 1;
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    /// Returns a pointer to the first slot without materializing a reference
    /// to the slot buffer.
    #[inline]
    pub(crate) fn slots_ptr(&mut self) -> *mut Slot<T> {
        self.slots.as_mut_ptr()
    }

    /// Returns a mutable reference to an element through a slot pointer from
    /// [`slots_ptr`](Self::slots_ptr).
    ///
    /// # Safety
    /// - `base` must come from `slots_ptr` on an arena that has not been
    ///   resized or dropped since, and `handle` must be live in it.
    /// - No other reference to the element at `handle` may exist for `'a`.
    #[inline]
    pub(crate) unsafe fn get_mut_raw<'a>(base: *mut Slot<T>, handle: Handle) -> &'a mut T {
        // SAFETY: caller guarantees `handle` is in bounds and exclusively ours.
        match unsafe { &mut *base.add(handle.to_index()) } {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get_mut_raw()` - `handle` is invalid!"),
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.to_index()];
        match core::mem::replace(slot, Slot::Vacant(self.free_head)) {
            Slot::Occupied(element) => {
                self.free_head = Some(handle);
                self.len -= 1;
                element
            }
            Slot::Vacant(next) => {
                *slot = Slot::Vacant(next);
                panic!("`Arena::take()` - `handle` is invalid!")
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn with_capacity_preallocates() {
        let arena: Arena<u32> = Arena::with_capacity(10);
        assert!(arena.capacity() >= 10);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn released_slots_are_reused_last_in_first_out() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        let _c = arena.alloc('c');
        assert_eq!(arena.take(a), 'a');
        assert_eq!(arena.take(b), 'b');
        assert_eq!(arena.alloc('d'), b);
        assert_eq!(arena.alloc('e'), a);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    #[should_panic(expected = "`Arena::get()` - `handle` is invalid!")]
    fn stale_handle_panics() {
        let mut arena = Arena::new();
        let h = arena.alloc(1u8);
        arena.take(h);
        let _ = arena.get(h);
    }

    #[test]
    fn reserve_reports_exhausted_handle_space() {
        let mut arena: Arena<()> = Arena::new();
        for _ in 0..=Handle::MAX {
            arena.try_reserve_one().unwrap();
            arena.alloc(());
        }
        assert_eq!(
            arena.try_reserve_one(),
            Err(Error::CapacityExceeded { max: Handle::MAX + 1 })
        );

        // Freeing one slot makes room again without growing.
        arena.take(Handle::from_index(3));
        assert_eq!(arena.try_reserve_one(), Ok(()));
    }

    #[test]
    fn alloc_past_handle_space_leaves_len_untouched() {
        extern crate std;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let mut arena: Arena<()> = Arena::new();
        for _ in 0..=Handle::MAX {
            arena.alloc(());
        }
        let full = arena.len();
        assert!(catch_unwind(AssertUnwindSafe(|| arena.alloc(()))).is_err());
        assert_eq!(arena.len(), full);
        assert_eq!(arena.len(), Handle::MAX + 1);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        prop_assert!(model.iter().all(|&(h, _)| h != handle));
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let (handle, expected) = model.swap_remove(index);
                        prop_assert_eq!(arena.take(handle), expected);
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            10 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
