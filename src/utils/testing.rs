//  Test helpers: an allocator which counts live blocks, and can be told to fail.

use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use std::rc::Rc;

use crate::utils::alloc::{AllocError, Allocator, Global};

#[derive(Default)]
struct Counters {
    live: Cell<usize>,
    budget: Cell<Option<usize>>,
}

/// Allocator tracking the number of live blocks.
#[derive(Clone, Default)]
pub(crate) struct CountingAllocator(Rc<Counters>);

impl CountingAllocator {
    /// Returns the number of blocks currently allocated.
    pub(crate) fn live(&self) -> usize {
        self.0.live.get()
    }

    /// Lets `n` further allocations succeed, then fails all others.
    pub(crate) fn fail_after(&self, n: usize) {
        self.0.budget.set(Some(n));
    }
}

unsafe impl Allocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if let Some(budget) = self.0.budget.get() {
            let budget = budget.checked_sub(1).ok_or(AllocError)?;

            self.0.budget.set(Some(budget));
        }

        let ptr = Global.allocate(layout)?;

        self.0.live.set(self.0.live.get() + 1);

        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.live.set(self.0.live.get() - 1);

        //  Safety:
        //  -   Forward pre-conditions, as all blocks come from `Global`.
        unsafe { Global.deallocate(ptr, layout) }
    }
}
