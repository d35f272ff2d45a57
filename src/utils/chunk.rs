//  See `RawChunk` and `SlotPosition` types.
//
//  #   Why raw storage?
//
//  A chunk is mostly uninitialized: only the slots of the live window hold an element, and the window moves freely
//  within and across chunks. A `[T; N]` would require `N` live elements at all times, and a `[MaybeUninit<T>; N]`
//  behind a `Box` would tie the lifetime of the block to the global allocator.
//
//  The initialization state of each slot is not stored: it is implied by the window of the owner.
//
//
//  #   Why a handle?
//
//  The chunk table relocates handles when it grows, and never the elements themselves. Handles are thus plain `Copy`
//  pointers, and the table is solely responsible for releasing them.

use core::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use crate::utils::{DequeError, alloc::Allocator};

/// A handle to a block of raw storage for exactly `N` elements of type `T`.
///
/// The handle does not own the block: it is released by `RawChunk::deallocate`, called by its owner.
pub(crate) struct RawChunk<T, const N: usize> {
    //  Safety Invariants:
    //  -   Zero-Sized Dangling: if `Self::layout()` has a size of 0, `ptr` is dangling, and suitably aligned.
    //  -   Allocated: otherwise, `ptr` was obtained from `allocate`, and is valid for `N` elements.
    ptr: NonNull<T>,
    _marker: PhantomData<[T; N]>,
}

impl<T, const N: usize> RawChunk<T, N> {
    /// Allocates a fresh block of `N` uninitialized slots.
    pub(crate) fn allocate<A>(allocator: &A) -> Result<Self, DequeError>
    where
        A: Allocator,
    {
        const { assert!(N > 0, "a chunk must hold at least one element") };

        let layout = Self::layout()?;

        if layout.size() == 0 {
            //  Safety Invariant:
            //  -   Zero-Sized Dangling: `NonNull::dangling` is suitably aligned.
            return Ok(Self::from_ptr(NonNull::dangling()));
        }

        let ptr = allocator
            .allocate(layout)
            .map_err(|_| DequeError::AllocFailed { layout })?;

        //  Safety Invariant:
        //  -   Allocated: `ptr` is valid for `layout`, which is `N` elements.
        Ok(Self::from_ptr(ptr.cast()))
    }

    /// Releases the block.
    ///
    /// No element is dropped: any slot still initialized is leaked.
    ///
    /// #   Safety
    ///
    /// -   Liveness: `self` must not have been deallocated already, through any copy of the handle.
    /// -   Selfness: `self` must have been allocated by `allocator`.
    pub(crate) unsafe fn deallocate<A>(self, allocator: &A)
    where
        A: Allocator,
    {
        //  `layout` succeeded on allocation, and it is a pure function.
        let Ok(layout) = Self::layout() else { return };

        if layout.size() == 0 {
            return;
        }

        //  Safety:
        //  -   Liveness: as per Liveness pre-condition.
        //  -   Selfness: as per Selfness pre-condition.
        //  -   Layout: `layout` is the layout used for allocation.
        unsafe { allocator.deallocate(self.ptr.cast(), layout) }
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `offset` must be strictly less than `N`.
    #[inline(always)]
    pub(crate) unsafe fn slot(self, offset: usize) -> NonNull<T> {
        debug_assert!(offset < N, "{} >= {}", offset, N);

        //  Safety:
        //  -   The block is valid for `N` elements, as per the Safety Invariants, and `offset < N`.
        unsafe { self.ptr.add(offset) }
    }

    /// Moves `value` into the slot at `offset`.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `offset` must be strictly less than `N`.
    /// -   Liveness: the block must still be allocated.
    /// -   Uninitialized: the slot must be uninitialized, or its current value is leaked.
    #[inline(always)]
    pub(crate) unsafe fn write(self, offset: usize, value: T) {
        //  Safety:
        //  -   In Bounds: as per pre-condition.
        let slot = unsafe { self.slot(offset) };

        //  Safety:
        //  -   `slot` is valid for writes, and aligned, as per Liveness pre-condition.
        unsafe { slot.write(value) }
    }

    /// Moves the value out of the slot at `offset`, leaving it uninitialized.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `offset` must be strictly less than `N`.
    /// -   Liveness: the block must still be allocated.
    /// -   Initialized: the slot must be initialized.
    #[inline(always)]
    pub(crate) unsafe fn read(self, offset: usize) -> T {
        //  Safety:
        //  -   In Bounds: as per pre-condition.
        let slot = unsafe { self.slot(offset) };

        //  Safety:
        //  -   `slot` is valid for reads, aligned, and initialized, as per Liveness & Initialized pre-conditions.
        unsafe { slot.read() }
    }

    //  Wraps a pointer in a handle.
    const fn from_ptr(ptr: NonNull<T>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    //  The layout of a single block.
    fn layout() -> Result<Layout, DequeError> {
        Layout::array::<T>(N).map_err(|_| DequeError::CapacityOverflow)
    }
}

impl<T, const N: usize> Clone for RawChunk<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for RawChunk<T, N> {}

/// The coordinates of a slot: the index of its chunk in the table, and its offset within the chunk.
///
/// The offset of a well-formed position is always strictly less than the chunk capacity `N`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct SlotPosition {
    pub(crate) chunk: usize,
    pub(crate) offset: usize,
}

impl SlotPosition {
    /// The first slot of the first chunk.
    pub(crate) const ORIGIN: Self = Self { chunk: 0, offset: 0 };

    /// Creates a new position.
    pub(crate) const fn new(chunk: usize, offset: usize) -> Self {
        Self { chunk, offset }
    }

    /// Returns whether this is the first slot of the first chunk.
    pub(crate) const fn is_origin(self) -> bool {
        self.chunk == 0 && self.offset == 0
    }

    /// Returns the position, counted in slots from the origin.
    pub(crate) const fn linear<const N: usize>(self) -> usize {
        self.chunk * N + self.offset
    }

    /// Returns the position `count` slots further.
    pub(crate) const fn advance<const N: usize>(self, count: usize) -> Self {
        let shifted = self.offset + count;

        Self::new(self.chunk + shifted / N, shifted % N)
    }

    /// Returns the position of the next slot, crossing into the next chunk as necessary.
    pub(crate) const fn next<const N: usize>(self) -> Self {
        if self.offset + 1 < N {
            Self::new(self.chunk, self.offset + 1)
        } else {
            Self::new(self.chunk + 1, 0)
        }
    }

    /// Returns the position of the previous slot, crossing into the previous chunk as necessary.
    ///
    /// #   Panics
    ///
    /// In Debug, if `self` is the origin.
    pub(crate) const fn prev<const N: usize>(self) -> Self {
        debug_assert!(!self.is_origin());

        if self.offset > 0 {
            Self::new(self.chunk, self.offset - 1)
        } else {
            Self::new(self.chunk - 1, N - 1)
        }
    }
}

// mod tests
