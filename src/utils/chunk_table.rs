//  See `ChunkTable`.
//
//  #   Why not a `Vec`?
//
//  The handles must be allocated by the same allocator as the chunks, and the table only ever grows by tripling, with
//  the old handles landing in the middle third. A `Vec<_, A>` is unstable, and would not help with the latter anyway.
//
//  #   Why no `Drop`?
//
//  The table does not own its allocator: the owner of the table does, and releases the table explicitly, through
//  `ChunkTable::deallocate`, after dropping whatever elements remain in the chunks.

use core::{alloc::Layout, ops::Range, ptr::NonNull};

use crate::utils::{DequeError, RawChunk, alloc::Allocator};

/// An ordered table of chunk handles.
///
/// Every handle in the table references a live block, owned by the table.
pub(crate) struct ChunkTable<T, const N: usize> {
    //  Safety Invariants:
    //  -   Empty Dangling: if an empty slice, it is dangling.
    //  -   Self-Allocated: if not empty, it and every chunk it references are allocated by the owner's allocator.
    //  -   Initialized: if not empty, all `handles.len()` handles are initialized.
    handles: NonNull<[RawChunk<T, N>]>,
}

//
//  Creation
//

impl<T, const N: usize> ChunkTable<T, N> {
    /// Returns a new, empty, table.
    pub(crate) const fn new() -> Self {
        //  Safety Invariant:
        //  -   Empty Dangling: create an empty slice, with a dangling pointer.
        let handles = NonNull::slice_from_raw_parts(NonNull::dangling(), 0);

        Self { handles }
    }

    /// Returns a new table of `n` freshly allocated chunks.
    ///
    /// On error, nothing is left allocated.
    pub(crate) fn allocate<A>(allocator: &A, n: usize) -> Result<Self, DequeError>
    where
        A: Allocator,
    {
        if n == 0 {
            return Ok(Self::new());
        }

        let handles = Self::allocate_handles(allocator, n)?;

        //  Safety:
        //  -   `handles` was allocated by `allocator`, and its range is uninitialized.
        if let Err(error) = unsafe { Self::fill(allocator, handles, 0..n) } {
            //  Safety:
            //  -   `handles` was allocated by `allocator`, with `n` handles.
            unsafe { Self::deallocate_handles(allocator, handles) };

            return Err(error);
        }

        Ok(Self { handles })
    }
}

//
//  Access
//

impl<T, const N: usize> ChunkTable<T, N> {
    /// Returns the number of chunks in the table.
    #[inline(always)]
    pub(crate) const fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns the chunk at `index`.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `index` must be strictly less than `self.len()`.
    #[inline(always)]
    pub(crate) unsafe fn chunk_unchecked(&self, index: usize) -> RawChunk<T, N> {
        debug_assert!(index < self.len(), "{} >= {}", index, self.len());

        //  Safety:
        //  -   `index` is in bounds, as per pre-condition.
        //  -   All handles are initialized, as per the Safety Invariants.
        unsafe { self.handles.cast::<RawChunk<T, N>>().add(index).read() }
    }
}

//
//  Growth & Release
//

impl<T, const N: usize> ChunkTable<T, N> {
    /// Grows the table, returning by how many chunks the existing handles were shifted.
    ///
    /// An empty table grows to a single chunk, and nothing is shifted. Otherwise, the table triples: the existing
    /// handles are moved to the middle third, and the first and last thirds are freshly allocated.
    ///
    /// On error, `self` is left unchanged.
    ///
    /// #   Safety
    ///
    /// -   Selfness: `self` must have been allocated by `allocator`.
    pub(crate) unsafe fn grow<A>(&mut self, allocator: &A) -> Result<usize, DequeError>
    where
        A: Allocator,
    {
        let old = self.len();

        if old == 0 {
            *self = Self::allocate(allocator, 1)?;

            return Ok(0);
        }

        let new = old.checked_mul(3).ok_or(DequeError::CapacityOverflow)?;

        let handles = Self::allocate_handles(allocator, new)?;

        //  Safety:
        //  -   `handles` was allocated by `allocator`, and its range is uninitialized.
        if let Err(error) = unsafe { Self::fill(allocator, handles, 0..old) } {
            //  Safety:
            //  -   `handles` was allocated by `allocator`, with `new` handles.
            unsafe { Self::deallocate_handles(allocator, handles) };

            return Err(error);
        }

        //  Safety:
        //  -   `handles` was allocated by `allocator`, and its range is uninitialized.
        if let Err(error) = unsafe { Self::fill(allocator, handles, (2 * old)..new) } {
            //  Safety:
            //  -   The first third was filled by `allocator`, and is not referenced anywhere else.
            //  -   `handles` was allocated by `allocator`, with `new` handles.
            unsafe {
                Self::release(allocator, handles, 0..old);
                Self::deallocate_handles(allocator, handles);
            }

            return Err(error);
        }

        //  Safety:
        //  -   `self.handles` is valid for reads of `old` handles, as per Initialized Invariant.
        //  -   The middle third of `handles` is valid for writes of `old` handles, and `old..2 * old` is in bounds.
        //  -   Both are properly aligned, as per Self-Allocated Invariant.
        //  -   They do not overlap, as `handles` is a fresh allocation.
        unsafe {
            let middle = handles.cast::<RawChunk<T, N>>().add(old);

            middle.copy_from_nonoverlapping(self.handles.cast(), old);
        }

        //  Safety:
        //  -   `self.handles` was allocated by `allocator`, as per Selfness pre-condition, and is non-empty.
        //  -   The chunks it references now belong to `handles`.
        unsafe { Self::deallocate_handles(allocator, self.handles) };

        self.handles = handles;

        Ok(old)
    }

    /// Releases all chunks, and the table itself, leaving `self` empty.
    ///
    /// No element is dropped: any slot still initialized is leaked.
    ///
    /// #   Safety
    ///
    /// -   Selfness: `self` must have been allocated by `allocator`.
    pub(crate) unsafe fn deallocate<A>(&mut self, allocator: &A)
    where
        A: Allocator,
    {
        if self.handles.is_empty() {
            return;
        }

        let handles = core::mem::replace(&mut self.handles, Self::new().handles);

        //  Safety:
        //  -   All handles are initialized, and were allocated by `allocator`, as per Selfness pre-condition.
        //  -   `handles` was allocated by `allocator`, and is non-empty.
        unsafe {
            Self::release(allocator, handles, 0..handles.len());
            Self::deallocate_handles(allocator, handles);
        }
    }
}

//
//  Implementation.
//

impl<T, const N: usize> ChunkTable<T, N> {
    fn layout(n: usize) -> Result<Layout, DequeError> {
        debug_assert!(n > 0);

        Layout::array::<RawChunk<T, N>>(n).map_err(|_| DequeError::CapacityOverflow)
    }

    //  Allocates a block of `n` uninitialized handles.
    fn allocate_handles<A>(allocator: &A, n: usize) -> Result<NonNull<[RawChunk<T, N>]>, DequeError>
    where
        A: Allocator,
    {
        let layout = Self::layout(n)?;

        let ptr = allocator
            .allocate(layout)
            .map_err(|_| DequeError::AllocFailed { layout })?;

        Ok(NonNull::slice_from_raw_parts(ptr.cast(), n))
    }

    //  #   Safety
    //
    //  -   Liveness: `handles` is currently allocated, and non-empty.
    //  -   Selfness: `handles` was allocated by `Self::allocate_handles(allocator, ...)`.
    unsafe fn deallocate_handles<A>(allocator: &A, handles: NonNull<[RawChunk<T, N>]>)
    where
        A: Allocator,
    {
        let layout = Self::layout(handles.len());

        #[cfg(debug_assertions)]
        let layout = layout.expect("valid layout");

        //  Safety:
        //  -   Valid since `handles` was allocated by `Self::allocate_handles` as per the Selfness pre-condition,
        //      which cannot succeed without `Self::layout`, a pure function, succeeding.
        #[cfg(not(debug_assertions))]
        let layout = unsafe { layout.unwrap_unchecked() };

        //  Safety:
        //  -   `handles` is currently allocated, as per Liveness pre-condition.
        //  -   `layout` is the same as used for allocation, as per Selfness pre-condition.
        unsafe { allocator.deallocate(handles.cast(), layout) }
    }

    //  Allocates a fresh chunk for each handle in `range`.
    //
    //  On error, the chunks allocated so far are released, and `range` is left uninitialized.
    //
    //  #   Safety
    //
    //  -   In Bounds: `range` is within `handles`.
    //  -   Liveness: `handles` is currently allocated.
    //  -   Uninitialized: the handles within `range` are uninitialized.
    unsafe fn fill<A>(allocator: &A, handles: NonNull<[RawChunk<T, N>]>, range: Range<usize>) -> Result<(), DequeError>
    where
        A: Allocator,
    {
        debug_assert!(range.end <= handles.len());

        let base = handles.cast::<RawChunk<T, N>>();

        for index in range.clone() {
            match RawChunk::allocate(allocator) {
                //  Safety:
                //  -   `index` is in bounds, as per In Bounds pre-condition.
                Ok(chunk) => unsafe { base.add(index).write(chunk) },
                Err(error) => {
                    //  Safety:
                    //  -   `range.start..index` were just filled by `allocator`.
                    unsafe { Self::release(allocator, handles, range.start..index) };

                    return Err(error);
                }
            }
        }

        Ok(())
    }

    //  Releases the chunks of each handle in `range`.
    //
    //  #   Safety
    //
    //  -   In Bounds: `range` is within `handles`.
    //  -   Selfness: the handles within `range` are initialized, and their chunks allocated by `allocator`.
    //  -   Unicity: the chunks are not referenced anywhere else.
    unsafe fn release<A>(allocator: &A, handles: NonNull<[RawChunk<T, N>]>, range: Range<usize>)
    where
        A: Allocator,
    {
        debug_assert!(range.end <= handles.len());

        let base = handles.cast::<RawChunk<T, N>>();

        for index in range {
            //  Safety:
            //  -   `index` is in bounds, and initialized, as per pre-conditions.
            //  -   The chunk was allocated by `allocator`, and is released once, as per pre-conditions.
            unsafe { base.add(index).read().deallocate(allocator) };
        }
    }
}

// mod tests
