//! Allocator abstraction of the chunk storage.
//!
//! -   By default, a stable trait covering only what the chunk storage needs, implemented by `Global`.
//! -   With `allocator_api`, the unstable `Allocator` API of the standard library, as is.
//!
//! Either way, `ChunkDeque<T, N, A>` only ever calls `allocate` and `deallocate`.

#[cfg(feature = "allocator_api")]
pub use alloc::alloc::{AllocError, Allocator, Global};

#[cfg(not(feature = "allocator_api"))]
pub use shim::{AllocError, Allocator, Global};

#[cfg(not(feature = "allocator_api"))]
pub(super) mod shim {
    use core::{
        alloc::Layout,
        error, fmt,
        ptr::{self, NonNull},
    };

    use alloc::alloc;

    /// The allocator could not provide the requested block.
    #[derive(Copy, Clone, PartialEq, Eq, Debug)]
    pub struct AllocError;

    impl fmt::Display for AllocError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
            f.write_str("memory allocation failed")
        }
    }

    impl error::Error for AllocError {}

    /// Source of the blocks backing the chunks, and the chunk table.
    ///
    /// Blocks are allocated once, and released once: they are never resized in place.
    ///
    /// #   Safety
    ///
    /// -   Liveness: a block must remain valid until it is deallocated, or until the allocator and all its clones are
    ///     dropped.
    /// -   Independence: moving the allocator must not invalidate the blocks it handed out.
    /// -   Shallowness: a clone of the allocator must be able to deallocate the blocks of the original, and vice versa.
    pub unsafe trait Allocator {
        /// Attempts to allocate a block fitting `layout`.
        ///
        /// A zero-sized `layout` may be served by a dangling, suitably aligned, pointer.
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError>;

        /// Releases the block at `ptr`.
        ///
        /// #   Safety
        ///
        /// -   Liveness: `ptr` must not have been deallocated yet.
        /// -   Selfness: `ptr` must have been allocated by `self`, or one of its clones.
        /// -   Layout: `layout` must be the layout `ptr` was allocated with.
        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
    }

    //  Safety:
    //  -   Liveness, Independence, Shallowness: forwarded to `A`, and a reference is trivially independent.
    unsafe impl<A> Allocator for &A
    where
        A: Allocator + ?Sized,
    {
        #[inline]
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
            (**self).allocate(layout)
        }

        #[inline]
        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            //  Safety:
            //  -   Forward pre-conditions.
            unsafe { (**self).deallocate(ptr, layout) }
        }
    }

    /// The global memory allocator, as registered with `#[global_allocator]`.
    #[derive(Copy, Clone, Default, Debug)]
    pub struct Global;

    //  Safety:
    //  -   Liveness, Independence, Shallowness: `Global` is stateless, and defers to the global allocator.
    unsafe impl Allocator for Global {
        #[inline]
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
            if layout.size() == 0 {
                //  `Layout::dangling` is not stable yet.
                let dangling = NonNull::new(ptr::without_provenance_mut::<u8>(layout.align())).ok_or(AllocError)?;

                return Ok(NonNull::slice_from_raw_parts(dangling, 0));
            }

            //  Safety:
            //  -   `layout` has a non-zero size.
            let raw = unsafe { alloc::alloc(layout) };

            let ptr = NonNull::new(raw).ok_or(AllocError)?;

            Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
        }

        #[inline]
        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            if layout.size() == 0 {
                return;
            }

            //  Safety:
            //  -   `ptr` is live, was allocated by `alloc::alloc` with `layout`, as per pre-conditions.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn global_round_trip() {
            let layout = Layout::new::<[u64; 4]>();

            let block = Global.allocate(layout).expect("allocation");

            assert_eq!(32, block.len());
            assert_eq!(0, block.cast::<u8>().as_ptr() as usize % layout.align());

            //  Safety:
            //  -   `block` was just allocated by `Global`, with `layout`.
            unsafe { <&Global as Allocator>::deallocate(&&Global, block.cast(), layout) };
        }

        #[test]
        fn global_zero_sized() {
            let layout = Layout::new::<[u64; 0]>();

            let block = Global.allocate(layout).expect("allocation");

            assert_eq!(0, block.len());
            assert_eq!(0, block.cast::<u8>().as_ptr() as usize % layout.align());

            //  Safety:
            //  -   `block` was just allocated by `Global`, with `layout`.
            unsafe { Global.deallocate(block.cast(), layout) };
        }
    } // mod tests
} // mod shim
