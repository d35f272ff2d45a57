//  Errors.

use core::{alloc::Layout, error, fmt};

/// An error in accessing, or growing, a `ChunkDeque`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DequeError {
    /// The index is not strictly less than the length.
    OutOfRange {
        /// The index which was requested.
        index: usize,
        /// The length of the deque at the time of the request.
        len: usize,
    },
    /// The number of chunks, or the size of a block, overflows the address space.
    CapacityOverflow,
    /// The allocator could not provide a block of `layout`.
    AllocFailed {
        /// The layout of the block which could not be allocated.
        layout: Layout,
    },
}

impl DequeError {
    //  Diverges, in the manner of the standard collections.
    //
    //  Allocation failures are routed to `handle_alloc_error`, all other errors panic.
    #[cold]
    #[track_caller]
    pub(crate) fn handle(self) -> ! {
        match self {
            Self::AllocFailed { layout } => alloc::alloc::handle_alloc_error(layout),
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::OutOfRange { index, len } => panic!("index out of range: the len is {len} but the index is {index}"),
        }
    }
}

impl fmt::Display for DequeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::OutOfRange { index, len } => write!(f, "index {index} out of range for deque of length {len}"),
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::AllocFailed { layout } => write!(
                f,
                "failed to allocate {} bytes aligned on {}",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl error::Error for DequeError {}

// mod tests
