//! The chunked double-ended queue, and its cursor and iterators.

//  Design considerations
//
//  #   Why a const generic chunk capacity?
//
//  The capacity of a chunk is a trade-off between the cost of growth, and the memory wasted in the partially filled
//  chunks at either end. It is fixed for the lifetime of the deque, and known at compile time, so that the arithmetic
//  translating an index into a chunk and an offset compiles down to shifts and masks for powers of two.
//
//  #   Why cursors _and_ iterators?
//
//  Iterators are the idiomatic way to traverse a collection, front to back or back to front. Cursors offer the random
//  access arithmetic that iterators lack: offsetting, distance, and ordering.

mod chunk_deque;
mod cursor;
mod iter;

#[cfg(feature = "serde")]
mod serde_impl;

pub use chunk_deque::{ChunkDeque, DEFAULT_CHUNK_CAP};
pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, IterMut};
