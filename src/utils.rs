//! Low-level building blocks of the chunked storage.
//!
//! The `alloc` module is public, so that users of the `allocator_api` feature and users of the stable shim alike can
//! name the allocator of a `ChunkDeque`.

mod chunk;
mod chunk_table;
mod error;

#[cfg(test)]
pub(crate) mod testing;

pub mod alloc;

pub use error::DequeError;

pub(crate) use chunk::{RawChunk, SlotPosition};
pub(crate) use chunk_table::ChunkTable;
