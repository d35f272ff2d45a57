//! Chunked double-ended queue
//!
//! #   Organization
//!
//! This crate is composed of two top modules:
//!
//! -   The `collections` module contains the `ChunkDeque` itself, along with its cursor and iterators.
//! -   The `utils` module contains the error type, and the allocator abstraction.
//!
//!
//! #   Layout
//!
//! A `ChunkDeque<T, N>` stores its elements in chunks: blocks of raw storage holding exactly `N` elements each. A table
//! references the chunks in order, and the elements live in a window of consecutive slots, which may start and end
//! anywhere within the first and last chunks of the window.
//!
//! When the window reaches either end of the table, the table triples: the existing chunks move to its middle third,
//! leaving as many fresh chunks on either side. The chunks themselves never move, and neither do the elements.
//!
//!
//! #   Element lifetime
//!
//! Chunks are allocated uninitialized. A slot holds an element if, and only if, it lies within the window: elements are
//! moved in on push, and moved out on pop. Slots outside the window are never read, cloned, nor dropped.
//!
//!
//! #   Features
//!
//! -   `allocator_api`: use the unstable `Allocator` API of the standard library, rather than the built-in shim.
//! -   `serde`: implements `Serialize` and `Deserialize` for `ChunkDeque`.

#![cfg_attr(not(test), no_std)]
//  Features (language)
//  Features (library)
#![cfg_attr(feature = "allocator_api", feature(allocator_api))]
//  Lints
#![deny(missing_docs)]
//  This author prefers to keep its test modules close to what they are testing.
#![allow(clippy::items_after_test_module)]

extern crate alloc;

pub mod collections;
pub mod utils;

pub use collections::{ChunkDeque, Cursor, IntoIter, Iter, IterMut};
pub use utils::DequeError;
