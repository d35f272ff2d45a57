//! A random-access cursor over a `ChunkDeque`.
//!
//! A cursor is a logical position: it does not point into any chunk, and resolves its element on each access instead.
//! Its position is therefore unaffected by the growth of the deque.

use core::{
    cmp, fmt,
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Sub, SubAssign},
};

use crate::{
    collections::ChunkDeque,
    utils::alloc::{Allocator, Global},
};

/// A random-access cursor over a `ChunkDeque`.
///
/// Cursors of a same deque can be offset, compared, and subtracted from one another. Comparisons only consider the
/// position: comparing cursors of different deques is meaningless, though harmless.
///
/// #   Example
///
/// ```
/// use chunk_deque::ChunkDeque;
///
/// let deque: ChunkDeque<char> = ChunkDeque::from(['a', 'b', 'c', 'd']);
///
/// let mut cursor = deque.begin();
///
/// assert_eq!(Some(&'a'), cursor.get());
///
/// cursor += 2;
///
/// assert_eq!(Some(&'c'), cursor.get());
/// assert_eq!(2, cursor - deque.begin());
/// assert_eq!(4, deque.end() - deque.begin());
/// assert!(cursor < deque.end());
/// ```
pub struct Cursor<'a, T, const N: usize = 10, A = Global>
where
    A: Allocator,
{
    deque: &'a ChunkDeque<T, N, A>,
    index: isize,
}

impl<'a, T, const N: usize, A> Cursor<'a, T, N, A>
where
    A: Allocator,
{
    pub(crate) const fn new(deque: &'a ChunkDeque<T, N, A>, index: isize) -> Self {
        Self { deque, index }
    }

    /// Returns the position of the cursor.
    #[inline]
    pub const fn index(&self) -> isize {
        self.index
    }

    /// Returns the element under the cursor, if any.
    ///
    /// Unlike `ChunkDeque::get_signed`, negative positions do not wrap around: they are before the first element.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        let index = usize::try_from(self.index).ok()?;

        self.deque.get(index)
    }

    /// Moves the cursor to the next position.
    #[inline]
    pub fn move_next(&mut self) {
        self.index += 1;
    }

    /// Moves the cursor to the previous position.
    #[inline]
    pub fn move_prev(&mut self) {
        self.index -= 1;
    }
}

impl<T, const N: usize, A> Clone for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize, A> Copy for Cursor<'_, T, N, A> where A: Allocator {}

impl<T, const N: usize, A> fmt::Debug for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("Cursor").field(&self.index).finish()
    }
}

impl<T, const N: usize, A> Eq for Cursor<'_, T, N, A> where A: Allocator {}

impl<T, const N: usize, A> Hash for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.index.hash(state);
    }
}

impl<T, const N: usize, A> Ord for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T, const N: usize, A> PartialEq for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T, const N: usize, A> PartialOrd for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

//
//  Arithmetic
//

impl<T, const N: usize, A> Add<isize> for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    type Output = Self;

    fn add(mut self, offset: isize) -> Self {
        self += offset;
        self
    }
}

impl<T, const N: usize, A> AddAssign<isize> for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn add_assign(&mut self, offset: isize) {
        self.index += offset;
    }
}

impl<T, const N: usize, A> Sub<isize> for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    type Output = Self;

    fn sub(mut self, offset: isize) -> Self {
        self -= offset;
        self
    }
}

impl<T, const N: usize, A> SubAssign<isize> for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    fn sub_assign(&mut self, offset: isize) {
        self.index -= offset;
    }
}

impl<T, const N: usize, A> Sub for Cursor<'_, T, N, A>
where
    A: Allocator,
{
    type Output = isize;

    /// Returns the distance between two cursors.
    fn sub(self, other: Self) -> isize {
        self.index - other.index
    }
}

// mod tests
