//! A double-ended queue over fixed-size chunks.

use core::{
    cmp, fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
};

use crate::{
    collections::{Cursor, IntoIter, Iter, IterMut},
    utils::{
        ChunkTable, DequeError, SlotPosition,
        alloc::{Allocator, Global},
    },
};

/// The default number of elements per chunk.
pub const DEFAULT_CHUNK_CAP: usize = 10;

/// A double-ended queue, storing its elements in chunks of `N` elements.
///
/// `ChunkDeque` offers amortized O(1) insertion and removal at both ends, and O(1) indexing. Elements never move
/// between chunks: when room runs out at either end, the table of chunks triples, and the existing chunks are
/// relocated to its middle third, while their elements stay in place.
///
/// #   Example
///
/// ```
/// use chunk_deque::ChunkDeque;
///
/// let mut deque: ChunkDeque<i32> = ChunkDeque::new();
///
/// deque.push_back(2);
/// deque.push_back(3);
/// deque.push_front(1);
///
/// assert_eq!(3, deque.len());
/// assert_eq!(Some(&1), deque.front());
/// assert_eq!(Some(&3), deque.get_signed(-1));
///
/// assert_eq!(Some(1), deque.pop_front());
/// assert_eq!(Some(3), deque.pop_back());
/// ```
pub struct ChunkDeque<T, const N: usize = 10, A = Global>
where
    A: Allocator,
{
    //  Safety Invariants:
    //  -   Window: every slot in `[start, end)` is initialized, every other slot is uninitialized.
    //  -   Bounds: `start.offset < N`, `end.offset < N`, `start <= end`, and `end.chunk <= table.len()`.
    //  -   Length: `len == end.linear() - start.linear()`.
    //  -   Self-Allocated: `table` was allocated by `allocator`.
    table: ChunkTable<T, N>,
    start: SlotPosition,
    end: SlotPosition,
    len: usize,
    allocator: A,
    _marker: PhantomData<T>,
}

//
//  Creation
//

impl<T, const N: usize> ChunkDeque<T, N, Global> {
    /// Returns a new, empty, instance.
    ///
    /// No memory is allocated until the first element is pushed.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Returns a new instance containing `count` default elements.
    ///
    /// Allocates `count / N + 1` chunks, the last of which is partially filled.
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        Self::try_with_len_in(count, Global).unwrap_or_else(|error| error.handle())
    }

    /// Returns a new instance containing `count` clones of `value`.
    ///
    /// If a call to `clone` panics, all elements cloned so far are dropped, and all memory is released, before the
    /// panic resumes.
    pub fn from_elem(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::try_from_elem_in(count, value, Global).unwrap_or_else(|error| error.handle())
    }

    /// Returns a new instance containing the `count` elements produced by `f(0)`, ..., `f(count - 1)`.
    ///
    /// If `f` returns an error, all elements produced so far are dropped, all memory is released, and the error is
    /// returned as is.
    pub fn try_from_fn<E, F>(count: usize, f: F) -> Result<Self, E>
    where
        E: From<DequeError>,
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_from_fn_in(count, f, Global)
    }
}

impl<T, const N: usize, A> ChunkDeque<T, N, A>
where
    A: Allocator,
{
    /// Returns a new, empty, instance.
    ///
    /// No memory is allocated until the first element is pushed.
    pub const fn new_in(allocator: A) -> Self {
        //  Safety Invariants:
        //  -   Window: the window is empty, and so is the table.
        Self {
            table: ChunkTable::new(),
            start: SlotPosition::ORIGIN,
            end: SlotPosition::ORIGIN,
            len: 0,
            allocator,
            _marker: PhantomData,
        }
    }

    /// Returns a new instance containing `count` default elements.
    ///
    /// #   Errors
    ///
    /// Returns an error if memory cannot be allocated.
    pub fn try_with_len_in(count: usize, allocator: A) -> Result<Self, DequeError>
    where
        T: Default,
    {
        Self::try_from_fn_in(count, |_| Ok(T::default()), allocator)
    }

    /// Returns a new instance containing `count` clones of `value`.
    ///
    /// #   Errors
    ///
    /// Returns an error if memory cannot be allocated.
    pub fn try_from_elem_in(count: usize, value: T, allocator: A) -> Result<Self, DequeError>
    where
        T: Clone,
    {
        Self::try_from_fn_in(count, |_| Ok(value.clone()), allocator)
    }

    /// Returns a new instance containing the `count` elements produced by `f(0)`, ..., `f(count - 1)`.
    ///
    /// The elements are laid out from the first slot of the first chunk, over `count / N + 1` chunks.
    ///
    /// #   Errors
    ///
    /// Returns the first error of `f`, or an error if memory cannot be allocated. Either way, all elements produced
    /// so far are dropped, and all memory is released.
    pub fn try_from_fn_in<E, F>(count: usize, mut f: F, allocator: A) -> Result<Self, E>
    where
        E: From<DequeError>,
        F: FnMut(usize) -> Result<T, E>,
    {
        let chunks = (count / N).checked_add(1).ok_or(DequeError::CapacityOverflow)?;

        let table = ChunkTable::allocate(&allocator, chunks)?;

        let mut partial = PartialWindow::new(table, SlotPosition::ORIGIN, &allocator);

        for index in 0..count {
            partial.push(f(index)?);
        }

        let table = partial.finish();

        //  Safety Invariants:
        //  -   Window: `PartialWindow` initialized exactly `[ORIGIN, ORIGIN + count)`.
        //  -   Bounds: `count / N` is strictly less than `chunks`.
        Ok(Self {
            table,
            start: SlotPosition::ORIGIN,
            end: SlotPosition::ORIGIN.advance::<N>(count),
            len: count,
            allocator,
            _marker: PhantomData,
        })
    }
}

//
//  Queries
//

impl<T, const N: usize, A> ChunkDeque<T, N, A>
where
    A: Allocator,
{
    /// The number of elements per chunk.
    pub const CHUNK_CAP: usize = N;

    /// Returns the number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns whether there are no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of chunks currently allocated.
    ///
    /// The number of chunks never decreases, not even on `clear`.
    #[inline]
    pub const fn chunk_count(&self) -> usize {
        self.table.len()
    }

    /// Returns the total number of slots across all allocated chunks.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.table.len() * N
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }
}

//
//  Access
//

impl<T, const N: usize, A> ChunkDeque<T, N, A>
where
    A: Allocator,
{
    /// Returns a reference to the element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        //  Safety:
        //  -   `index` is in bounds.
        (index < self.len).then(|| unsafe { self.get_unchecked(index) })
    }

    /// Returns a mutable reference to the element at `index`, if any.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        //  Safety:
        //  -   `index` is in bounds.
        (index < self.len).then(|| unsafe { self.get_unchecked_mut(index) })
    }

    /// Returns a reference to the element at `index`, if any.
    ///
    /// A negative `index` counts from the back: `-1` is the last element, `-len` the first.
    #[inline]
    pub fn get_signed(&self, index: isize) -> Option<&T> {
        self.get(self.unsign(index)?)
    }

    /// Returns a mutable reference to the element at `index`, if any.
    ///
    /// A negative `index` counts from the back: `-1` is the last element, `-len` the first.
    #[inline]
    pub fn get_signed_mut(&mut self, index: isize) -> Option<&mut T> {
        self.get_mut(self.unsign(index)?)
    }

    /// Returns a reference to the element at `index`, without bounds checking.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `index` must be strictly less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        //  Safety:
        //  -   In Bounds: as per pre-condition.
        let slot = unsafe { self.slot(index) };

        //  Safety:
        //  -   `slot` is initialized, as per Window Invariant, and no mutable borrow exists, as `self` is borrowed.
        unsafe { slot.as_ref() }
    }

    /// Returns a mutable reference to the element at `index`, without bounds checking.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `index` must be strictly less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        //  Safety:
        //  -   In Bounds: as per pre-condition.
        let mut slot = unsafe { self.slot(index) };

        //  Safety:
        //  -   `slot` is initialized, as per Window Invariant, and no other borrow exists, as `self` is mutably
        //      borrowed.
        unsafe { slot.as_mut() }
    }

    /// Returns a reference to the element at `index`.
    ///
    /// #   Errors
    ///
    /// Returns `DequeError::OutOfRange` if `index` is not strictly less than `self.len()`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, DequeError> {
        let len = self.len;

        self.get(index).ok_or(DequeError::OutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// #   Errors
    ///
    /// Returns `DequeError::OutOfRange` if `index` is not strictly less than `self.len()`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DequeError> {
        let len = self.len;

        self.get_mut(index).ok_or(DequeError::OutOfRange { index, len })
    }

    /// Returns a reference to the first element, if any.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a mutable reference to the first element, if any.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns a reference to the last element, if any.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    /// Returns a mutable reference to the last element, if any.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.checked_sub(1)?)
    }

    /// Swaps the elements at `i` and `j`.
    ///
    /// #   Panics
    ///
    /// If either `i` or `j` is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        let len = self.len;

        for index in [i, j] {
            if index >= len {
                DequeError::OutOfRange { index, len }.handle();
            }
        }

        //  Safety:
        //  -   Both `i` and `j` are in bounds.
        unsafe { self.swap_unchecked(i, j) }
    }
}

//
//  Iteration
//

impl<T, const N: usize, A> ChunkDeque<T, N, A>
where
    A: Allocator,
{
    /// Returns a cursor on the first element.
    ///
    /// The cursor is equal to `self.end()` if the deque is empty.
    #[doc(alias = "cbegin")]
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, 0)
    }

    /// Returns a cursor one past the last element.
    ///
    /// #   Panics
    ///
    /// If the deque holds more than `isize::MAX` elements, which only zero-sized elements allow.
    #[doc(alias = "cend")]
    #[inline]
    #[track_caller]
    pub fn end(&self) -> Cursor<'_, T, N, A> {
        let index = isize::try_from(self.len).unwrap_or_else(|_| DequeError::CapacityOverflow.handle());

        Cursor::new(self, index)
    }

    /// Returns a cursor at `index`, which may be anywhere, including outside the deque.
    #[inline]
    pub fn cursor_at(&self, index: isize) -> Cursor<'_, T, N, A> {
        Cursor::new(self, index)
    }

    /// Returns an iterator over the elements, front to back.
    ///
    /// Use `iter().rev()` to iterate back to front.
    #[doc(alias("rbegin", "rend", "crbegin", "crend"))]
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N, A> {
        Iter::new(self)
    }

    /// Returns an iterator over mutable references to the elements, front to back.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N, A> {
        IterMut::new(self)
    }
}

//
//  Mutation
//

impl<T, const N: usize, A> ChunkDeque<T, N, A>
where
    A: Allocator,
{
    /// Appends an element at the back.
    ///
    /// #   Panics
    ///
    /// If the chunk table overflows, or aborts if memory cannot be allocated.
    pub fn push_back(&mut self, value: T) {
        if let Err(error) = self.try_push_back(value) {
            error.handle();
        }
    }

    /// Appends an element at the back.
    ///
    /// #   Errors
    ///
    /// Returns an error if memory cannot be allocated, in which case `self` is left unchanged, and `value` dropped.
    pub fn try_push_back(&mut self, value: T) -> Result<(), DequeError> {
        if self.end.chunk == self.table.len() {
            self.grow()?;
        }

        //  Safety:
        //  -   `end.chunk` is in bounds, since the table was grown as needed.
        let chunk = unsafe { self.table.chunk_unchecked(self.end.chunk) };

        //  Safety:
        //  -   `end.offset` is in bounds, as per Bounds Invariant.
        //  -   The slot at `end` is uninitialized, as per Window Invariant.
        unsafe { chunk.write(self.end.offset, value) };

        self.end = self.end.next::<N>();
        self.len += 1;

        self.debug_check_window();

        Ok(())
    }

    /// Prepends an element at the front.
    ///
    /// #   Panics
    ///
    /// If the chunk table overflows, or aborts if memory cannot be allocated.
    pub fn push_front(&mut self, value: T) {
        if let Err(error) = self.try_push_front(value) {
            error.handle();
        }
    }

    /// Prepends an element at the front.
    ///
    /// #   Errors
    ///
    /// Returns an error if memory cannot be allocated, in which case `self` is left unchanged, and `value` dropped.
    pub fn try_push_front(&mut self, value: T) -> Result<(), DequeError> {
        if self.start.is_origin() {
            self.grow_front()?;
        }

        self.start = self.start.prev::<N>();

        //  Safety:
        //  -   `start.chunk` is in bounds, as `start <= end` and `start` just moved backward.
        let chunk = unsafe { self.table.chunk_unchecked(self.start.chunk) };

        //  Safety:
        //  -   `start.offset` is in bounds, as per Bounds Invariant.
        //  -   The slot at `start` is uninitialized, as it was just outside the window.
        unsafe { chunk.write(self.start.offset, value) };

        self.len += 1;

        self.debug_check_window();

        Ok(())
    }

    /// Removes the last element, and returns it, if any.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.end = self.end.prev::<N>();
        self.len -= 1;

        //  Safety:
        //  -   `end.chunk` is in bounds, as `start <= end`.
        let chunk = unsafe { self.table.chunk_unchecked(self.end.chunk) };

        //  Safety:
        //  -   `end.offset` is in bounds, as per Bounds Invariant.
        //  -   The slot at `end` is initialized, as it was the last slot of the window, and is now outside of it.
        let value = unsafe { chunk.read(self.end.offset) };

        self.debug_check_window();

        Some(value)
    }

    /// Removes the first element, and returns it, if any.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        //  Safety:
        //  -   `start.chunk` is in bounds, as the window is not empty.
        let chunk = unsafe { self.table.chunk_unchecked(self.start.chunk) };

        //  Safety:
        //  -   `start.offset` is in bounds, as per Bounds Invariant.
        //  -   The slot at `start` is initialized, as the window is not empty.
        let value = unsafe { chunk.read(self.start.offset) };

        self.start = self.start.next::<N>();
        self.len -= 1;

        self.debug_check_window();

        Some(value)
    }

    /// Inserts `value` at `position`, shifting all elements after it toward the back.
    ///
    /// The element is pushed at the back, then swapped toward the front one slot at a time: this is O(n).
    ///
    /// #   Panics
    ///
    /// If `position > self.len()`, if the chunk table overflows, or aborts if memory cannot be allocated.
    pub fn insert(&mut self, position: usize, value: T) {
        if let Err(error) = self.try_insert(position, value) {
            error.handle();
        }
    }

    /// Inserts `value` at `position`, shifting all elements after it toward the back.
    ///
    /// #   Errors
    ///
    /// Returns an error if `position > self.len()`, or if memory cannot be allocated, in which case `self` is left
    /// unchanged, and `value` dropped.
    pub fn try_insert(&mut self, position: usize, value: T) -> Result<(), DequeError> {
        if position > self.len {
            return Err(DequeError::OutOfRange {
                index: position,
                len: self.len,
            });
        }

        self.try_push_back(value)?;

        for index in (position + 1..self.len).rev() {
            //  Safety:
            //  -   `index - 1 < index < self.len`.
            unsafe { self.swap_unchecked(index, index - 1) };
        }

        Ok(())
    }

    /// Removes the element at `position`, shifting all elements after it toward the front, and returns it, if any.
    ///
    /// The element is swapped toward the back one slot at a time, then popped: this is O(n).
    pub fn erase(&mut self, position: usize) -> Option<T> {
        if position >= self.len {
            return None;
        }

        for index in position..self.len - 1 {
            //  Safety:
            //  -   `index < index + 1 < self.len`.
            unsafe { self.swap_unchecked(index, index + 1) };
        }

        self.pop_back()
    }

    /// Removes all elements.
    ///
    /// The chunks remain allocated.
    pub fn clear(&mut self) {
        while self.pop_back().is_some() {}
    }
}

//
//  Common traits
//

impl<T, const N: usize, A> Clone for ChunkDeque<T, N, A>
where
    T: Clone,
    A: Allocator + Clone,
{
    /// Returns a deep copy: a table of the same length, with fresh chunks, and every element cloned at the same
    /// position.
    fn clone(&self) -> Self {
        let allocator = self.allocator.clone();

        let table = ChunkTable::allocate(&allocator, self.table.len()).unwrap_or_else(|error| error.handle());

        let mut partial = PartialWindow::new(table, self.start, &allocator);

        for element in self {
            partial.push(element.clone());
        }

        let table = partial.finish();

        //  Safety Invariants:
        //  -   Window: `PartialWindow` initialized exactly `[start, start + len)`, that is `[start, end)`.
        //  -   Bounds: the table has the same length as `self.table`.
        Self {
            table,
            start: self.start,
            end: self.end,
            len: self.len,
            allocator,
            _marker: PhantomData,
        }
    }

    /// Replaces `self` with a deep copy of `source`.
    ///
    /// The copy is complete before `self` is touched: if cloning panics, `self` is unchanged.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();

        mem::swap(self, &mut copy);
    }
}

impl<T, const N: usize, A> Drop for ChunkDeque<T, N, A>
where
    A: Allocator,
{
    fn drop(&mut self) {
        //  Finishes the job if an element panics on drop.
        let release = ReleaseOnDrop(self);

        if mem::needs_drop::<T>() {
            release.0.clear();
        }
    }
}

impl<T, const N: usize, A> fmt::Debug for ChunkDeque<T, N, A>
where
    T: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_list().entries(self).finish()
    }
}

impl<T, const N: usize, A> Default for ChunkDeque<T, N, A>
where
    A: Allocator + Default,
{
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, const N: usize, A> Eq for ChunkDeque<T, N, A>
where
    T: Eq,
    A: Allocator,
{
}

impl<T, const N: usize, A> Hash for ChunkDeque<T, N, A>
where
    T: Hash,
    A: Allocator,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.len.hash(state);

        self.iter().for_each(|element| element.hash(state));
    }
}

impl<T, const N: usize, A> Ord for ChunkDeque<T, N, A>
where
    T: Ord,
    A: Allocator,
{
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, const N: usize, A> PartialEq for ChunkDeque<T, N, A>
where
    T: PartialEq,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T, const N: usize, A> PartialOrd for ChunkDeque<T, N, A>
where
    T: PartialOrd,
    A: Allocator,
{
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T, const N: usize, A> Index<usize> for ChunkDeque<T, N, A>
where
    A: Allocator,
{
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        let len = self.len;

        match self.get(index) {
            Some(element) => element,
            None => DequeError::OutOfRange { index, len }.handle(),
        }
    }
}

impl<T, const N: usize, A> IndexMut<usize> for ChunkDeque<T, N, A>
where
    A: Allocator,
{
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;

        match self.get_mut(index) {
            Some(element) => element,
            None => DequeError::OutOfRange { index, len }.handle(),
        }
    }
}

impl<T, const N: usize, A> Extend<T> for ChunkDeque<T, N, A>
where
    A: Allocator,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().for_each(|element| self.push_back(element));
    }
}

impl<'a, T, const N: usize, A> Extend<&'a T> for ChunkDeque<T, N, A>
where
    T: Copy + 'a,
    A: Allocator,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        iter.into_iter().for_each(|element| self.push_back(*element));
    }
}

impl<T, const N: usize> FromIterator<T> for ChunkDeque<T, N, Global> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize, const M: usize> From<[T; M]> for ChunkDeque<T, N, Global> {
    fn from(array: [T; M]) -> Self {
        array.into_iter().collect()
    }
}

impl<T, const N: usize, A> IntoIterator for ChunkDeque<T, N, A>
where
    A: Allocator,
{
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, const N: usize, A> IntoIterator for &'a ChunkDeque<T, N, A>
where
    A: Allocator,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize, A> IntoIterator for &'a mut ChunkDeque<T, N, A>
where
    A: Allocator,
{
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

//  Safety:
//  -   Just like a `Vec<T, A>`.
unsafe impl<T, const N: usize, A> Send for ChunkDeque<T, N, A>
where
    T: Send,
    A: Allocator + Send,
{
}

unsafe impl<T, const N: usize, A> Sync for ChunkDeque<T, N, A>
where
    T: Sync,
    A: Allocator + Sync,
{
}

//
//  Implementation
//

impl<T, const N: usize, A> ChunkDeque<T, N, A>
where
    A: Allocator,
{
    /// Returns a pointer to the slot of the element at `index`.
    ///
    /// #   Safety
    ///
    /// -   In Bounds: `index` must be strictly less than `self.len()`.
    #[inline(always)]
    pub(crate) unsafe fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index < self.len, "{} >= {}", index, self.len);

        let position = self.start.advance::<N>(index);

        //  Safety:
        //  -   `position.chunk` is in bounds, as `position` is within the window, as per In Bounds pre-condition.
        let chunk = unsafe { self.table.chunk_unchecked(position.chunk) };

        //  Safety:
        //  -   `position.offset` is strictly less than `N`, by construction.
        unsafe { chunk.slot(position.offset) }
    }

    //  #   Safety
    //
    //  -   In Bounds: `i` and `j` must be strictly less than `self.len()`.
    #[inline]
    unsafe fn swap_unchecked(&mut self, i: usize, j: usize) {
        //  Safety:
        //  -   In Bounds: as per pre-condition.
        let (i, j) = unsafe { (self.slot(i), self.slot(j)) };

        //  Safety:
        //  -   Both slots are initialized, as per Window Invariant, and `ptr::swap` allows them to overlap.
        unsafe { ptr::swap(i.as_ptr(), j.as_ptr()) }
    }

    //  Grows the table, shifting the window along.
    fn grow(&mut self) -> Result<(), DequeError> {
        //  Safety:
        //  -   Selfness: as per Self-Allocated Invariant.
        let shift = unsafe { self.table.grow(&self.allocator)? };

        self.start.chunk += shift;
        self.end.chunk += shift;

        Ok(())
    }

    //  Grows the table so that there is room before `start`, which must be the origin.
    //
    //  An empty table directly gets 3 chunks, the window sitting at the start of the middle one: the same layout as
    //  growing twice, without the intermediate state to roll back on failure.
    fn grow_front(&mut self) -> Result<(), DequeError> {
        debug_assert!(self.start.is_origin());

        if self.table.len() > 0 {
            return self.grow();
        }

        debug_assert!(self.is_empty());

        //  Safety Invariants:
        //  -   Window: the window is empty, wherever it sits.
        //  -   Self-Allocated: the new table is allocated by `self.allocator`, the old one was empty.
        self.table = ChunkTable::allocate(&self.allocator, 3)?;
        self.start = SlotPosition::new(1, 0);
        self.end = self.start;

        Ok(())
    }

    //  Converts a possibly negative `index` into an index from the front.
    fn unsign(&self, index: isize) -> Option<usize> {
        if index < 0 {
            self.len.checked_add_signed(index)
        } else {
            Some(index as usize)
        }
    }

    #[inline(always)]
    fn debug_check_window(&self) {
        debug_assert!(self.start.offset < N, "{:?}", self.start);
        debug_assert!(self.end.offset < N, "{:?}", self.end);
        debug_assert!(self.end.chunk <= self.table.len(), "{:?} > {}", self.end, self.table.len());
        debug_assert_eq!(self.len, self.end.linear::<N>() - self.start.linear::<N>());
    }
}

//  Drops the remaining elements, then releases the table, of a deque being dropped.
struct ReleaseOnDrop<'a, T, const N: usize, A>(&'a mut ChunkDeque<T, N, A>)
where
    A: Allocator;

impl<T, const N: usize, A> Drop for ReleaseOnDrop<'_, T, N, A>
where
    A: Allocator,
{
    fn drop(&mut self) {
        //  Each element leaves the window before being dropped: a panicking one is never dropped twice.
        if mem::needs_drop::<T>() {
            self.0.clear();
        }

        //  Safety:
        //  -   Selfness: as per Self-Allocated Invariant.
        unsafe { self.0.table.deallocate(&self.0.allocator) };
    }
}

//  Guards a window under construction.
//
//  On drop, drops all elements pushed so far, then releases the table. On `finish`, hands over the table.
struct PartialWindow<'a, T, const N: usize, A>
where
    A: Allocator,
{
    //  Safety Invariants:
    //  -   Self-Allocated: `table` was allocated by `allocator`.
    //  -   Window: every slot in `[start, start + len)` is initialized, every other slot is uninitialized.
    table: ChunkTable<T, N>,
    start: SlotPosition,
    len: usize,
    allocator: &'a A,
}

impl<'a, T, const N: usize, A> PartialWindow<'a, T, N, A>
where
    A: Allocator,
{
    fn new(table: ChunkTable<T, N>, start: SlotPosition, allocator: &'a A) -> Self {
        Self {
            table,
            start,
            len: 0,
            allocator,
        }
    }

    //  Writes `value` in the slot following the window.
    //
    //  #   Panics
    //
    //  If the table has no room for `value`.
    fn push(&mut self, value: T) {
        let position = self.start.advance::<N>(self.len);

        assert!(position.chunk < self.table.len(), "no room for {position:?}");

        //  Safety:
        //  -   `position.chunk` is in bounds, as just checked.
        //  -   `position.offset` is in bounds, by construction.
        //  -   The slot is uninitialized, as per Window Invariant.
        unsafe { self.table.chunk_unchecked(position.chunk).write(position.offset, value) };

        self.len += 1;
    }

    //  Hands over the table, whose window is now initialized.
    fn finish(mut self) -> ChunkTable<T, N> {
        self.len = 0;

        mem::replace(&mut self.table, ChunkTable::new())
    }
}

impl<T, const N: usize, A> Drop for PartialWindow<'_, T, N, A>
where
    A: Allocator,
{
    fn drop(&mut self) {
        for index in 0..self.len {
            let position = self.start.advance::<N>(index);

            //  Safety:
            //  -   The slot is within the window, hence in bounds and initialized, and is dropped once.
            unsafe {
                let slot = self.table.chunk_unchecked(position.chunk).slot(position.offset);

                ptr::drop_in_place(slot.as_ptr());
            }
        }

        //  Safety:
        //  -   Selfness: as per Self-Allocated Invariant.
        unsafe { self.table.deallocate(self.allocator) };
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        panic::{self, AssertUnwindSafe},
        rc::Rc,
    };

    use crate::utils::testing::CountingAllocator;

    use super::*;

    type Deque = ChunkDeque<u32, 10>;

    #[test]
    fn default_chunk_cap() {
        assert_eq!(DEFAULT_CHUNK_CAP, ChunkDeque::<u8>::CHUNK_CAP);
        assert_eq!(4, ChunkDeque::<u8, 4>::CHUNK_CAP);
    }

    #[test]
    fn empty() {
        let mut deque = Deque::new();

        assert_eq!(None, deque.pop_back());
        assert_eq!(None, deque.pop_front());

        assert_eq!(0, deque.len());
        assert_eq!(0, deque.chunk_count());
        assert_eq!(None, deque.front());
        assert_eq!(None, deque.back());
    }

    #[test]
    fn with_len_layout() {
        let mut deque = Deque::with_len(25);

        assert_eq!(25, deque.len());
        assert_eq!(3, deque.chunk_count());
        assert_window(&deque, (0, 0), (2, 5));
        assert!(deque.iter().all(|element| *element == 0));

        for (index, element) in deque.iter_mut().enumerate() {
            *element = index as u32;
        }

        for i in 25..30 {
            deque.push_back(i);
        }

        assert_eq!(30, deque.len());
        assert_eq!(3, deque.chunk_count());
        assert_window(&deque, (0, 0), (3, 0));

        deque.push_back(30);

        assert_eq!(31, deque.len());
        assert_eq!(9, deque.chunk_count());
        assert_window(&deque, (3, 0), (6, 1));
        assert_elements(&deque, 0..31);
    }

    #[test]
    fn with_len_zero() {
        let deque = Deque::with_len(0);

        assert!(deque.is_empty());
        assert_eq!(1, deque.chunk_count());
        assert_window(&deque, (0, 0), (0, 0));
    }

    #[test]
    fn push_back_from_empty() {
        let mut deque = Deque::new();

        deque.push_back(1);

        assert_eq!(1, deque.chunk_count());
        assert_window(&deque, (0, 0), (0, 1));
    }

    #[test]
    fn push_front_from_empty() {
        let mut deque = Deque::new();

        deque.push_front(1);

        assert_eq!(3, deque.chunk_count());
        assert_window(&deque, (0, 9), (1, 0));
        assert_eq!(Some(&1), deque.front());
        assert_eq!(Some(&1), deque.back());
    }

    #[test]
    fn push_front_crosses_chunks() {
        let mut deque = Deque::new();

        deque.push_back(100);

        for i in 0..25 {
            deque.push_front(99 - i);
        }

        assert_eq!(26, deque.len());
        assert_eq!(9, deque.chunk_count());
        assert_elements(&deque, 75..101);
    }

    #[test]
    fn drained_then_refilled() {
        let mut deque = Deque::new();

        for i in 0..10 {
            deque.push_back(i);
        }

        for _ in 0..10 {
            deque.pop_front();
        }

        assert!(deque.is_empty());
        assert_window(&deque, (1, 0), (1, 0));

        deque.push_back(7);

        assert_eq!(3, deque.chunk_count());
        assert_eq!(Some(&7), deque.front());
        assert_window(&deque, (2, 0), (2, 1));
    }

    #[test]
    fn pop_back_crosses_chunks() {
        let mut deque: Deque = (0..23).collect();

        for expected in (0..23).rev() {
            assert_eq!(Some(expected), deque.pop_back());
        }

        assert_eq!(None, deque.pop_back());
        assert_eq!(9, deque.chunk_count());
        assert_window(&deque, (4, 0), (4, 0));
    }

    #[test]
    fn signed_indexing() {
        let deque: Deque = (0..12).collect();

        assert_eq!(Some(&0), deque.get_signed(0));
        assert_eq!(Some(&11), deque.get_signed(-1));
        assert_eq!(Some(&0), deque.get_signed(-12));
        assert_eq!(None, deque.get_signed(-13));
        assert_eq!(None, deque.get_signed(12));
    }

    #[test]
    fn checked_indexing() {
        let mut deque: Deque = (0..12).collect();

        assert_eq!(Ok(&11), deque.at(11));
        assert_eq!(Err(DequeError::OutOfRange { index: 12, len: 12 }), deque.at(12));

        *deque.at_mut(3).expect("in bounds") = 33;

        assert_eq!(33, deque[3]);
    }

    #[test]
    #[should_panic(expected = "index out of range: the len is 2 but the index is 2")]
    fn index_out_of_range() {
        let deque: Deque = (0..2).collect();

        let _ = deque[2];
    }

    #[test]
    fn swap() {
        let mut deque: Deque = (0..12).collect();

        deque.swap(0, 11);
        deque.swap(5, 5);

        assert_eq!(Some(&11), deque.front());
        assert_eq!(Some(&0), deque.back());
        assert_eq!(5, deque[5]);
    }

    #[test]
    fn insert_and_erase() {
        let mut deque: Deque = (0..15).collect();

        deque.insert(12, 100);

        assert_eq!(16, deque.len());
        assert_eq!(100, deque[12]);
        assert_eq!(12, deque[13]);

        assert_eq!(Some(100), deque.erase(12));
        assert_eq!(None, deque.erase(15));
        assert_elements(&deque, 0..15);
    }

    #[test]
    fn try_insert_out_of_range() {
        let mut deque: Deque = (0..3).collect();

        assert_eq!(Err(DequeError::OutOfRange { index: 4, len: 3 }), deque.try_insert(4, 9));
        assert_elements(&deque, 0..3);
    }

    #[test]
    fn clone_is_deep() {
        let mut original = Deque::new();

        for i in 0..12 {
            original.push_front(i);
        }

        let mut copy = original.clone();

        assert_eq!(original, copy);
        assert_eq!(original.chunk_count(), copy.chunk_count());
        assert_eq!((original.start, original.end), (copy.start, copy.end));

        copy.push_back(99);
        copy.pop_front();
        copy[0] = 42;

        assert_eq!(12, original.len());
        assert_elements(&original, (0..12).rev());
    }

    #[test]
    fn clone_from() {
        let source: Deque = (0..5).collect();
        let mut target: Deque = (10..40).collect();

        target.clone_from(&source);

        assert_eq!(source, target);
    }

    #[test]
    fn drops_exactly_once() {
        let drops = Rc::new(Cell::new(0));

        let mut deque = ChunkDeque::<Tracked, 4>::from_elem(7, Tracked(drops.clone()));

        //  The original value.
        assert_eq!(1, drops.get());

        drop(deque.pop_front());
        drop(deque.pop_back());

        assert_eq!(3, drops.get());

        deque.push_front(Tracked(drops.clone()));

        drop(deque);

        assert_eq!(9, drops.get());
    }

    #[test]
    fn clear_keeps_chunks() {
        let drops = Rc::new(Cell::new(0));

        let mut deque = ChunkDeque::<Tracked, 4>::from_elem(9, Tracked(drops.clone()));

        let chunks = deque.chunk_count();

        deque.clear();

        assert_eq!(10, drops.get());
        assert!(deque.is_empty());
        assert_eq!(chunks, deque.chunk_count());
    }

    #[test]
    fn from_elem_panicking_clone() {
        let allocator = CountingAllocator::default();
        let drops = Rc::new(Cell::new(0));

        let bomb = Bomb {
            fuse: Rc::new(Cell::new(5)),
            tracked: Tracked(drops.clone()),
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            ChunkDeque::<Bomb, 4, _>::try_from_elem_in(20, bomb, allocator.clone())
        }));

        assert!(result.is_err());

        //  The 5 clones, and the original.
        assert_eq!(6, drops.get());
        assert_eq!(0, allocator.live());
    }

    #[test]
    fn try_from_fn_propagates_error() {
        let allocator = CountingAllocator::default();
        let drops = Rc::new(Cell::new(0));

        let result = ChunkDeque::<Tracked, 4, _>::try_from_fn_in(
            10,
            |index| {
                if index == 6 {
                    Err(BuildError::Rejected(index))
                } else {
                    Ok(Tracked(drops.clone()))
                }
            },
            allocator.clone(),
        );

        assert_eq!(Some(BuildError::Rejected(6)), result.err());
        assert_eq!(6, drops.get());
        assert_eq!(0, allocator.live());
    }

    #[test]
    fn try_from_fn_allocation_failure() {
        let allocator = CountingAllocator::default();

        allocator.fail_after(2);

        let result =
            ChunkDeque::<u32, 4, _>::try_from_fn_in(10, |index| Ok::<_, BuildError>(index as u32), allocator.clone());

        assert!(matches!(result, Err(BuildError::Deque(DequeError::AllocFailed { .. }))));
        assert_eq!(0, allocator.live());
    }

    #[test]
    fn push_allocation_failure() {
        let allocator = CountingAllocator::default();

        let mut deque = ChunkDeque::<u32, 4, _>::new_in(allocator.clone());

        for i in 0..4 {
            deque.push_back(i);
        }

        let live = allocator.live();

        allocator.fail_after(0);

        assert!(matches!(deque.try_push_back(4), Err(DequeError::AllocFailed { .. })));
        assert!(matches!(deque.try_push_front(4), Err(DequeError::AllocFailed { .. })));

        assert_eq!(live, allocator.live());
        assert_eq!(1, deque.chunk_count());
        assert_elements(&deque, 0..4);

        allocator.fail_after(usize::MAX);

        deque.push_back(4);
        deque.push_front(5);

        assert_eq!(6, deque.len());
    }

    #[test]
    fn push_front_allocation_failure_from_empty() {
        for budget in 0..4 {
            let allocator = CountingAllocator::default();

            let mut deque = ChunkDeque::<u32, 4, _>::new_in(allocator.clone());

            allocator.fail_after(budget);

            assert!(
                matches!(deque.try_push_front(1), Err(DequeError::AllocFailed { .. })),
                "budget {budget}"
            );

            assert_eq!(0, deque.chunk_count(), "budget {budget}");
            assert_eq!(0, allocator.live(), "budget {budget}");
            assert_window(&deque, (0, 0), (0, 0));

            allocator.fail_after(usize::MAX);

            deque.push_front(1);

            assert_eq!(3, deque.chunk_count());
            assert_window(&deque, (0, 3), (1, 0));
        }
    }

    #[test]
    fn drop_continues_after_panicking_element() {
        let allocator = CountingAllocator::default();
        let drops = Rc::new(Cell::new(0));

        let mut deque = ChunkDeque::<Grenade, 4, _>::new_in(allocator.clone());

        for armed in (0..8).map(|i| i == 6) {
            deque.push_back(Grenade {
                armed,
                _tracked: Tracked(drops.clone()),
            });
        }

        let result = panic::catch_unwind(AssertUnwindSafe(move || drop(deque)));

        assert!(result.is_err());
        assert_eq!(8, drops.get());
        assert_eq!(0, allocator.live());
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn end_beyond_isize() {
        let mut deque = ChunkDeque::<(), 4>::new();

        //  Only the length matters to `end`, and dropping `()` is a no-op.
        deque.len = isize::MAX as usize + 1;

        let _ = deque.end();
    }

    #[test]
    fn releases_everything() {
        let allocator = CountingAllocator::default();

        {
            let mut deque = ChunkDeque::<String, 4, _>::new_in(allocator.clone());

            for i in 0..50 {
                deque.push_back(i.to_string());
                deque.push_front(i.to_string());
            }

            let copy = deque.clone();

            assert_eq!(deque, copy);
            assert!(allocator.live() > 0);
        }

        assert_eq!(0, allocator.live());
    }

    #[test]
    fn zero_sized() {
        let mut deque = ChunkDeque::<(), 4>::new();

        for _ in 0..100 {
            deque.push_back(());
            deque.push_front(());
        }

        assert_eq!(200, deque.len());

        while deque.pop_front().is_some() {}

        assert!(deque.is_empty());
    }

    #[test]
    fn debug() {
        let deque: Deque = (1..4).collect();

        assert_eq!("[1, 2, 3]", format!("{deque:?}"));
    }

    #[track_caller]
    fn assert_window<T, const N: usize, A>(deque: &ChunkDeque<T, N, A>, start: (usize, usize), end: (usize, usize))
    where
        A: Allocator,
    {
        assert_eq!(SlotPosition::new(start.0, start.1), deque.start, "start");
        assert_eq!(SlotPosition::new(end.0, end.1), deque.end, "end");
    }

    #[track_caller]
    fn assert_elements<const N: usize, A, I>(deque: &ChunkDeque<u32, N, A>, expected: I)
    where
        A: Allocator,
        I: IntoIterator<Item = u32>,
    {
        let expected: Vec<_> = expected.into_iter().collect();

        assert_eq!(expected.len(), deque.len(), "len");

        for (index, element) in expected.iter().enumerate() {
            assert_eq!(Some(element), deque.get(index), "get({index})");
        }
    }

    //  Counts its drops.
    #[derive(Clone, Debug)]
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    //  Panics on drop, if armed.
    struct Grenade {
        armed: bool,
        _tracked: Tracked,
    }

    impl Drop for Grenade {
        fn drop(&mut self) {
            if self.armed {
                panic!("boom");
            }
        }
    }

    //  Panics on clone, once its fuse has burnt out.
    struct Bomb {
        fuse: Rc<Cell<usize>>,
        tracked: Tracked,
    }

    impl Clone for Bomb {
        fn clone(&self) -> Self {
            let fuse = self.fuse.get().checked_sub(1).expect("boom");

            self.fuse.set(fuse);

            Self {
                fuse: self.fuse.clone(),
                tracked: self.tracked.clone(),
            }
        }
    }

    #[derive(Debug, PartialEq)]
    enum BuildError {
        Deque(DequeError),
        Rejected(usize),
    }

    impl From<DequeError> for BuildError {
        fn from(error: DequeError) -> Self {
            Self::Deque(error)
        }
    }
} // mod tests
