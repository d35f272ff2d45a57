//! Iterators over a `ChunkDeque`.
//!
//! All iterators are double-ended and exact-sized. They resolve each element by its index, just like indexing the
//! deque would.

use core::{fmt, iter::FusedIterator, marker::PhantomData};

use crate::{
    collections::ChunkDeque,
    utils::alloc::{Allocator, Global},
};

/// Iterator over references to the elements of a `ChunkDeque`.
pub struct Iter<'a, T, const N: usize = 10, A = Global>
where
    A: Allocator,
{
    //  Invariant:
    //  -   `front <= back <= deque.len()`.
    deque: &'a ChunkDeque<T, N, A>,
    front: usize,
    back: usize,
}

impl<'a, T, const N: usize, A> Iter<'a, T, N, A>
where
    A: Allocator,
{
    pub(crate) fn new(deque: &'a ChunkDeque<T, N, A>) -> Self {
        let back = deque.len();

        Self { deque, front: 0, back }
    }
}

impl<'a, T, const N: usize, A> Iterator for Iter<'a, T, N, A>
where
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        //  Safety:
        //  -   `front < back <= deque.len()`.
        let element = unsafe { self.deque.get_unchecked(self.front) };

        self.front += 1;

        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;

        (remaining, Some(remaining))
    }

    fn count(self) -> usize {
        self.back - self.front
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);

        self.next()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T, const N: usize, A> DoubleEndedIterator for Iter<'_, T, N, A>
where
    A: Allocator,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;

        //  Safety:
        //  -   `front <= back < deque.len()`.
        Some(unsafe { self.deque.get_unchecked(self.back) })
    }
}

impl<T, const N: usize, A> ExactSizeIterator for Iter<'_, T, N, A> where A: Allocator {}

impl<T, const N: usize, A> FusedIterator for Iter<'_, T, N, A> where A: Allocator {}

impl<T, const N: usize, A> Clone for Iter<'_, T, N, A>
where
    A: Allocator,
{
    fn clone(&self) -> Self {
        Self {
            deque: self.deque,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T, const N: usize, A> fmt::Debug for Iter<'_, T, N, A>
where
    T: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over mutable references to the elements of a `ChunkDeque`.
pub struct IterMut<'a, T, const N: usize = 10, A = Global>
where
    A: Allocator,
{
    //  Invariants:
    //  -   `front <= back <= deque.len()`.
    //  -   Exclusive: `deque` was derived from an exclusive borrow, valid for `'a`, and no element in
    //      `[front, back)` has been handed out yet.
    deque: &'a ChunkDeque<T, N, A>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, const N: usize, A> IterMut<'a, T, N, A>
where
    A: Allocator,
{
    pub(crate) fn new(deque: &'a mut ChunkDeque<T, N, A>) -> Self {
        let back = deque.len();

        Self {
            deque,
            front: 0,
            back,
            _marker: PhantomData,
        }
    }
}

impl<'a, T, const N: usize, A> Iterator for IterMut<'a, T, N, A>
where
    A: Allocator,
{
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        //  Safety:
        //  -   `front < back <= deque.len()`.
        let mut slot = unsafe { self.deque.slot(self.front) };

        self.front += 1;

        //  Safety:
        //  -   The slot is initialized, as it is within the window.
        //  -   The slot is handed out once, as per Exclusive Invariant.
        Some(unsafe { slot.as_mut() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;

        (remaining, Some(remaining))
    }
}

impl<T, const N: usize, A> DoubleEndedIterator for IterMut<'_, T, N, A>
where
    A: Allocator,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;

        //  Safety:
        //  -   `front <= back < deque.len()`.
        let mut slot = unsafe { self.deque.slot(self.back) };

        //  Safety:
        //  -   The slot is initialized, as it is within the window.
        //  -   The slot is handed out once, as per Exclusive Invariant.
        Some(unsafe { slot.as_mut() })
    }
}

impl<T, const N: usize, A> ExactSizeIterator for IterMut<'_, T, N, A> where A: Allocator {}

impl<T, const N: usize, A> FusedIterator for IterMut<'_, T, N, A> where A: Allocator {}

impl<T, const N: usize, A> fmt::Debug for IterMut<'_, T, N, A>
where
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("IterMut")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

/// Owning iterator over the elements of a `ChunkDeque`.
pub struct IntoIter<T, const N: usize = 10, A = Global>
where
    A: Allocator,
{
    deque: ChunkDeque<T, N, A>,
}

impl<T, const N: usize, A> IntoIter<T, N, A>
where
    A: Allocator,
{
    pub(crate) fn new(deque: ChunkDeque<T, N, A>) -> Self {
        Self { deque }
    }
}

impl<T, const N: usize, A> Iterator for IntoIter<T, N, A>
where
    A: Allocator,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.deque.len();

        (remaining, Some(remaining))
    }
}

impl<T, const N: usize, A> DoubleEndedIterator for IntoIter<T, N, A>
where
    A: Allocator,
{
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, const N: usize, A> ExactSizeIterator for IntoIter<T, N, A> where A: Allocator {}

impl<T, const N: usize, A> FusedIterator for IntoIter<T, N, A> where A: Allocator {}

impl<T, const N: usize, A> fmt::Debug for IntoIter<T, N, A>
where
    T: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}

// mod tests
