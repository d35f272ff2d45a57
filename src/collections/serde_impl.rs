//! Serialization of `ChunkDeque`, as a sequence of elements from front to back.
//!
//! The chunk layout is not serialized: a deserialized deque is laid out as if built by `push_back`.

use core::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error, SeqAccess, Visitor},
};

use crate::{collections::ChunkDeque, utils::alloc::Allocator};

impl<T, const N: usize, A> Serialize for ChunkDeque<T, N, A>
where
    T: Serialize,
    A: Allocator,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self)
    }
}

impl<'de, T, const N: usize, A> Deserialize<'de> for ChunkDeque<T, N, A>
where
    T: Deserialize<'de>,
    A: Allocator + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(DequeVisitor(PhantomData))
    }
}

struct DequeVisitor<T, const N: usize, A>(PhantomData<fn() -> ChunkDeque<T, N, A>>)
where
    A: Allocator;

impl<'de, T, const N: usize, A> Visitor<'de> for DequeVisitor<T, N, A>
where
    T: Deserialize<'de>,
    A: Allocator + Default,
{
    type Value = ChunkDeque<T, N, A>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut deque = ChunkDeque::new_in(A::default());

        while let Some(element) = seq.next_element()? {
            deque.try_push_back(element).map_err(S::Error::custom)?;
        }

        Ok(deque)
    }
}
