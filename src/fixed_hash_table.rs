//! FixedHashTable: a non-resizable array of buckets addressed by
//! `hash(key) % len`.
//!
//! The table has no insert or remove of its own and keeps no counts:
//! `retrieve` hands out the bucket and the bucket decides what to do.
//! Keys are hashed as raw bytes through `S`, which defaults to FNV-1a.

use crate::bucket::Bucket;
use crate::fnv::FnvBuildHasher;
use crate::sizing::table_len;
use core::fmt;
use core::hash::{BuildHasher, Hasher};

pub struct FixedHashTable<B, S = FnvBuildHasher> {
    hasher: S,
    buckets: Box<[B]>,
}

impl<B: Default> FixedHashTable<B> {
    /// Table sized for `expected` elements at the default load factor.
    pub fn new(expected: usize) -> Self {
        Self::with_hasher(expected, FnvBuildHasher)
    }

    /// Table of exactly `len` buckets; 0 is raised to 1.
    pub fn with_len(len: usize) -> Self {
        Self::with_len_and_hasher(len, FnvBuildHasher)
    }
}

impl<B, S> FixedHashTable<B, S>
where
    B: Default,
    S: BuildHasher,
{
    pub fn with_hasher(expected: usize, hasher: S) -> Self {
        let len = table_len(expected);
        tracing::debug!(expected, len, "sizing fixed hash table");
        Self::with_len_and_hasher(len, hasher)
    }

    pub fn with_len_and_hasher(len: usize, hasher: S) -> Self {
        let buckets = (0..len.max(1)).map(|_| B::default()).collect();
        Self { hasher, buckets }
    }
}

impl<B, S> FixedHashTable<B, S>
where
    S: BuildHasher,
{
    /// Bucket index for `key`; always `< self.len()`.
    pub fn index_of(&self, key: &str) -> usize {
        let mut h = self.hasher.build_hasher();
        h.write(key.as_bytes());
        (h.finish() % self.buckets.len() as u64) as usize
    }

    /// The bucket `key` routes to. Never fails and never allocates.
    pub fn retrieve(&mut self, key: &str) -> &mut B {
        let i = self.index_of(key);
        &mut self.buckets[i]
    }

    /// Shared counterpart of [`Self::retrieve`].
    pub fn get(&self, key: &str) -> &B {
        &self.buckets[self.index_of(key)]
    }
}

impl<B, S> FixedHashTable<B, S> {
    /// Number of buckets, fixed at construction.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Always false: a table holds at least one bucket.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> core::slice::Iter<'_, B> {
        self.buckets.iter()
    }

    pub fn buckets_mut(&mut self) -> core::slice::IterMut<'_, B> {
        self.buckets.iter_mut()
    }

    /// Calls `f` on each bucket in index order.
    pub fn for_each_bucket<F>(&self, f: F)
    where
        F: FnMut(&B),
    {
        self.buckets.iter().for_each(f);
    }
}

/// Number of elements a default-constructed table is sized for
/// (11 buckets).
pub const DEFAULT_EXPECTED: usize = 6;

impl<B, S> Default for FixedHashTable<B, S>
where
    B: Default,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(DEFAULT_EXPECTED, S::default())
    }
}

impl<B, S> Bucket for FixedHashTable<B, S>
where
    B: Bucket,
    S: BuildHasher + Default,
{
    type Entry = B::Entry;

    fn for_each_entry<F>(&self, f: &mut F)
    where
        F: FnMut(&Self::Entry),
    {
        for b in self.buckets.iter() {
            b.for_each_entry(&mut *f);
        }
    }

    fn remove_entries<F>(&mut self, pred: &mut F) -> usize
    where
        F: FnMut(&Self::Entry) -> bool,
    {
        self.buckets.iter_mut().map(|b| b.remove_entries(&mut *pred)).sum()
    }

    fn entry_count(&self) -> usize {
        self.buckets.iter().map(Bucket::entry_count).sum()
    }
}

impl<B: fmt::Debug, S> fmt::Debug for FixedHashTable<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedHashTable")
            .field("buckets", &self.buckets)
            .finish_non_exhaustive()
    }
}
