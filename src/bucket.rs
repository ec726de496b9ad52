//! Bucket: what a `FixedHashTable` slot must support.
//!
//! A bucket is default-constructed when its table is built and then only
//! ever reached through `FixedHashTable::retrieve`. Implemented by
//! `BalancedTree` (terminal storage) and by `FixedHashTable` itself, so
//! tables nest to whatever depth the type says.

pub trait Bucket: Default {
    /// The stored record type, as seen by enumeration and predicates.
    type Entry;

    /// Visits every entry. Trees go in key order; tables go bucket by
    /// bucket in index order.
    fn for_each_entry<F>(&self, f: &mut F)
    where
        F: FnMut(&Self::Entry);

    /// Removes every entry `pred` accepts and returns how many went.
    fn remove_entries<F>(&mut self, pred: &mut F) -> usize
    where
        F: FnMut(&Self::Entry) -> bool;

    fn entry_count(&self) -> usize;
}
