//! avl-hashtable: AVL trees as the collision structure of fixed-size,
//! FNV-addressed hash tables, nestable to any depth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small set of layers, each with one precise contract, that
//!   compose into a multi-key dictionary without any layer knowing about
//!   the ones above it.
//! - Layers:
//!   - BalancedTree<K, V>: ordered map with the AVL height invariant;
//!     insert, search, remove, remove-by-predicate, in-order iteration.
//!   - FixedHashTable<B, S>: `len` eagerly built buckets addressed by
//!     `hash(key) % len`. No chaining, no counts, no insert/remove:
//!     `retrieve` hands out `&mut B` and the bucket does the rest.
//!   - Bucket: the capability both of the above implement (enumerate,
//!     remove matching, count), which is what lets a table hold tables.
//!   - PhoneDirectory: table → table → tree, keyed by first name, last
//!     name and number.
//!
//! Constraints
//! - Single-threaded and synchronous; nothing blocks or suspends.
//! - Equal keys are rejected, never merged or overwritten.
//! - Table length is chosen once (smallest prime for a 0.75 load factor)
//!   and never changes; there is no rehashing.
//! - Not-found and already-present are ordinary return values
//!   (`Option`, `InsertOutcome`), never errors.
//!
//! Tree storage
//! - Nodes sit in a generational `SlotMap` arena owned by the tree, with
//!   children linked by key. Ownership is still strictly tree shaped:
//!   each node has exactly one parent slot. Dropping a tree frees the
//!   arena in one flat pass, so deep trees cannot overflow the stack on
//!   teardown.
//! - Every structural operation returns the new subtree root and the
//!   caller writes it back; rotations recompute heights from children.
//!
//! Predicate removal
//! - `remove_matching` cannot use key order, so it visits every node and
//!   rebuilds bottom-up. Rebuilt children may differ in height by more
//!   than one, so nodes are reattached with an AVL join rather than a
//!   single rebalance. The O(n) cost is accepted.
//!
//! Hashing
//! - Keys are hashed as their raw bytes with 64-bit FNV-1a. The table is
//!   generic over `BuildHasher` so tests can force collisions.

pub mod avl_tree;
#[cfg(test)]
mod avl_tree_proptest;
pub mod bucket;
pub mod directory;
pub mod fixed_hash_table;
pub mod fnv;
pub mod sizing;

// Public surface
pub use avl_tree::{BalancedTree, InsertOutcome, Iter, TreeViolation};
pub use bucket::Bucket;
pub use directory::{DirectoryError, Listing, LoadSummary, ParseError, Person, PhoneDirectory};
pub use fixed_hash_table::FixedHashTable;
pub use fnv::{fnv1a_64, Fnv64, FnvBuildHasher};
pub use sizing::{next_prime, table_len, LOAD_FACTOR};
