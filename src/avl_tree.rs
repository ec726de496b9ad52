//! BalancedTree: height-balanced (AVL) ordered map over an arena of nodes.
//!
//! Nodes live in a `SlotMap` owned by the tree and link to their children
//! by key. Every live node is reachable from the root exactly once, so the
//! arena is a plain tree with flat storage: dropping the tree releases all
//! nodes in one pass without recursing down the links.
//!
//! All structural updates return the new root of the subtree they touched
//! and the caller stores it back into the parent slot. Heights are always
//! recomputed from the children, never adjusted incrementally.

use crate::bucket::Bucket;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Arena key of a tree node.
    struct NodeId;
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: u32,
}

/// Result of [`BalancedTree::insert`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<V> {
    /// A new node was added.
    Inserted,
    /// An equal key already exists. The tree is untouched and the rejected
    /// value is handed back.
    AlreadyPresent(V),
}

impl<V> InsertOutcome<V> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Structural defect reported by [`BalancedTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeViolation {
    #[error("keys out of order at in-order position {0}")]
    Unordered(usize),

    #[error("cached height {cached} differs from computed height {computed}")]
    StaleHeight { cached: u32, computed: u32 },

    #[error("balance factor {0} outside [-1, 1]")]
    Unbalanced(i32),

    #[error("{reachable} nodes reachable from the root, {stored} stored")]
    CountMismatch { reachable: usize, stored: usize },
}

/// Self-balancing binary search tree keyed by `K`.
///
/// Equal keys are never stored twice: a second insert of an equal key is
/// reported as [`InsertOutcome::AlreadyPresent`] and changes nothing.
pub struct BalancedTree<K, V> {
    root: Option<NodeId>,
    nodes: SlotMap<NodeId, Node<K, V>>,
}

impl<K, V> BalancedTree<K, V> {
    pub fn new() -> Self {
        Self {
            root: None,
            nodes: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree; 0 when empty, 1 for a single node.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
    }

    /// In-order (ascending) iterator over entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut it = Iter {
            nodes: &self.nodes,
            stack: Vec::with_capacity(self.height() as usize),
            remaining: self.nodes.len(),
        };
        it.push_left_spine(self.root);
        it
    }

    /// Calls `f` on every entry in ascending key order.
    pub fn in_order<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut id = self.root?;
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        let node = &self.nodes[id];
        Some((&node.key, &node.value))
    }

    /// Entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut id = self.root?;
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        let node = &self.nodes[id];
        Some((&node.key, &node.value))
    }

    /// Removes every entry for which `pred` returns true and returns how
    /// many were removed.
    ///
    /// The predicate is unrelated to key order, so every node is visited.
    /// Subtrees are rebuilt bottom-up: both children are filtered first,
    /// then the current node is either rejoined between them or dropped
    /// and replaced by its in-order successor. Joining tolerates
    /// arbitrary height differences between the rebuilt children.
    pub fn remove_matching<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut removed = 0;
        self.root = self.retain_at(self.root, &mut pred, &mut removed);
        tracing::trace!(removed, remaining = self.nodes.len(), "remove_matching");
        removed
    }

    // ========== Height & Rotation ==========

    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[id].height = height;
    }

    fn balance_of(&self, id: NodeId) -> i32 {
        let node = &self.nodes[id];
        self.height_of(node.left) as i32 - self.height_of(node.right) as i32
    }

    /// `y`'s left child `x` becomes the subtree root; `x`'s right subtree
    /// moves under `y`. No-op without a left child.
    fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        self.nodes[y].left = self.nodes[x].right;
        self.update_height(y);
        self.nodes[x].right = Some(y);
        self.update_height(x);
        x
    }

    /// Mirror of [`Self::rotate_right`].
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        self.nodes[x].right = self.nodes[y].left;
        self.update_height(x);
        self.nodes[y].left = Some(x);
        self.update_height(y);
        y
    }

    /// Refreshes `id`'s height and restores the balance invariant at `id`,
    /// given both children are valid AVL trees whose heights differ by at
    /// most 2. Returns the subtree's new root.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let node = &self.nodes[id];
        match (self.balance_of(id), node.left, node.right) {
            (bf, Some(left), _) if bf > 1 => {
                if self.balance_of(left) < 0 {
                    let left = self.rotate_left(left);
                    self.nodes[id].left = Some(left);
                }
                self.rotate_right(id)
            }
            (bf, _, Some(right)) if bf < -1 => {
                if self.balance_of(right) > 0 {
                    let right = self.rotate_right(right);
                    self.nodes[id].right = Some(right);
                }
                self.rotate_left(id)
            }
            _ => id,
        }
    }

    // ========== Structural helpers ==========

    /// Unlinks the minimum node of the subtree at `id`. Returns the
    /// rebalanced remainder and the detached node, whose links are cleared.
    fn detach_min(&mut self, id: NodeId) -> (Option<NodeId>, NodeId) {
        match self.nodes[id].left {
            None => {
                let rest = self.nodes[id].right.take();
                (rest, id)
            }
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes[id].left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }

    /// Builds a balanced tree holding `left`, then `mid`, then `right` in
    /// order. Every key of `left` must be below `mid`'s and every key of
    /// `right` above it; the heights of `left` and `right` may differ
    /// arbitrarily.
    fn join(&mut self, left: Option<NodeId>, mid: NodeId, right: Option<NodeId>) -> NodeId {
        let (hl, hr) = (self.height_of(left), self.height_of(right));
        match (left, right) {
            (Some(l), _) if hl > hr + 1 => {
                let inner = self.nodes[l].right;
                let joined = self.join(inner, mid, right);
                self.nodes[l].right = Some(joined);
                self.rebalance(l)
            }
            (_, Some(r)) if hr > hl + 1 => {
                let inner = self.nodes[r].left;
                let joined = self.join(left, mid, inner);
                self.nodes[r].left = Some(joined);
                self.rebalance(r)
            }
            _ => {
                let node = &mut self.nodes[mid];
                node.left = left;
                node.right = right;
                self.update_height(mid);
                mid
            }
        }
    }

    /// Concatenates two trees, all of `left` ordered before all of `right`,
    /// using the minimum of `right` as the new separator.
    fn join_siblings(&mut self, left: Option<NodeId>, right: Option<NodeId>) -> Option<NodeId> {
        match right {
            None => left,
            Some(r) => {
                let (rest, min) = self.detach_min(r);
                Some(self.join(left, min, rest))
            }
        }
    }

    fn retain_at<F>(&mut self, at: Option<NodeId>, pred: &mut F, removed: &mut usize) -> Option<NodeId>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let id = at?;
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let left = self.retain_at(left, pred, removed);
        let right = self.retain_at(right, pred, removed);

        let node = &self.nodes[id];
        if pred(&node.key, &node.value) {
            self.nodes.remove(id);
            *removed += 1;
            self.join_siblings(left, right)
        } else {
            Some(self.join(left, id, right))
        }
    }
}

impl<K: Ord, V> BalancedTree<K, V> {
    /// Inserts `key` unless an equal key is present.
    pub fn insert(&mut self, key: K, value: V) -> InsertOutcome<V> {
        let (root, rejected) = self.insert_at(self.root, key, value);
        self.root = Some(root);
        match rejected {
            None => InsertOutcome::Inserted,
            Some(value) => InsertOutcome::AlreadyPresent(value),
        }
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).is_some()
    }

    /// Removes the entry with `key`, returning it. `None` means no such key
    /// existed and the tree is unchanged.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (root, removed) = self.remove_at(self.root, key);
        self.root = root;
        let node = self.nodes.remove(removed?)?;
        Some((node.key, node.value))
    }

    /// Checks key order, cached heights, balance factors and node count.
    pub fn validate(&self) -> Result<(), TreeViolation> {
        let mut reachable = 0;
        self.validate_at(self.root, &mut reachable)?;
        if reachable != self.nodes.len() {
            return Err(TreeViolation::CountMismatch {
                reachable,
                stored: self.nodes.len(),
            });
        }
        let mut prev: Option<&K> = None;
        for (pos, (k, _)) in self.iter().enumerate() {
            if prev.is_some_and(|p| p >= k) {
                return Err(TreeViolation::Unordered(pos));
            }
            prev = Some(k);
        }
        Ok(())
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut at = self.root;
        while let Some(id) = at {
            let node = &self.nodes[id];
            at = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Returns the new subtree root and, on a duplicate, the rejected value.
    fn insert_at(&mut self, at: Option<NodeId>, key: K, value: V) -> (NodeId, Option<V>) {
        let Some(id) = at else {
            let id = self.nodes.insert(Node {
                key,
                value,
                left: None,
                right: None,
                height: 1,
            });
            return (id, None);
        };

        match key.cmp(&self.nodes[id].key) {
            Ordering::Less => {
                let (child, rejected) = self.insert_at(self.nodes[id].left, key, value);
                self.nodes[id].left = Some(child);
                if rejected.is_some() {
                    return (id, rejected);
                }
            }
            Ordering::Greater => {
                let (child, rejected) = self.insert_at(self.nodes[id].right, key, value);
                self.nodes[id].right = Some(child);
                if rejected.is_some() {
                    return (id, rejected);
                }
            }
            Ordering::Equal => return (id, Some(value)),
        }
        (self.rebalance(id), None)
    }

    /// Returns the new subtree root and the unlinked node, if any. The
    /// unlinked node is still in the arena; the caller frees it.
    fn remove_at<Q>(&mut self, at: Option<NodeId>, key: &Q) -> (Option<NodeId>, Option<NodeId>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(id) = at else {
            return (None, None);
        };

        let removed = match key.cmp(self.nodes[id].key.borrow()) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(self.nodes[id].left, key);
                self.nodes[id].left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(self.nodes[id].right, key);
                self.nodes[id].right = child;
                removed
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[id].left, self.nodes[id].right);
                let replacement = match (left, right) {
                    (None, child) | (child, None) => child,
                    (Some(l), Some(r)) => {
                        let (rest, successor) = self.detach_min(r);
                        let node = &mut self.nodes[successor];
                        node.left = Some(l);
                        node.right = rest;
                        Some(self.rebalance(successor))
                    }
                };
                return (replacement, Some(id));
            }
        };

        match removed {
            Some(_) => (Some(self.rebalance(id)), removed),
            None => (Some(id), None),
        }
    }

    /// Returns the subtree height.
    fn validate_at(&self, at: Option<NodeId>, reachable: &mut usize) -> Result<u32, TreeViolation> {
        let Some(id) = at else {
            return Ok(0);
        };
        *reachable += 1;
        let node = &self.nodes[id];
        let hl = self.validate_at(node.left, reachable)?;
        let hr = self.validate_at(node.right, reachable)?;
        let computed = 1 + hl.max(hr);
        if node.height != computed {
            return Err(TreeViolation::StaleHeight {
                cached: node.height,
                computed,
            });
        }
        let bf = hl as i32 - hr as i32;
        if !(-1..=1).contains(&bf) {
            return Err(TreeViolation::Unbalanced(bf));
        }
        Ok(computed)
    }
}

impl<K, V> Default for BalancedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BalancedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BalancedTree<K, V> {
    /// Later duplicates are discarded.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (k, v) in iter {
            let _ = tree.insert(k, v);
        }
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a BalancedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> Bucket for BalancedTree<K, V> {
    type Entry = V;

    fn for_each_entry<F>(&self, f: &mut F)
    where
        F: FnMut(&V),
    {
        for (_, v) in self.iter() {
            f(v);
        }
    }

    fn remove_entries<F>(&mut self, pred: &mut F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        self.remove_matching(|_, v| pred(v))
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

/// In-order iterator over a [`BalancedTree`], driven by an explicit stack
/// of pending ancestors.
pub struct Iter<'a, K, V> {
    nodes: &'a SlotMap<NodeId, Node<K, V>>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut at: Option<NodeId>) {
        while let Some(id) = at {
            self.stack.push(id);
            at = self.nodes[id].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[id];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
