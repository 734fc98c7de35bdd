//! An ordered map built on a treap: a binary search tree on the keys that is
//! also a min-heap on random per-node priorities, which keeps the expected
//! height logarithmic. Every node is additionally threaded onto a sorted
//! doubly linked chain anchored on a sentinel, so in-order iteration never has
//! to walk the tree.

mod iter;
mod node;

#[cfg(test)]
mod proptests;

pub use iter::{Cursor, Entry, Iter};

use std::{borrow::Borrow, cmp::Ordering, fmt, mem};

use log::{debug, trace};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use self::node::{Node, NodeHandle, NodeStore, Segment, Side, Slot};
use crate::error::{Error, Result};
use crate::linked_list::LinkedList;
use crate::map::Map;
use crate::stack::Stack;

/// A map whose iteration order is the natural order of its keys.
///
/// The sentinel isn't a real node: the map's `head` and `tail` play its
/// `next` and `prev`, and a node whose `prev` or `next` is `None` is linked to
/// it. An empty map has both ends pointing back at the sentinel.
pub struct TreeMap<K, V, R = StdRng> {
    nodes: NodeStore<K, V>,
    root: Option<NodeHandle>,

    /// Smallest key, i.e. the sentinel's successor.
    head: Option<NodeHandle>,

    /// Largest key, i.e. the sentinel's predecessor.
    tail: Option<NodeHandle>,

    len: usize,

    /// Source of node priorities.
    rng: R,
}

impl<K, V> TreeMap<K, V, StdRng> {
    /// Makes an empty map drawing priorities from an OS-seeded generator.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes an empty map with room for `capacity` mappings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_rng(capacity, StdRng::from_os_rng())
    }

    /// Makes an empty map whose priorities are fully determined by `seed`, so
    /// the same sequence of operations always builds the same tree.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_capacity_and_rng(0, StdRng::seed_from_u64(seed))
    }
}

impl<K, V, R> TreeMap<K, V, R> {
    /// Makes an empty map drawing priorities from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self::with_capacity_and_rng(0, rng)
    }

    pub fn with_capacity_and_rng(capacity: usize, rng: R) -> Self {
        Self {
            nodes: NodeStore::with_capacity(capacity),
            root: None,
            head: None,
            tail: None,
            len: 0,
            rng,
        }
    }

    /// The number of mappings in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over the mappings in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V, R> {
        Iter {
            map: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// A cursor parked before the smallest key.
    pub fn cursor(&self) -> Cursor<'_, K, V, R> {
        Cursor {
            map: self,
            position: None,
        }
    }

    /// The mapping with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.head.map(|h| {
            let node = &self.nodes[h];
            (&node.key, &node.value)
        })
    }

    /// The mapping with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tail.map(|h| {
            let node = &self.nodes[h];
            (&node.key, &node.value)
        })
    }

    /// Whether one or more keys map to `value`. There's no ordering to help
    /// here, so this looks at every node.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Removes every mapping. Does not free the underlying buffers.
    pub fn clear(&mut self) {
        debug!("clearing tree map of {} nodes", self.len);
        self.nodes.clear();
        self.root = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// The node hanging from `slot`, if any.
    fn slot(&self, slot: Slot) -> Option<NodeHandle> {
        match slot {
            Slot::Root => self.root,
            Slot::Child(parent, side) => self.nodes[parent].child(side),
        }
    }

    fn set_slot(&mut self, slot: Slot, node: Option<NodeHandle>) {
        match slot {
            Slot::Root => self.root = node,
            Slot::Child(parent, side) => self.nodes[parent].set_child(side, node),
        }
    }

    /// Rotates the subtree hanging from `slot` so that its child on `side`
    /// becomes the new top of the subtree. Key order is preserved; the old top
    /// ends up as the new top's child on the opposite side.
    fn rotate(&mut self, slot: Slot, side: Side) {
        let top = match self.slot(slot) {
            Some(top) => top,
            None => return,
        };
        let pivot = match self.nodes[top].child(side) {
            Some(pivot) => pivot,
            None => return,
        };

        let inner = self.nodes[pivot].child(!side);
        self.nodes[top].set_child(side, inner);
        self.nodes[pivot].set_child(!side, Some(top));
        self.set_slot(slot, Some(pivot));
    }

    /// Deep-copies `source`'s tree into this map's (empty) store, keeping the
    /// exact shape and priorities. Each subtree's copy comes back as an
    /// already-chained run, so the chain is rebuilt in the same pass.
    fn copy_from(&mut self, source: &Self)
    where
        K: Clone,
        V: Clone,
    {
        let copied = source.copy_subtree(source.root, &mut self.nodes);

        self.root = copied.map(|(root, _)| root);
        self.head = copied.map(|(_, run)| run.first);
        self.tail = copied.map(|(_, run)| run.last);
        self.len = source.len;

        debug!("copied tree map of {} nodes", self.len);
    }

    fn copy_subtree(
        &self,
        from: Option<NodeHandle>,
        into: &mut NodeStore<K, V>,
    ) -> Option<(NodeHandle, Segment)>
    where
        K: Clone,
        V: Clone,
    {
        let from = &self.nodes[from?];
        let left = self.copy_subtree(from.left, into);
        let right = self.copy_subtree(from.right, into);

        let mut node =
            Node::new(from.key.clone(), from.value.clone(), from.priority);
        node.left = left.map(|(h, _)| h);
        node.right = right.map(|(h, _)| h);
        let copied = into.insert(node);

        let run = Segment::merge(
            left.map(|(_, run)| run),
            copied,
            right.map(|(_, run)| run),
            into,
        );

        Some((copied, run))
    }
}

impl<K, V, R> TreeMap<K, V, R>
where
    K: Ord,
{
    fn find<Q>(&self, key: &Q) -> Option<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;

        while let Some(h) = cursor {
            let node = &self.nodes[h];
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(h),
            };
        }

        None
    }

    /// Whether there is a mapping for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// The value mapped to `key`. An absent key is an error; nothing gets
    /// inserted on a miss.
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find(key).ok_or(Error::NotFound)?;
        Ok(&self.nodes[node].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find(key).ok_or(Error::NotFound)?;
        Ok(&mut self.nodes[node].value)
    }

    /// Maps `key` to `value`, returning the value it replaced. Overwriting an
    /// existing key changes nothing but the value.
    ///
    /// A new key gets a fresh random priority and is spliced in at the bottom
    /// of the tree, then rotated upwards along its descent path until its
    /// parent's priority is no greater than its own.
    ///
    /// Running out of memory, whether for the node or for the descent path,
    /// returns `AllocationFailure` before the map has been touched.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>>
    where
        R: Rng,
    {
        let mut slot = Slot::Root;
        let mut path: LinkedList<(Slot, Side)> = LinkedList::new();

        // the tightest neighbours seen on the way down are exactly where the
        // new node goes in the chain
        let mut prev = None;
        let mut next = None;

        while let Some(h) = self.slot(slot) {
            let node = &mut self.nodes[h];
            let side = match key.cmp(&node.key) {
                Ordering::Less => {
                    next = Some(h);
                    Side::Left
                }
                Ordering::Greater => {
                    prev = Some(h);
                    Side::Right
                }
                Ordering::Equal => {
                    return Ok(Some(mem::replace(&mut node.value, value)));
                }
            };

            path.try_reserve(1)?;
            path.push((slot, side));
            slot = Slot::Child(h, side);
        }

        let priority: u32 = self.rng.random();
        let mut node = Node::new(key, value, priority);
        node.prev = prev;
        node.next = next;
        let inserted = self.nodes.try_insert(node)?;

        self.set_slot(slot, Some(inserted));
        match prev {
            Some(p) => self.nodes[p].next = Some(inserted),
            None => self.head = Some(inserted),
        }
        match next {
            Some(n) => self.nodes[n].prev = Some(inserted),
            None => self.tail = Some(inserted),
        }

        let mut rotations = 0;
        while let Some(&(slot, side)) = path.peek() {
            match self.slot(slot) {
                Some(parent) if priority < self.nodes[parent].priority => {
                    self.rotate(slot, side);
                    path.pop();
                    rotations += 1;
                }
                _ => break,
            }
        }

        self.len += 1;
        trace!(
            "inserted node with priority {} after {} rotations, len {}",
            priority,
            rotations,
            self.len
        );

        #[cfg(test)]
        self.check_invariants();

        Ok(None)
    }

    /// Removes the mapping for `key`, returning its value.
    ///
    /// The node is rotated down towards whichever child has the smaller
    /// priority until it is a leaf, then cut out of both the tree and the
    /// chain. A missing child counts as an infinitely large priority, so the
    /// rotation always heads for a child that exists. Equal priorities send
    /// it right, lifting the child with the greater key.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut slot = Slot::Root;
        let target = loop {
            let h = self.slot(slot).ok_or(Error::NotFound)?;
            match key.cmp(self.nodes[h].key.borrow()) {
                Ordering::Less => slot = Slot::Child(h, Side::Left),
                Ordering::Greater => slot = Slot::Child(h, Side::Right),
                Ordering::Equal => break h,
            }
        };

        let mut rotations = 0;
        loop {
            let (left, right) = (self.nodes[target].left, self.nodes[target].right);
            let (side, pivot) = match (left, right) {
                (None, None) => break,
                (Some(l), None) => (Side::Left, l),
                (None, Some(r)) => (Side::Right, r),
                (Some(l), Some(r)) => {
                    if self.nodes[l].priority < self.nodes[r].priority {
                        (Side::Left, l)
                    } else {
                        (Side::Right, r)
                    }
                }
            };

            // the pivot takes the target's place; the target drops to the
            // pivot's opposite side
            self.rotate(slot, side);
            slot = Slot::Child(pivot, !side);
            rotations += 1;
        }

        self.set_slot(slot, None);
        let node = match self.nodes.release(target) {
            Some(node) => node,
            None => unreachable!("found node vanished from the store"),
        };

        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }

        self.len -= 1;
        trace!(
            "removed node after {} rotations, len {}",
            rotations,
            self.len
        );

        #[cfg(test)]
        self.check_invariants();

        Ok(node.value)
    }

    /// Asserts every structural invariant: strict key order in the tree,
    /// heap order on priorities, a chain that matches the in-order walk in
    /// both directions, and agreement of all the counts.
    #[cfg(test)]
    fn check_invariants(&self) {
        let mut in_order = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cursor = self.root;

        loop {
            while let Some(h) = cursor {
                stack.push(h);
                cursor = self.nodes[h].left;
            }
            match stack.pop() {
                Some(h) => {
                    in_order.push(h);
                    cursor = self.nodes[h].right;
                }
                None => break,
            }
        }

        assert_eq!(self.len, in_order.len());
        assert_eq!(self.len, self.nodes.len());

        for pair in in_order.windows(2) {
            assert!(self.nodes[pair[0]].key < self.nodes[pair[1]].key);
        }

        for &h in &in_order {
            let node = &self.nodes[h];
            for child in node.left.iter().chain(node.right.iter()) {
                assert!(node.priority <= self.nodes[*child].priority);
            }
        }

        let mut expected_prev = None;
        let mut chain = self.head;
        for &h in &in_order {
            assert_eq!(Some(h), chain);
            assert_eq!(expected_prev, self.nodes[h].prev);
            expected_prev = Some(h);
            chain = self.nodes[h].next;
        }
        assert_eq!(None, chain);
        assert_eq!(expected_prev, self.tail);
    }
}

impl<K, V> Default for TreeMap<K, V, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> Clone for TreeMap<K, V, R>
where
    K: Clone,
    V: Clone,
    R: Clone + RngCore + SeedableRng,
{
    /// Copies the tree with its exact shape and priorities. The copy's random
    /// source is seeded from a snapshot of this map's, so the two maps draw
    /// different priorities from here on. Cloning the same map twice gives
    /// copies that draw the same ones.
    fn clone(&self) -> Self {
        let mut snapshot = self.rng.clone();
        let rng = R::from_rng(&mut snapshot);
        let mut copy = Self::with_capacity_and_rng(self.len, rng);
        copy.copy_from(self);
        copy
    }

    /// Replaces this map's contents with a copy of `source`'s. This map keeps
    /// its own random source.
    fn clone_from(&mut self, source: &Self) {
        self.nodes.clear();
        self.copy_from(source);
    }
}

impl<K, V, R> PartialEq for TreeMap<K, V, R>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, R> Eq for TreeMap<K, V, R> {}

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for TreeMap<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, R> IntoIterator for &'a TreeMap<K, V, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, R> Map<K, V> for TreeMap<K, V, R>
where
    K: Ord,
    R: Rng,
{
    fn put(&mut self, k: K, v: V) -> Result<Option<V>> {
        TreeMap::put(self, k, v)
    }

    fn get(&self, k: &K) -> Result<&V> {
        TreeMap::get(self, k)
    }

    fn get_mut(&mut self, k: &K) -> Result<&mut V> {
        TreeMap::get_mut(self, k)
    }

    fn contains_key(&self, k: &K) -> bool {
        TreeMap::contains_key(self, k)
    }

    fn contains_value(&self, v: &V) -> bool
    where
        V: PartialEq,
    {
        TreeMap::contains_value(self, v)
    }

    fn remove(&mut self, k: &K) -> Result<V> {
        TreeMap::remove(self, k)
    }

    fn clear(&mut self) {
        TreeMap::clear(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}
