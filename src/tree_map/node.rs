use std::ops::{Index, IndexMut, Not};

use crate::error::Result;

/// Alias for the index of a node in the tree's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// Which child link of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A place a subtree can hang from: the root of the map, or one of the child
/// links of a node. Slots stay valid across rotations further down the tree,
/// which is what lets insertion record its descent and walk it back up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Root,
    Child(NodeHandle, Side),
}

/// One key/value mapping. It is simultaneously a vertex in the treap and a
/// link in the chain that threads every node in ascending key order.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,

    /// Heap order: a node's priority is never greater than its children's.
    pub(crate) priority: u32,

    pub(crate) left: Option<NodeHandle>,
    pub(crate) right: Option<NodeHandle>,

    /// Neighbours in key order. `None` stands for the sentinel.
    pub(crate) prev: Option<NodeHandle>,
    pub(crate) next: Option<NodeHandle>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, priority: u32) -> Self {
        Self {
            key,
            value,
            priority,
            left: None,
            right: None,
            prev: None,
            next: None,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Option<NodeHandle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeHandle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Backing storage for tree nodes. Removed nodes leave a hole that goes on the
/// freelist and gets filled by the next allocation.
#[derive(Debug)]
pub(crate) struct NodeStore<K, V> {
    store: Vec<Option<Node<K, V>>>,
    free: Vec<NodeHandle>,
}

impl<K, V> NodeStore<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// Stores a node, reserving room first so that a failed allocation leaves
    /// the store untouched.
    pub(crate) fn try_insert(&mut self, node: Node<K, V>) -> Result<NodeHandle> {
        if self.free.is_empty() {
            self.store.try_reserve(1)?;
            // the freelist must be able to take this slot back without
            // allocating later on
            self.free.try_reserve(self.store.len() + 1)?;
        }

        Ok(self.insert(node))
    }

    /// Stores a node, reusing a freed slot when there is one.
    pub(crate) fn insert(&mut self, node: Node<K, V>) -> NodeHandle {
        match self.free.pop() {
            Some(idx) => {
                self.store[idx.0] = Some(node);
                idx
            }
            None => {
                self.store.push(Some(node));
                NodeHandle(self.store.len() - 1)
            }
        }
    }

    /// Takes a node out of the store, freelisting its slot.
    pub(crate) fn release(&mut self, node: NodeHandle) -> Option<Node<K, V>> {
        let released = self.store.get_mut(node.0).and_then(Option::take);
        if released.is_some() {
            self.free.push(node);
        }
        released
    }

    /// Drops every node. Does not free the underlying buffers.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.store.len()
    }
}

impl<K, V> Index<NodeHandle> for NodeStore<K, V> {
    type Output = Node<K, V>;

    fn index(&self, node: NodeHandle) -> &Node<K, V> {
        match &self.store[node.0] {
            Some(n) => n,
            None => panic!("dangling node handle {:?}", node),
        }
    }
}

impl<K, V> IndexMut<NodeHandle> for NodeStore<K, V> {
    fn index_mut(&mut self, node: NodeHandle) -> &mut Node<K, V> {
        match &mut self.store[node.0] {
            Some(n) => n,
            None => panic!("dangling node handle {:?}", node),
        }
    }
}

/// A run of consecutive nodes in key order, as produced while copying a
/// subtree: the copy of each subtree comes back already chained together, and
/// only its two ends need joining to the neighbouring runs.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Segment {
    pub(crate) first: NodeHandle,
    pub(crate) last: NodeHandle,
}

impl Segment {
    /// Chains `left`, then `mid`, then `right` into one run.
    pub(crate) fn merge<K, V>(
        left: Option<Segment>,
        mid: NodeHandle,
        right: Option<Segment>,
        nodes: &mut NodeStore<K, V>,
    ) -> Segment {
        if let Some(left) = left {
            nodes[left.last].next = Some(mid);
            nodes[mid].prev = Some(left.last);
        }

        if let Some(right) = right {
            nodes[right.first].prev = Some(mid);
            nodes[mid].next = Some(right.first);
        }

        Segment {
            first: left.map_or(mid, |s| s.first),
            last: right.map_or(mid, |s| s.last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeStore, Segment, Side};

    #[test]
    fn test_store_reuses_released_slots() {
        let mut nodes: NodeStore<u8, u8> = NodeStore::with_capacity(2);
        let a = nodes.try_insert(Node::new(1, 1, 0)).unwrap();
        let b = nodes.try_insert(Node::new(2, 2, 0)).unwrap();
        assert_eq!(2, nodes.len());

        assert_eq!(Some(1), nodes.release(a).map(|n| n.key));
        assert!(nodes.release(a).is_none());
        assert_eq!(1, nodes.len());

        let c = nodes.try_insert(Node::new(3, 3, 0)).unwrap();
        assert_eq!(a, c);
        assert_eq!(2, nodes.slots());
        assert_eq!(3, nodes[c].key);
        assert_eq!(2, nodes[b].key);
    }

    #[test]
    fn test_segment_merge_links_both_directions() {
        let mut nodes: NodeStore<u8, ()> = NodeStore::with_capacity(3);
        let a = nodes.insert(Node::new(1, (), 0));
        let b = nodes.insert(Node::new(2, (), 0));
        let c = nodes.insert(Node::new(3, (), 0));

        let left = Segment { first: a, last: a };
        let right = Segment { first: c, last: c };
        let run = Segment::merge(Some(left), b, Some(right), &mut nodes);

        assert_eq!(a, run.first);
        assert_eq!(c, run.last);
        assert_eq!(Some(b), nodes[a].next);
        assert_eq!(Some(c), nodes[b].next);
        assert_eq!(Some(b), nodes[c].prev);
        assert_eq!(Some(a), nodes[b].prev);

        let lone = Segment::merge(None, b, None, &mut nodes);
        assert_eq!(b, lone.first);
        assert_eq!(b, lone.last);
    }

    #[test]
    fn test_side_negation() {
        assert_eq!(Side::Right, !Side::Left);
        assert_eq!(Side::Left, !Side::Right);

        let mut node = Node::new((), (), 0);
        node.set_child(Side::Right, node.left);
        assert_eq!(None, node.child(Side::Right));
    }
}
