use super::node::NodeHandle;
use super::TreeMap;
use crate::error::{Error, Result};

/// A by-value snapshot of one mapping. Handing these out instead of references
/// means nothing outside the map ever points into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<Entry<K, V>> for (K, V) {
    fn from(entry: Entry<K, V>) -> Self {
        entry.into_pair()
    }
}

/// Borrowing iterator over a [`TreeMap`] in ascending key order. Runs off the
/// sorted chain, so a full pass is O(n) whatever shape the tree is in.
pub struct Iter<'a, K, V, R> {
    pub(super) map: &'a TreeMap<K, V, R>,
    pub(super) front: Option<NodeHandle>,
    pub(super) back: Option<NodeHandle>,
    pub(super) remaining: usize,
}

impl<'a, K, V, R> Iterator for Iter<'a, K, V, R> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.map.nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, R> DoubleEndedIterator for Iter<'a, K, V, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.map.nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V, R> ExactSizeIterator for Iter<'a, K, V, R> {}

/// A cursor over a [`TreeMap`] that starts parked on the sentinel, before the
/// smallest key. Each step moves it to the successor and hands back a copy of
/// that mapping.
pub struct Cursor<'a, K, V, R> {
    pub(super) map: &'a TreeMap<K, V, R>,

    /// `None` is the sentinel.
    pub(super) position: Option<NodeHandle>,
}

impl<'a, K, V, R> Cursor<'a, K, V, R> {
    fn successor(&self) -> Option<NodeHandle> {
        match self.position {
            None => self.map.head,
            Some(node) => self.map.nodes[node].next,
        }
    }

    /// True while the next step wouldn't land back on the sentinel.
    pub fn has_next(&self) -> bool {
        self.successor().is_some()
    }

    /// Advances to the successor and returns its mapping, or
    /// [`Error::NotFound`] once the cursor has passed the largest key.
    pub fn next_entry(&mut self) -> Result<Entry<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        let next = self.successor().ok_or(Error::NotFound)?;
        self.position = Some(next);

        let node = &self.map.nodes[next];
        Ok(Entry::new(node.key.clone(), node.value.clone()))
    }
}
