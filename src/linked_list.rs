//! A doubly linked list that flattens all its nodes onto a Vec for storage,
//! gaining data locality at the expense of never giving memory back until it
//! is dropped or cleared.

use std::{fmt, iter::FromIterator, mem};

use crate::error::{Error, Result};
use crate::stack::Stack;

/// Alias for the index of a node in the linked list's storage vec. Handles
/// stay valid until the node they point at is removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeHandle(usize);

/// Slot zero of the store is never handed out: it is the sentinel that sits
/// one before the front and one past the back of the list.
const SENTINEL: NodeHandle = NodeHandle(0);

/// A node that lives in a linked list.
#[derive(Clone)]
struct Node<T> {
    /// The value being stored. `None` for the sentinel and for freed slots.
    value: Option<T>,

    /// The index of the node previous to this one.
    prev: NodeHandle,

    /// The index of the next node in the list.
    next: NodeHandle,
}

/// A circular doubly linked list anchored on a sentinel node. It has a single
/// contiguous Vec of nodes, which are addressed by their position in the Vec,
/// and it freelists elements that have been removed.
///
/// Leaking a NodeHandle outside the list is what makes O(1) removal from the
/// middle possible: hang on to the handle `push_back` gave you and pass it to
/// `remove_node` later.
#[derive(Clone)]
pub struct LinkedList<T> {
    /// The nodes in the list, sentinel first.
    store: Vec<Node<T>>,

    /// Entries in the list which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// How many live nodes there are.
    len: usize,
}

impl<T> LinkedList<T> {
    /// Creates a new, empty linked list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new linked list with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut store = Vec::with_capacity(capacity + 1);
        store.push(Node {
            value: None,
            prev: SENTINEL,
            next: SENTINEL,
        });

        Self {
            store,
            free: Vec::new(),
            len: 0,
        }
    }

    /// The length of this linked list.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends t to the back of the list and returns a handle to the node.
    pub fn push_back(&mut self, t: T) -> NodeHandle {
        let last = self.store[SENTINEL.0].prev;
        self.link_after(last, t)
    }

    /// Pushes t onto the front of the list and returns a handle to the node.
    pub fn push_front(&mut self, t: T) -> NodeHandle {
        self.link_after(SENTINEL, t)
    }

    /// Pops the back node off the list if it exists.
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.store[SENTINEL.0].prev;
        self.remove_node(last).ok()
    }

    /// Pops the front node off the list if it exists.
    pub fn pop_front(&mut self) -> Option<T> {
        let first = self.store[SENTINEL.0].next;
        self.remove_node(first).ok()
    }

    /// Like `pop_front`, but an empty list is an error.
    pub fn remove_first(&mut self) -> Result<T> {
        self.pop_front().ok_or(Error::NotFound)
    }

    /// Like `pop_back`, but an empty list is an error.
    pub fn remove_last(&mut self) -> Result<T> {
        self.pop_back().ok_or(Error::NotFound)
    }

    /// The head of this linked list.
    pub fn front(&self) -> Option<&T> {
        // the sentinel holds no value, so an empty list falls out naturally
        self.store[self.store[SENTINEL.0].next.0].value.as_ref()
    }

    /// The tail of this linked list.
    pub fn back(&self) -> Option<&T> {
        self.store[self.store[SENTINEL.0].prev.0].value.as_ref()
    }

    /// Positional access. Walks from whichever end is closer.
    pub fn get(&self, index: usize) -> Result<&T> {
        let node = self.handle_at(index)?;
        self.store[node.0].value.as_ref().ok_or(Error::NotFound)
    }

    /// Overwrites the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, t: T) -> Result<T> {
        let node = self.handle_at(index)?;
        match self.store[node.0].value.as_mut() {
            Some(value) => Ok(mem::replace(value, t)),
            None => Err(Error::NotFound),
        }
    }

    /// Inserts t so that it ends up at position `index`, shifting everything
    /// from there on back by one. `index` may be `len`, which appends.
    pub fn insert(&mut self, index: usize, t: T) -> Result<NodeHandle> {
        let at = if index == self.len {
            self.store[SENTINEL.0].prev
        } else {
            self.store[self.handle_at(index)?.0].prev
        };

        Ok(self.link_after(at, t))
    }

    /// Removes the element at `index` and returns it.
    pub fn remove_index(&mut self, index: usize) -> Result<T> {
        let node = self.handle_at(index)?;
        self.remove_node(node)
    }

    /// Removes the first element equal to `t`. Returns whether there was one.
    pub fn remove_item(&mut self, t: &T) -> bool
    where
        T: PartialEq,
    {
        let mut cursor = self.store[SENTINEL.0].next;
        while cursor != SENTINEL {
            if self.store[cursor.0].value.as_ref() == Some(t) {
                return self.remove_node(cursor).is_ok();
            }
            cursor = self.store[cursor.0].next;
        }

        false
    }

    /// Keeps only the elements `keep` says yes to, in order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.store[SENTINEL.0].next;
        while cursor != SENTINEL {
            // read the successor first, the slot is freelisted on removal
            let next = self.store[cursor.0].next;
            let doomed = match self.store[cursor.0].value.as_ref() {
                Some(value) => !keep(value),
                None => false,
            };
            if doomed {
                let _ = self.remove_node(cursor);
            }
            cursor = next;
        }
    }

    /// Gets the element a handle points at.
    pub fn get_node(&self, node: NodeHandle) -> Option<&T> {
        self.store.get(node.0).and_then(|n| n.value.as_ref())
    }

    /// Remove an arbitrary node from the list, returning its value. Fails if
    /// the handle doesn't point at a live node.
    pub fn remove_node(&mut self, node: NodeHandle) -> Result<T> {
        if node == SENTINEL {
            return Err(Error::NotFound);
        }

        let (value, prev, next) = match self.store.get_mut(node.0) {
            Some(n) => match n.value.take() {
                Some(value) => (value, n.prev, n.next),
                None => return Err(Error::NotFound),
            },
            None => return Err(Error::NotFound),
        };

        // link prev to next and next to prev so node doesn't exist in the
        // chain anymore; it'll get overwritten at some later push by placing
        // its handle on the freelist
        self.store[prev.0].next = next;
        self.store[next.0].prev = prev;
        self.free.push(node);
        self.len -= 1;

        #[cfg(test)]
        self.continuity_test();

        Ok(value)
    }

    pub fn contains(&self, t: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|v| v == t)
    }

    /// Clears this linked list. Does not free the underlying buffers.
    pub fn clear(&mut self) {
        self.store.truncate(1);
        self.store[SENTINEL.0].prev = SENTINEL;
        self.store[SENTINEL.0].next = SENTINEL;
        self.free.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.store[SENTINEL.0].next,
            back: self.store[SENTINEL.0].prev,
            remaining: self.len,
        }
    }

    /// Reserves room so that the next `additional` pushes never allocate, and
    /// neither does freelisting every node afterwards.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let slots = self.store.len().saturating_add(additional);
        self.store
            .try_reserve(additional.saturating_sub(self.free.len()))?;
        self.free.try_reserve(slots.saturating_sub(self.free.len()))?;
        Ok(())
    }

    /// The handle of the node at position `index`, walking from whichever end
    /// is closer.
    fn handle_at(&self, index: usize) -> Result<NodeHandle> {
        if index >= self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        let mut cursor;
        if index < self.len / 2 {
            cursor = self.store[SENTINEL.0].next;
            for _ in 0..index {
                cursor = self.store[cursor.0].next;
            }
        } else {
            cursor = self.store[SENTINEL.0].prev;
            for _ in 0..self.len - 1 - index {
                cursor = self.store[cursor.0].prev;
            }
        }

        Ok(cursor)
    }

    /// Splices a new node in directly after `at`.
    fn link_after(&mut self, at: NodeHandle, t: T) -> NodeHandle {
        let next = self.store[at.0].next;
        let node = Node {
            value: Some(t),
            prev: at,
            next,
        };

        // use the first available location in the storage vec, or append
        let idx = match self.free.pop() {
            Some(idx) => {
                self.store[idx.0] = node;
                idx
            }
            None => {
                self.store.push(node);
                NodeHandle(self.store.len() - 1)
            }
        };

        self.store[at.0].next = idx;
        self.store[next.0].prev = idx;
        self.len += 1;

        #[cfg(test)]
        self.continuity_test();

        return idx;
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        let mut count = 0;
        let mut cursor = SENTINEL;

        // walk the chain forwards, checking every back-link on the way
        loop {
            let next = self.store[cursor.0].next;
            assert_eq!(cursor, self.store[next.0].prev);
            if next == SENTINEL {
                break;
            }
            assert!(self.store[next.0].value.is_some());
            count += 1;
            assert!(count <= self.len);
            cursor = next;
        }

        assert_eq!(self.len, count);
        assert_eq!(self.len + self.free.len() + 1, self.store.len());
        assert_eq!(self.len, self.iter().rev().count());
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> for LinkedList<T> {
    fn push(&mut self, t: T) {
        self.push_back(t);
    }

    fn pop(&mut self) -> Option<T> {
        self.pop_back()
    }

    fn peek(&self) -> Option<&T> {
        self.back()
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedList::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for LinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for t in iter {
            self.push_back(t);
        }
    }
}

/// Walks a list front to back (or back to front, with `rev`).
pub struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    front: NodeHandle,
    back: NodeHandle,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.list.store[self.front.0];
        self.front = node.next;
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.list.store[self.back.0];
        self.back = node.prev;
        self.remaining -= 1;
        node.value.as_ref()
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
