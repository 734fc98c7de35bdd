//! Thread sharing for the maps in this crate. `TreeMap` and `HashMap` keep no
//! locks of their own, and a `TreeMap` even rotates nodes on insert, so any
//! map reached from more than one thread has to be serialized from outside.
//! This is that outside.

use parking_lot::RwLock;
use std::{marker::PhantomData, sync::Arc};

use crate::error::Result;
use crate::map::Map;

/// Wrapper for a Map which is shareable across thread boundaries.
///
/// Writers (`put`, `remove`, `clear`) take the lock exclusively. Lookups on
/// either map never restructure anything, so readers share the lock and run
/// concurrently. Borrowing iterators can't be handed out through the lock;
/// values come back cloned instead.
pub struct SharedMap<M, K, V>(Arc<RwLock<M>>, PhantomData<K>, PhantomData<V>)
where
    M: Map<K, V>,
    V: Clone;

impl<M, K, V> SharedMap<M, K, V>
where
    M: Map<K, V>,
    V: Clone,
{
    /// Wraps a map into a shared map accessor, making it safe to move across
    /// thread boundaries. Enforces an additional constraint of Clone on
    /// values.
    pub fn with_map(map: M) -> Self {
        Self(Arc::from(RwLock::from(map)), PhantomData, PhantomData)
    }

    /// Inserts an item into the map, returning the value it replaced.
    pub fn put(&self, k: K, v: V) -> Result<Option<V>> {
        self.0.write().put(k, v)
    }

    /// Get an item from the map. This clones it to minimize the lock time of
    /// the map. A missing key is `Error::NotFound`, as on the bare map.
    pub fn get(&self, k: &K) -> Result<V> {
        self.0.read().get(k).map(|v| v.clone())
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.0.read().contains_key(k)
    }

    /// Whether any key maps to `v`. Holds the read lock for a full scan.
    pub fn contains_value(&self, v: &V) -> bool
    where
        V: PartialEq,
    {
        self.0.read().contains_value(v)
    }

    /// Remove an item from the map, returning the removed item if it existed.
    pub fn remove(&self, k: &K) -> Result<V> {
        self.0.write().remove(k)
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// The number of elements in the map at present.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl<M, K, V> Clone for SharedMap<M, K, V>
where
    M: Map<K, V>,
    V: Clone,
{
    fn clone(&self) -> Self {
        SharedMap(self.0.clone(), PhantomData, PhantomData)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::{Error, HashMap, SharedMap, TreeMap};

    #[test]
    fn test_share_tree_map_across_threads() {
        let map: SharedMap<TreeMap<usize, usize>, usize, usize> =
            SharedMap::with_map(TreeMap::with_seed(1));
        map.put(1, 1).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let thread_map = map.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        thread_map.put(100 + t * 50 + i, i).unwrap();
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }

        let thread_map = map.clone();
        let r = thread::spawn(move || thread_map.get(&1)).join();

        assert_eq!(Ok(1), r.unwrap());
        assert_eq!(201, map.len());
        assert_eq!(Ok(49), map.get(&299));
    }

    #[test]
    fn test_hash_map_behind_the_lock() {
        let map: SharedMap<HashMap<u8, String>, u8, String> =
            SharedMap::with_map(HashMap::new());

        assert_eq!(Ok(None), map.put(1, "one".to_owned()));
        assert!(map.contains_key(&1));
        assert!(map.contains_value(&"one".to_owned()));
        assert_eq!(Ok("one".to_owned()), map.remove(&1));
        assert!(!map.contains_value(&"one".to_owned()));
        assert_eq!(Err(Error::NotFound), map.get(&1));

        map.put(2, "two".to_owned()).unwrap();
        map.clear();
        assert!(map.is_empty());
    }
}
