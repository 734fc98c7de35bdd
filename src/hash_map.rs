//! A separately chained hash table. Each bucket is a short vec of entries that
//! happen to hash to the same slot.

use std::{
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
    mem,
};

use log::debug;

use crate::error::{Error, Result};
use crate::map::Map;

type KeyHash = u64;

const INITIAL_BUCKETS: usize = 16;

/// A key and the value stored with it.
#[derive(Clone)]
struct Bucketed<K, V> {
    key: K,
    value: V,
}

/// A hash map with separate chaining. Buckets double whenever the map gets
/// more than three quarters full, so chains stay short on average.
#[derive(Clone)]
pub struct HashMap<K, V, S = RandomState>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    hash_builder: S,
    buckets: Vec<Vec<Bucketed<K, V>>>,
    len: usize,
}

impl<K, V> HashMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Make a new HashMap that can hold `capacity` elements before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hash_builder(capacity, Default::default())
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Makes a new HashMap with a specified capacity and hasher.
    pub fn with_capacity_and_hash_builder(capacity: usize, hash_builder: S) -> Self {
        let wanted = capacity + capacity / 3 + 1;
        let count = wanted.max(INITIAL_BUCKETS).next_power_of_two();

        HashMap {
            hash_builder,
            buckets: (0..count).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.get(k).is_ok()
    }

    pub fn contains_value(&self, v: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, value)| value == v)
    }

    pub fn get(&self, k: &K) -> Result<&V> {
        let bucket = &self.buckets[self.bucket_of(k)];
        bucket
            .iter()
            .find(|e| e.key == *k)
            .map(|e| &e.value)
            .ok_or(Error::NotFound)
    }

    pub fn get_mut(&mut self, k: &K) -> Result<&mut V> {
        let idx = self.bucket_of(k);
        self.buckets[idx]
            .iter_mut()
            .find(|e| e.key == *k)
            .map(|e| &mut e.value)
            .ok_or(Error::NotFound)
    }

    /// Inserts or overwrites the value at `k`, returning the value that was
    /// there before.
    pub fn put(&mut self, k: K, v: V) -> Result<Option<V>> {
        let idx = self.bucket_of(&k);

        // update the entry if it already exists
        if let Some(e) = self.buckets[idx].iter_mut().find(|e| e.key == k) {
            return Ok(Some(mem::replace(&mut e.value, v)));
        }

        if (self.len + 1) * 4 > self.buckets.len() * 3 {
            self.grow()?;
        }

        let idx = self.bucket_of(&k);
        self.buckets[idx].try_reserve(1)?;
        self.buckets[idx].push(Bucketed { key: k, value: v });
        self.len += 1;

        Ok(None)
    }

    pub fn remove(&mut self, k: &K) -> Result<V> {
        let idx = self.bucket_of(k);
        let bucket = &mut self.buckets[idx];
        let pos = bucket
            .iter()
            .position(|e| e.key == *k)
            .ok_or(Error::NotFound)?;

        self.len -= 1;
        Ok(bucket.swap_remove(pos).value)
    }

    /// Removes every entry, keeping the current number of buckets.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Iterates over all entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|e| (&e.key, &e.value)))
    }

    fn hash_k(&self, k: &K) -> KeyHash {
        let mut h = self.hash_builder.build_hasher();
        k.hash(&mut h);
        h.finish()
    }

    fn bucket_of(&self, k: &K) -> usize {
        // bucket counts are powers of two
        (self.hash_k(k) as usize) & (self.buckets.len() - 1)
    }

    /// Doubles the bucket count and rehashes everything. Nothing moves until
    /// the new table has been fully allocated.
    fn grow(&mut self) -> Result<()> {
        let count = self.buckets.len() * 2;
        let mut buckets: Vec<Vec<Bucketed<K, V>>> = Vec::new();
        buckets.try_reserve_exact(count)?;
        buckets.resize_with(count, Vec::new);

        let old = mem::take(&mut self.buckets);
        for e in old.into_iter().flatten() {
            let idx = (self.hash_k(&e.key) as usize) & (count - 1);
            buckets[idx].push(e);
        }

        self.buckets = buckets;
        debug!("rehashed {} entries into {} buckets", self.len, count);
        Ok(())
    }
}

impl<K, V> Default for HashMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for HashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Map<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn put(&mut self, k: K, v: V) -> Result<Option<V>> {
        HashMap::put(self, k, v)
    }

    fn get(&self, k: &K) -> Result<&V> {
        HashMap::get(self, k)
    }

    fn get_mut(&mut self, k: &K) -> Result<&mut V> {
        HashMap::get_mut(self, k)
    }

    fn contains_value(&self, v: &V) -> bool
    where
        V: PartialEq,
    {
        HashMap::contains_value(self, v)
    }

    fn remove(&mut self, k: &K) -> Result<V> {
        HashMap::remove(self, k)
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasher, Hasher};

    use super::HashMap;
    use crate::{Error, Map};

    /// Sends every key to the same bucket, so every operation has to walk
    /// a chain.
    #[derive(Clone, Default)]
    struct Collide;

    struct CollideHasher;

    impl Hasher for CollideHasher {
        fn write(&mut self, _bytes: &[u8]) {}

        fn finish(&self) -> u64 {
            0
        }
    }

    impl BuildHasher for Collide {
        type Hasher = CollideHasher;

        fn build_hasher(&self) -> Self::Hasher {
            CollideHasher
        }
    }

    #[test]
    fn test_put_get_remove() {
        let mut map: HashMap<String, usize> = HashMap::new();

        assert_eq!(Ok(None), map.put("a".to_owned(), 1));
        assert_eq!(Ok(None), map.put("b".to_owned(), 2));
        assert_eq!(Ok(Some(1)), map.put("a".to_owned(), 3));
        assert_eq!(2, map.len());

        assert_eq!(Ok(&3), map.get(&"a".to_owned()));
        assert!(map.contains_value(&2));
        assert!(!map.contains_value(&1));

        assert_eq!(Ok(2), map.remove(&"b".to_owned()));
        assert_eq!(Err(Error::NotFound), map.remove(&"b".to_owned()));
        assert_eq!(Err(Error::NotFound), map.get(&"b".to_owned()));
        assert_eq!(1, map.len());
    }

    #[test]
    fn test_growth_keeps_every_entry() {
        let mut map = HashMap::with_capacity(2);
        for i in 0..1_000u32 {
            map.put(i, i * 3).unwrap();
        }

        assert_eq!(1_000, map.len());
        assert!(map.buckets.len() * 3 >= map.len() * 4);
        for i in 0..1_000u32 {
            assert_eq!(Ok(&(i * 3)), map.get(&i));
        }
        assert_eq!(1_000, map.iter().count());
    }

    #[test]
    fn test_colliding_keys_share_a_chain() {
        let mut map = HashMap::with_capacity_and_hash_builder(4, Collide);
        for i in 0..10u8 {
            map.put(i, i).unwrap();
        }

        *map.get_mut(&4).unwrap() = 40;
        assert_eq!(Ok(40), map.remove(&4));
        assert!(!map.contains_key(&4));
        for i in (0..10u8).filter(|i| *i != 4) {
            assert_eq!(Ok(&i), map.get(&i));
        }

        map.clear();
        assert!(map.is_empty());
        assert_eq!(0, map.iter().count());
        assert_eq!(format!("{:?}", map), "{}");
    }

    #[test]
    fn test_through_the_map_trait() {
        fn exercise<M: Map<u32, char>>(m: &mut M) {
            m.put(7, 'x').unwrap();
            assert_eq!(Ok(&'x'), m.get(&7));
            assert!(m.contains_key(&7));
            assert!(!m.is_empty());
            assert_eq!(Ok('x'), m.remove(&7));
            assert!(m.is_empty());
        }

        exercise(&mut HashMap::new());
    }
}
