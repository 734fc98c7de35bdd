use crate::error::Result;

/// Describes what a map is.
pub trait Map<K, V> {
    /// Associates `v` with `k`. Returns the previous value if the key already
    /// had one, in which case nothing but the value changes.
    fn put(&mut self, k: K, v: V) -> Result<Option<V>>;

    /// Get the value stored at `k`, or [`Error::NotFound`].
    ///
    /// [`Error::NotFound`]: crate::Error::NotFound
    fn get(&self, k: &K) -> Result<&V>;

    /// Get a mutable reference to the value stored at `k`.
    fn get_mut(&mut self, k: &K) -> Result<&mut V>;

    /// Whether there is a mapping for `k`.
    fn contains_key(&self, k: &K) -> bool {
        self.get(k).is_ok()
    }

    /// Whether one or more keys map to `v`. This is a full scan.
    fn contains_value(&self, v: &V) -> bool
    where
        V: PartialEq;

    /// Bust a move, returning whatever was there.
    fn remove(&mut self, k: &K) -> Result<V>;

    /// Removes every mapping.
    fn clear(&mut self);

    /// The number of mappings stored right now.
    fn len(&self) -> usize;

    /// Whether the map holds no mappings at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
