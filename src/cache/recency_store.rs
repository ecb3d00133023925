use crate::cache::RandomState;
use crate::cache::entry::Entry;
use crate::cache::recency_list::RecencyList;
use crate::error::ConfigError;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::num::NonZero;

// Upper bound for up-front allocation; larger stores grow as entries arrive.
const MAX_PREALLOCATED: usize = 1024;

/// Fixed-capacity map that evicts the least recently used entry when full.
///
/// Every key in the index points at exactly one slot of the recency list and every slot is
/// referenced by exactly one key. [RecencyStore::get] and [RecencyStore::insert] move the touched
/// entry to the front; eviction always takes the back.
///
/// The store itself is not synchronized. [`CacheFront`](crate::CacheFront) wraps it in a mutex.
#[derive(Debug)]
pub struct RecencyStore<K, V, S = RandomState> {
    index: HashMap<K, usize, S>,
    entries: RecencyList<Entry<K, V>>,
    capacity: NonZero<usize>,
    eviction_count: u64,
}

impl<K, V> RecencyStore<K, V, RandomState>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty store holding at most `capacity` entries.
    ///
    /// A capacity of zero is rejected with [ConfigError::ZeroCapacity].
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> RecencyStore<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty store holding at most `capacity` entries, using `hash_builder` to hash
    /// the keys.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, ConfigError> {
        let capacity = NonZero::new(capacity).ok_or(ConfigError::ZeroCapacity)?;
        let preallocated = capacity.get().min(MAX_PREALLOCATED);

        Ok(Self {
            index: HashMap::with_capacity_and_hasher(preallocated, hash_builder),
            entries: RecencyList::with_capacity(preallocated),
            capacity,
            eviction_count: 0,
        })
    }

    /// Returns a clone of the value for `key` and marks the entry as most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let index = *self.index.get(key)?;
        if !self.entries.move_to_front(index) {
            return None;
        }
        self.entries.get(index).map(|entry| entry.value().clone())
    }

    /// Returns a reference to the value for `key` without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = *self.index.get(key)?;
        self.entries.get(index).map(Entry::value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Inserts a key-value pair as the most recently used entry.
    ///
    /// If the store did not have this key present, [`None`] is returned and the least recently
    /// used entry is evicted when the store is full.
    ///
    /// If the store did have this key present, the value is updated, and the old value is
    /// returned. Nothing is evicted in that case.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&index) = self.index.get(&key) {
            self.entries.move_to_front(index);
            return self
                .entries
                .get_mut(index)
                .map(|entry| entry.replace_value(value));
        }

        if self.entries.len() >= self.capacity.get() {
            self.evict();
        }

        let index = self.entries.push_front(Entry::new(key.clone(), value));
        self.index.insert(key, index);

        None
    }

    /// Removes `key` from both the index and the recency list.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.index.remove(key)?;
        self.entries
            .remove(index)
            .map(|entry| entry.into_parts().1)
    }

    fn evict(&mut self) {
        if let Some(entry) = self.entries.pop_back() {
            self.index.remove(entry.key());
            self.eviction_count += 1;
        }
    }
}

impl<K, V, S> RecencyStore<K, V, S> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Resident keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(Entry::key)
    }

    /// Returns the number of evictions since the last call and resets the counter.
    pub fn take_eviction_count(&mut self) -> u64 {
        std::mem::take(&mut self.eviction_count)
    }
}
