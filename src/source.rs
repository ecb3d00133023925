//! The authoritative data source a [`CacheFront`](crate::CacheFront) reads through to.

use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A synchronous, read-only view of the source of truth.
///
/// Implementations handle their own synchronization; the cache calls [BackingStore::lookup]
/// without holding any of its locks and may call it concurrently for the same key.
pub trait BackingStore<K, V> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns `Ok(None)` when the store has no record for `key`.
    fn lookup(&self, key: &K) -> Result<Option<V>, Self::Error>;
}

impl<K, V, T> BackingStore<K, V> for &T
where
    T: BackingStore<K, V> + ?Sized,
{
    type Error = T::Error;

    fn lookup(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).lookup(key)
    }
}

impl<K, V, T> BackingStore<K, V> for Arc<T>
where
    T: BackingStore<K, V> + ?Sized,
{
    type Error = T::Error;

    fn lookup(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).lookup(key)
    }
}

/// Thread-safe in-memory map acting as a backing store.
///
/// Counts how many lookups it has served, which makes duplicate loads observable.
#[derive(Debug)]
pub struct InMemoryStore<K, V, S = RandomState> {
    records: RwLock<HashMap<K, V, S>>,
    lookup_count: AtomicU64,
}

impl<K, V> InMemoryStore<K, V, RandomState> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S> Default for InMemoryStore<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::default()),
            lookup_count: AtomicU64::new(0),
        }
    }
}

impl<K, V, S> InMemoryStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Adds or replaces a record and returns the previous one.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.records.write().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.records.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::Acquire)
    }
}

impl<K, V, S> FromIterator<(K, V)> for InMemoryStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            records: RwLock::new(iter.into_iter().collect()),
            lookup_count: AtomicU64::new(0),
        }
    }
}

impl<K, V, S> BackingStore<K, V> for InMemoryStore<K, V, S>
where
    K: Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    type Error = Infallible;

    fn lookup(&self, key: &K) -> Result<Option<V>, Self::Error> {
        self.lookup_count.fetch_add(1, Ordering::AcqRel);
        Ok(self.records.read().get(key).cloned())
    }
}
