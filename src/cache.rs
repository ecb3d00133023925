use crate::Stats;
use crate::config::CacheConfig;
use crate::error::{ConfigError, FetchError};
use crate::source::BackingStore;
use parking_lot::Mutex;
use recency_store::RecencyStore;
use stats::Counters;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};
use std::time::Instant;
use tracing::{debug, trace, warn};

mod entry;
mod recency_list;
pub(crate) mod recency_store;
pub(crate) mod stats;

pub(crate) type RandomState = ahash::RandomState;

/// How a successful [CacheFront::fetch_outcome] was served.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Fetched<V> {
    /// The value was resident in the cache.
    Hit(V),
    /// The value was loaded from the backing store and is now cached.
    Loaded(V),
}

impl<V> Fetched<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Fetched::Hit(_))
    }

    pub fn into_value(self) -> V {
        match self {
            Fetched::Hit(value) | Fetched::Loaded(value) => value,
        }
    }
}

/// Thread-safe, exact LRU read-through cache in front of a [BackingStore].
///
/// Reads are served from an in-memory [RecencyStore]; misses are loaded from the backing store
/// and inserted as the most recently used entry. Keys the backing store does not know are
/// reported as [FetchError::NotFound] and never cached.
///
/// The recency store is guarded by a single mutex, since promoting an entry on read mutates the
/// recency order. The lock is released while the backing store is queried, so a slow load never
/// blocks hits on other keys. Two callers missing the same key at once may both load it; the
/// second insert overwrites the first with the same record.
///
/// Wrap the cache in a [`std::sync::Arc`] to share it between threads. All operations only
/// require shared references to the cache.
#[derive(Debug)]
pub struct CacheFront<K, V, B, S = RandomState> {
    store: Mutex<RecencyStore<K, V, S>>,
    backing_store: B,
    capacity: usize,
    counters: Counters,
    metrics_last_accessed: Mutex<Instant>,
}

impl<K, V, B> CacheFront<K, V, B, RandomState>
where
    K: Clone + Eq + Hash,
    V: Clone,
    B: BackingStore<K, V>,
{
    /// Creates a cache holding at most `capacity` entries in front of `backing_store`.
    ///
    /// A capacity of zero is rejected with [ConfigError::ZeroCapacity].
    pub fn with_capacity(capacity: usize, backing_store: B) -> Result<Self, ConfigError> {
        Self::with_capacity_and_hasher(capacity, backing_store, Default::default())
    }

    pub fn from_config(config: &CacheConfig, backing_store: B) -> Result<Self, ConfigError> {
        Self::with_capacity(config.capacity, backing_store)
    }
}

impl<K, V, B, S> CacheFront<K, V, B, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    B: BackingStore<K, V>,
    S: BuildHasher,
{
    /// Creates a cache holding at most `capacity` entries, using `hash_builder` to hash the keys.
    pub fn with_capacity_and_hasher(
        capacity: usize,
        backing_store: B,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        let store = RecencyStore::with_capacity_and_hasher(capacity, hash_builder)?;
        debug!(capacity, "created cache front");

        Ok(Self {
            store: Mutex::new(store),
            backing_store,
            capacity,
            counters: Counters::default(),
            metrics_last_accessed: Mutex::new(Instant::now()),
        })
    }

    /// Returns the value for `key`, loading it from the backing store on a miss.
    ///
    /// This method clones the value when returning it. Consider wrapping your values in
    /// [`std::sync::Arc`] if cloning is too expensive for your use-case.
    pub fn fetch(&self, key: &K) -> Result<V, FetchError<B::Error>>
    where
        K: Debug,
    {
        self.fetch_outcome(key).map(Fetched::into_value)
    }

    /// Like [CacheFront::fetch], but also reports whether the value came from the cache.
    pub fn fetch_outcome(&self, key: &K) -> Result<Fetched<V>, FetchError<B::Error>>
    where
        K: Debug,
    {
        // the guard is a temporary and is dropped before the backing store is queried
        let cached = self.store.lock().get(key);

        if let Some(value) = cached {
            trace!(?key, "cache hit");
            self.counters.increment_hit_count();
            return Ok(Fetched::Hit(value));
        }

        self.counters.increment_miss_count();
        debug!(?key, "cache miss, querying backing store");

        let loaded = self.backing_store.lookup(key).map_err(|err| {
            warn!(?key, error = %err, "backing store lookup failed");
            FetchError::Source(err)
        })?;

        let Some(value) = loaded else {
            debug!(?key, "key not found in backing store");
            self.counters.increment_not_found_count();
            return Err(FetchError::NotFound);
        };

        {
            let mut store = self.store.lock();
            if store.insert(key.clone(), value.clone()).is_some() {
                debug!(?key, "concurrent load already populated the entry, overwrote it");
            }
        }

        Ok(Fetched::Loaded(value))
    }

    /// Reports whether `key` is resident without changing its recency.
    pub fn contains(&self, key: &K) -> bool {
        self.store.lock().contains(key)
    }
}

impl<K, V, B, S> CacheFront<K, V, B, S> {
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the resident keys from most to least recently used.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.store.lock().keys().cloned().collect()
    }

    pub fn backing_store(&self) -> &B {
        &self.backing_store
    }

    /// Returns the counters collected since the previous call and resets them.
    pub fn stats(&self) -> Stats {
        let millis_elapsed = {
            let mut guard = self.metrics_last_accessed.lock();
            let millis_elapsed = guard.elapsed().as_millis();
            *guard = Instant::now();
            millis_elapsed
        };

        let eviction_count = self.store.lock().take_eviction_count();

        Stats {
            hit_count: self.counters.take_hit_count(),
            miss_count: self.counters.take_miss_count(),
            not_found_count: self.counters.take_not_found_count(),
            eviction_count,
            millis_elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryStore;
    use std::io;
    use std::sync::{Arc, Barrier, mpsc};
    use std::thread;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Product {
        id: u32,
        name: String,
    }

    fn product(id: u32, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
        }
    }

    type ProductCache = CacheFront<u32, Product, Arc<InMemoryStore<u32, Product>>>;

    fn catalog() -> Arc<InMemoryStore<u32, Product>> {
        Arc::new(
            [
                (1, product(1, "name1")),
                (2, product(2, "name2")),
                (3, product(3, "name3")),
            ]
            .into_iter()
            .collect(),
        )
    }

    struct FailingStore;

    impl BackingStore<u32, Product> for FailingStore {
        type Error = io::Error;

        fn lookup(&self, _key: &u32) -> Result<Option<Product>, Self::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "database is down"))
        }
    }

    /// Serves the catalog, but parks every lookup of `BLOCKING_KEY` until released.
    struct SlowStore {
        records: Arc<InMemoryStore<u32, Product>>,
        entered: Barrier,
        release: Barrier,
    }

    const BLOCKING_KEY: u32 = 99;

    impl BackingStore<u32, Product> for SlowStore {
        type Error = io::Error;

        fn lookup(&self, key: &u32) -> Result<Option<Product>, Self::Error> {
            if *key == BLOCKING_KEY {
                self.entered.wait();
                self.release.wait();
                return Ok(Some(product(BLOCKING_KEY, "slow")));
            }
            Ok(self.records.lookup(key).unwrap_or_else(|never| match never {}))
        }
    }

    #[test]
    fn it_rejects_zero_capacity() {
        // when
        let result = ProductCache::with_capacity(0, catalog());

        // then
        assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn it_handles_huge_capacity() {
        // given
        let cache = ProductCache::with_capacity(usize::MAX / 2, catalog()).unwrap();

        // when
        let first = cache.fetch_outcome(&1).unwrap();
        let second = cache.fetch_outcome(&1).unwrap();

        // then
        assert_eq!(cache.capacity(), usize::MAX / 2);
        assert!(!first.is_hit());
        assert!(second.is_hit());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn it_builds_from_config() {
        // given
        let config = CacheConfig { capacity: 16 };

        // when
        let cache = ProductCache::from_config(&config, catalog()).unwrap();

        // then
        assert_eq!(cache.capacity(), 16);
        assert!(cache.is_empty());
    }

    #[test_log::test]
    fn it_loads_on_miss_and_hits_afterwards() {
        // given
        let database = catalog();
        let cache = ProductCache::with_capacity(2, Arc::clone(&database)).unwrap();

        // when
        let first = cache.fetch_outcome(&1).unwrap();
        let second = cache.fetch_outcome(&1).unwrap();

        // then
        assert_eq!(first, Fetched::Loaded(product(1, "name1")));
        assert_eq!(second, Fetched::Hit(product(1, "name1")));
        assert_eq!(database.lookup_count(), 1);
    }

    #[test_log::test]
    fn it_reports_not_found_without_caching() {
        // given
        let database = catalog();
        let cache = ProductCache::with_capacity(2, Arc::clone(&database)).unwrap();
        cache.fetch(&1).unwrap();

        // when
        let result = cache.fetch(&42);

        // then
        assert!(matches!(result, Err(FetchError::NotFound)));
        assert!(!cache.contains(&42));
        assert_eq!(cache.keys(), vec![1]);
    }

    #[test]
    fn it_picks_up_records_written_after_a_not_found() {
        // given
        let database = catalog();
        let cache = ProductCache::with_capacity(2, Arc::clone(&database)).unwrap();
        assert!(cache.fetch(&4).unwrap_err().is_not_found());

        // when
        database.insert(4, product(4, "name4"));

        // then
        assert_eq!(cache.fetch(&4).unwrap(), product(4, "name4"));
    }

    #[test]
    fn it_caches_records_with_empty_fields() {
        // given
        let database = Arc::new(InMemoryStore::new());
        database.insert(5, product(5, ""));
        let cache = ProductCache::with_capacity(2, Arc::clone(&database)).unwrap();

        // when
        cache.fetch(&5).unwrap();
        let outcome = cache.fetch_outcome(&5).unwrap();

        // then
        assert!(outcome.is_hit());
        let value = outcome.into_value();
        assert_eq!(value.id, 5);
        assert!(value.name.is_empty());
        assert_eq!(database.lookup_count(), 1);
    }

    #[test_log::test]
    fn it_propagates_backing_store_errors() {
        // given
        let cache = CacheFront::<u32, Product, _>::with_capacity(2, FailingStore).unwrap();

        // when
        let result = cache.fetch(&1);

        // then
        match result {
            Err(FetchError::Source(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused)
            }
            other => panic!("expected a backing store error, got {other:?}"),
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn it_evicts_the_least_recently_used_record() {
        // given
        let database = catalog();
        let cache = ProductCache::with_capacity(2, Arc::clone(&database)).unwrap();

        // when / then
        assert!(!cache.fetch_outcome(&1).unwrap().is_hit());
        assert_eq!(cache.keys(), vec![1]);

        assert!(!cache.fetch_outcome(&2).unwrap().is_hit());
        assert_eq!(cache.keys(), vec![2, 1]);

        assert!(cache.fetch_outcome(&1).unwrap().is_hit());
        assert_eq!(cache.keys(), vec![1, 2]);

        assert!(!cache.fetch_outcome(&3).unwrap().is_hit());
        assert_eq!(cache.keys(), vec![3, 1]);

        let reloaded = cache.fetch_outcome(&2).unwrap();
        assert_eq!(reloaded, Fetched::Loaded(product(2, "name2")));
        assert_eq!(cache.keys(), vec![2, 3]);
        assert_eq!(database.lookup_count(), 4);
    }

    #[test_log::test]
    fn it_serves_hits_while_another_key_is_loading() {
        // given
        let store = SlowStore {
            records: catalog(),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        };
        let cache = Arc::new(CacheFront::<u32, Product, _>::with_capacity(4, store).unwrap());
        cache.fetch(&1).unwrap();

        let loader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.fetch_outcome(&BLOCKING_KEY))
        };
        cache.backing_store().entered.wait();

        // when
        let (sender, receiver) = mpsc::channel();
        let reader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let _ = sender.send(cache.fetch_outcome(&1).map_err(|err| err.to_string()));
            })
        };
        let hit = receiver.recv_timeout(Duration::from_secs(5));

        cache.backing_store().release.wait();
        let loaded = loader.join().unwrap().unwrap();
        reader.join().unwrap();

        // then
        assert_eq!(hit, Ok(Ok(Fetched::Hit(product(1, "name1")))));
        assert_eq!(loaded, Fetched::Loaded(product(BLOCKING_KEY, "slow")));
        assert_eq!(cache.keys(), vec![BLOCKING_KEY, 1]);
    }

    #[test]
    fn it_tolerates_concurrent_loads_of_the_same_key() {
        // given
        let database = catalog();
        let cache = Arc::new(ProductCache::with_capacity(2, Arc::clone(&database)).unwrap());
        let barrier = Arc::new(Barrier::new(8));
        let mut handles = vec![];

        // when
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                cache.fetch(&3)
            }));
        }

        // then
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), product(3, "name3"));
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.keys(), vec![3]);
        assert!(database.lookup_count() >= 1);
        assert!(database.lookup_count() <= 8);
    }

    #[test]
    fn it_is_thread_safe() {
        // given
        let database: Arc<InMemoryStore<u32, u32>> =
            Arc::new((0..100).map(|i| (i, i * 2)).collect());
        let cache = Arc::new(CacheFront::<u32, u32, _>::with_capacity(10, Arc::clone(&database)).unwrap());
        let mut handles = vec![];

        // when
        for t in 0..4u32 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..500u32 {
                    let key = (i * 7 + t) % 100;
                    assert_eq!(cache.fetch(&key).unwrap(), key * 2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // then
        assert!(cache.len() <= 10);
        let stats = cache.stats();
        assert_eq!(stats.hit_count + stats.miss_count, 2_000);
        assert_eq!(stats.miss_count, database.lookup_count());
    }

    #[test]
    fn it_returns_and_resets_stats() {
        // given
        let cache = ProductCache::with_capacity(2, catalog()).unwrap();

        // when
        cache.fetch(&1).unwrap();
        cache.fetch(&1).unwrap();
        cache.fetch(&2).unwrap();
        cache.fetch(&3).unwrap();
        let _ = cache.fetch(&9);

        // then
        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 4);
        assert_eq!(stats.not_found_count, 1);
        assert_eq!(stats.eviction_count, 1);

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.not_found_count, 0);
        assert_eq!(stats.eviction_count, 0);
    }

    #[test]
    fn it_exposes_the_backing_store() {
        // given
        let cache = ProductCache::with_capacity(2, catalog()).unwrap();

        // when
        cache.fetch(&2).unwrap();

        // then
        assert_eq!(cache.backing_store().len(), 3);
        assert_eq!(cache.backing_store().lookup_count(), 1);
    }
}
