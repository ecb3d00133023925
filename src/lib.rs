//! A thread-safe, exact least-recently-used cache that reads through to a slower source of truth.
//!
//! [`CacheFront`] keeps up to `capacity` records in memory. A fetch that finds its key is served
//! from memory and promotes the entry; a fetch that misses queries the [`BackingStore`], caches
//! the record and returns it. Keys the backing store does not know surface as
//! [`FetchError::NotFound`] and are never cached.
//!
//! # Features
//!
//! - Exact LRU eviction with O(1) `get` and `insert`
//! - Thread-safe by default - no need for explicit synchronization
//! - The cache lock is never held while the backing store is queried
//! - No unsafe code
//!
//! # Examples
//!
//! Reading through to an in-memory store:
//!
//! ```rust
//! use lru_front::{CacheFront, FetchError, Fetched, InMemoryStore};
//! use std::sync::Arc;
//!
//! let database = Arc::new(InMemoryStore::new());
//! database.insert(1, "first record");
//! database.insert(2, "second record");
//!
//! let cache = CacheFront::with_capacity(2, Arc::clone(&database)).unwrap();
//!
//! assert_eq!(cache.fetch_outcome(&1).unwrap(), Fetched::Loaded("first record"));
//! assert_eq!(cache.fetch_outcome(&1).unwrap(), Fetched::Hit("first record"));
//! assert!(matches!(cache.fetch(&3), Err(FetchError::NotFound)));
//! ```
//!
//! Using the recency store on its own:
//!
//! ```rust
//! use lru_front::RecencyStore;
//!
//! let mut store = RecencyStore::with_capacity(2).unwrap();
//! store.insert("key1", "value1");
//! store.insert("key2", "value2");
//!
//! // reading key1 makes key2 the least recently used entry
//! assert_eq!(store.get("key1"), Some("value1"));
//! store.insert("key3", "value3");
//!
//! assert_eq!(store.get("key2"), None);
//! assert_eq!(store.keys().copied().collect::<Vec<_>>(), vec!["key3", "key1"]);
//! ```
//!
//! Sharing the cache between threads:
//!
//! ```rust
//! use lru_front::{CacheFront, InMemoryStore};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let database: InMemoryStore<u32, String> =
//!     (0..10).map(|id| (id, format!("record {id}"))).collect();
//! let cache = Arc::new(CacheFront::with_capacity(4, database).unwrap());
//!
//! let cache_in_arc = Arc::clone(&cache);
//! let handle = thread::spawn(move || cache_in_arc.fetch(&7).unwrap());
//!
//! assert_eq!(handle.join().unwrap(), "record 7");
//! assert_eq!(cache.fetch(&7).unwrap(), "record 7");
//! ```

#![forbid(unsafe_code)]
pub mod cache;
pub mod config;
pub mod error;
pub mod source;

pub use cache::recency_store::RecencyStore;
pub use cache::stats::Stats;
pub use cache::{CacheFront, Fetched};
pub use config::CacheConfig;
pub use error::{ConfigError, FetchError};
pub use source::{BackingStore, InMemoryStore};
