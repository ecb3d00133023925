use std::sync::atomic::{AtomicU64, Ordering};

/// Counters gathered since the previous call to [`CacheFront::stats`](crate::CacheFront::stats).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Stats {
    /// Fetches answered from the cache.
    pub hit_count: u64,
    /// Fetches that had to query the backing store.
    pub miss_count: u64,
    /// Misses the backing store had no record for.
    pub not_found_count: u64,
    /// Entries dropped to make room for new ones.
    pub eviction_count: u64,
    pub millis_elapsed: u128,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    not_found_count: AtomicU64,
}

impl Counters {
    /// Returns the hit count and resets it in one step.
    pub(crate) fn take_hit_count(&self) -> u64 {
        self.hit_count.swap(0, Ordering::AcqRel)
    }

    pub(crate) fn take_miss_count(&self) -> u64 {
        self.miss_count.swap(0, Ordering::AcqRel)
    }

    pub(crate) fn take_not_found_count(&self) -> u64 {
        self.not_found_count.swap(0, Ordering::AcqRel)
    }

    pub(crate) fn increment_hit_count(&self) {
        self.hit_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn increment_miss_count(&self) {
        self.miss_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn increment_not_found_count(&self) {
        self.not_found_count.fetch_add(1, Ordering::AcqRel);
    }
}
