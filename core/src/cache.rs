//! Time-bounded memoization of chart builders.
//!
//! A cached value is reused for the same key until `ttl` has elapsed since it was computed, after
//! which the next request recomputes and replaces it. Stale entries are only ever replaced, never
//! swept.

//----------------------------------------------------------------------------------------- std lib
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};
//--------------------------------------------------------------------------------- other libraries
use log::{debug, trace};

/// Identifies one invocation of a builder: its name plus the `Debug` rendering of its arguments.
///
/// Anything that changes a builder's output must be part of its arguments, including the dataset
/// snapshot id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    builder: &'static str,
    args: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(builder: &'static str, args: &impl Debug) -> Self {
        Self {
            builder,
            args: format!("{args:?}"),
        }
    }

    #[must_use]
    pub const fn builder(&self) -> &'static str {
        self.builder
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    computed_at: Instant,
}

#[derive(Debug)]
pub struct ChartCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry<V>>>,
}

impl<V> ChartCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Return the fresh value for `key`, or compute, store, and return a new one.
    ///
    /// The lock is not held while `compute` runs, so two callers racing on the same stale key
    /// may both compute; the later result wins.
    pub fn get_or_compute(&self, key: CacheKey, compute: impl FnOnce() -> V) -> Arc<V> {
        self.get_or_compute_at(key, Instant::now(), compute)
    }

    /// Memoize `compute` under `builder` and `args`.
    pub fn memoize<A: Debug>(
        &self,
        builder: &'static str,
        args: &A,
        compute: impl FnOnce() -> V,
    ) -> Arc<V> {
        self.get_or_compute(CacheKey::new(builder, args), compute)
    }

    pub(crate) fn get_or_compute_at(
        &self,
        key: CacheKey,
        now: Instant,
        compute: impl FnOnce() -> V,
    ) -> Arc<V> {
        if let Some(value) = self.fresh(&key, now) {
            trace!("Cache hit for {}", key.builder);
            return value;
        }

        debug!("Cache miss for {}, computing", key.builder);
        let value = Arc::new(compute());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key,
                Entry {
                    value: Arc::clone(&value),
                    computed_at: now,
                },
            );
        value
    }

    fn fresh(&self, key: &CacheKey, now: Instant) -> Option<Arc<V>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.computed_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_reuses_within_ttl() {
        let cache = ChartCache::new(TTL);
        let calls = Cell::new(0);
        let start = Instant::now();
        let compute = || {
            calls.set(calls.get() + 1);
            calls.get()
        };

        let first = cache.get_or_compute_at(CacheKey::new("genres", &(1, "a")), start, compute);
        let second = cache.get_or_compute_at(
            CacheKey::new("genres", &(1, "a")),
            start + Duration::from_secs(299),
            compute,
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_recomputes_after_ttl() {
        let cache = ChartCache::new(TTL);
        let calls = Cell::new(0);
        let start = Instant::now();
        let compute = || {
            calls.set(calls.get() + 1);
            calls.get()
        };

        let first = cache.get_or_compute_at(CacheKey::new("genres", &1), start, compute);
        let later = cache.get_or_compute_at(CacheKey::new("genres", &1), start + TTL, compute);

        assert!(!Arc::ptr_eq(&first, &later));
        assert_eq!((*first, *later), (1, 2));

        // the recomputed value is what gets reused afterwards
        let again = cache.get_or_compute_at(
            CacheKey::new("genres", &1),
            start + TTL + Duration::from_secs(1),
            compute,
        );
        assert!(Arc::ptr_eq(&later, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_arguments_are_distinct_entries() {
        let cache = ChartCache::new(TTL);
        let a = cache.memoize("duration", &(0.0, 50.0), || "low");
        let b = cache.memoize("duration", &(50.0, 100.0), || "high");
        let c = cache.memoize("genres", &(0.0, 50.0), || "other builder");

        assert_eq!((*a, *b, *c), ("low", "high", "other builder"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_zero_ttl_never_reuses() {
        let cache = ChartCache::new(Duration::ZERO);
        let now = Instant::now();
        let first = cache.get_or_compute_at(CacheKey::new("x", &()), now, || 1);
        let second = cache.get_or_compute_at(CacheKey::new("x", &()), now, || 2);
        assert_eq!((*first, *second), (1, 2));
    }

    #[test]
    fn test_clear() {
        let cache = ChartCache::new(TTL);
        let _ = cache.memoize("x", &1, || 1);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
