use crate::cache::RandomState;
use crate::cache::lru::Lru;
use crate::cache::stats::{Counters, Stats};
use crate::cache::PutResult;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

/// One independently locked slice of the cache.
///
/// Every operation holds the lock for its whole duration, so compound steps such as
/// [`Shard::put_if_absent`] are atomic with respect to other callers of the same shard.
#[derive(Debug)]
pub(crate) struct Shard<K, V, S = RandomState> {
    state: Mutex<State<K, V, S>>,
}

#[derive(Debug)]
struct State<K, V, S> {
    lru: Lru<K, V, S>,
    counters: Counters,
}

impl<K, V, S> Shard<K, V, S>
where
    S: BuildHasher,
{
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            state: Mutex::new(State {
                lru: Lru::with_capacity_and_hasher(capacity, hash_builder),
                counters: Counters::default(),
            }),
        }
    }
}

impl<K, V, S> Shard<K, V, S> {
    pub(crate) fn len(&self) -> usize {
        self.state.lock().lru.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.state.lock().lru.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.state.lock().lru.capacity()
    }

    pub(crate) fn clear(&self) {
        self.state.lock().lru.clear();
    }

    pub(crate) fn drain_counters(&self, stats: &mut Stats) {
        self.state.lock().counters.drain_into(stats);
    }
}

impl<K, V, S> Shard<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.state.lock().lru.contains(key)
    }

    pub(crate) fn insert(&self, key: K, value: V) {
        let mut state = self.state.lock();
        Self::insert_locked(&mut state, key, value);
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut state = self.state.lock();
        let State { lru, counters } = &mut *state;

        match lru.get(key) {
            Some(value) => {
                counters.record_hit();
                Some(value.clone())
            }
            None => {
                counters.record_miss();
                None
            }
        }
    }

    pub(crate) fn put_if_absent(&self, key: K, value: V) -> PutResult<V> {
        let mut state = self.state.lock();

        match state.lru.get(&key).cloned() {
            Some(existing) => {
                state.counters.record_hit();
                PutResult::Present(existing)
            }
            None => {
                state.counters.record_miss();
                Self::insert_locked(&mut state, key, value);
                PutResult::Inserted
            }
        }
    }

    pub(crate) fn evict<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.state.lock().lru.evict(key)
    }

    fn insert_locked(state: &mut State<K, V, S>, key: K, value: V) {
        if state.lru.insert(key, value).is_some() {
            state.counters.record_eviction();
            tracing::trace!(
                capacity = state.lru.capacity(),
                "evicted least recently used entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn shard(capacity: usize) -> Shard<&'static str, u32> {
        Shard::with_capacity_and_hasher(capacity, RandomState::default())
    }

    #[test]
    fn it_reports_inserted_for_absent_keys() {
        // given
        let shard = shard(2);

        // when
        let result = shard.put_if_absent("a", 1);

        // then
        assert_eq!(result, PutResult::Inserted);
        assert_eq!(shard.get("a"), Some(1));
    }

    #[test]
    fn it_returns_the_existing_value_for_present_keys() {
        // given
        let shard = shard(2);
        shard.insert("a", 1);

        // when
        let result = shard.put_if_absent("a", 2);

        // then
        assert_eq!(result, PutResult::Present(1));
        assert_eq!(shard.get("a"), Some(1));
    }

    #[test]
    fn it_promotes_keys_found_by_put_if_absent() {
        // given
        let shard = shard(2);
        shard.insert("a", 1);
        shard.insert("b", 2);

        // when
        let _ = shard.put_if_absent("a", 10);
        shard.insert("c", 3);

        // then
        assert!(shard.contains("a"));
        assert!(!shard.contains("b"));
        assert!(shard.contains("c"));
    }

    #[test]
    fn it_counts_hits_misses_and_evictions() {
        // given
        let shard = shard(1);
        shard.insert("a", 1);
        shard.get("a");
        shard.get("b");
        shard.insert("b", 2);
        shard.evict("b");
        let mut stats = Stats::default();

        // when
        shard.drain_counters(&mut stats);

        // then
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.eviction_count, 1);
        assert_eq!(shard.len(), 0);
    }

    #[test]
    fn it_never_exceeds_its_capacity() {
        // given
        let shard = shard(3);

        // when
        for key in ["a", "b", "c", "d", "e", "f"] {
            shard.insert(key, 0);
            assert!(shard.len() <= shard.capacity());
        }

        // then
        assert_eq!(shard.len(), 3);
    }

    #[test]
    fn it_inserts_exactly_once_under_contention() {
        // given
        let shard: Arc<Shard<u64, usize>> =
            Arc::new(Shard::with_capacity_and_hasher(16, RandomState::default()));
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        // when
        let handles: Vec<_> = (0..threads)
            .map(|value| {
                let shard = Arc::clone(&shard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    shard.put_if_absent(7, value)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // then
        let stored = shard.get(&7).unwrap();
        let inserted = results.iter().filter(|r| r.is_inserted()).count();
        assert_eq!(inserted, 1);
        for result in results {
            if let PutResult::Present(value) = result {
                assert_eq!(value, stored);
            }
        }
    }
}
