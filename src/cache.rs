use crate::Stats;
use crate::error::ConfigError;
use parking_lot::Mutex;
use shard::Shard;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::time::Instant;

mod entry;
mod lru;
mod recency_list;
mod shard;
pub(crate) mod stats;

pub(crate) type RandomState = ahash::RandomState;

/// Shard exponent used by [`Cache::with_capacity`], giving 16 shards.
pub const DEFAULT_BUCKETS_EXP: u32 = 4;

/// Outcome of [`Cache::put_if_absent`].
#[must_use]
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PutResult<V> {
    /// The key was absent and this call stored the given value.
    Inserted,
    /// The key was already cached; holds the stored value, which was left unchanged.
    Present(V),
}

impl<V> PutResult<V> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, PutResult::Inserted)
    }

    /// Returns the value that was already cached, if any.
    pub fn into_present(self) -> Option<V> {
        match self {
            PutResult::Inserted => None,
            PutResult::Present(value) => Some(value),
        }
    }
}

/// Thread-safe LRU cache split into `2^buckets_exp` independently locked shards.
///
/// Each key lives in exactly one shard, chosen by hashing the key or by an explicit hint (see
/// [`Cache::insert_with_hint`]). Every shard evicts in exact LRU order within its own slice of
/// the capacity; there is no global LRU order across shards.
///
/// Wrap the cache in a [`std::sync::Arc`] to share it between threads. All operations only
/// require a shared reference. Lookups promote the key, so reads and writes take the same
/// exclusive shard lock.
#[derive(Debug)]
pub struct Cache<K, V, S = RandomState> {
    hash_builder: S,
    shards: Vec<Shard<K, V, S>>,
    capacity: usize,
    buckets_exp: u32,
    metrics_last_accessed: Mutex<Instant>,
}

impl<K, V> Cache<K, V, RandomState> {
    /// Creates a cache holding at most `capacity` entries across [`DEFAULT_BUCKETS_EXP`] shards.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not greater than the number of shards.
    pub fn with_capacity(capacity: usize) -> Cache<K, V, RandomState> {
        Cache::new(capacity, DEFAULT_BUCKETS_EXP)
    }

    /// Creates a cache holding at most `capacity` entries across `2^buckets_exp` shards.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected by [`Cache::try_new`].
    pub fn new(capacity: usize, buckets_exp: u32) -> Cache<K, V, RandomState> {
        Cache::with_hasher(capacity, buckets_exp, Default::default())
    }

    /// Creates a cache holding at most `capacity` entries across `2^buckets_exp` shards.
    ///
    /// `buckets_exp` must be at least 1 and `capacity` must be greater than `2^buckets_exp`.
    /// Values are never clamped; an invalid configuration is returned as a [`ConfigError`].
    pub fn try_new(
        capacity: usize,
        buckets_exp: u32,
    ) -> Result<Cache<K, V, RandomState>, ConfigError> {
        Cache::try_with_hasher(capacity, buckets_exp, Default::default())
    }
}

impl<K, V, S> Cache<K, V, S>
where
    S: Clone + BuildHasher,
{
    /// Like [`Cache::new`], using `hash_builder` to hash the keys.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected by [`Cache::try_with_hasher`].
    pub fn with_hasher(capacity: usize, buckets_exp: u32, hash_builder: S) -> Cache<K, V, S> {
        match Cache::try_with_hasher(capacity, buckets_exp, hash_builder) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }

    /// Like [`Cache::try_new`], using `hash_builder` to hash the keys.
    pub fn try_with_hasher(
        capacity: usize,
        buckets_exp: u32,
        hash_builder: S,
    ) -> Result<Cache<K, V, S>, ConfigError> {
        if buckets_exp == 0 || buckets_exp >= usize::BITS {
            return Err(ConfigError::BucketsExp { buckets_exp });
        }

        let number_of_shards = 1usize << buckets_exp;
        if capacity <= number_of_shards {
            return Err(ConfigError::CapacityTooSmall {
                capacity,
                shards: number_of_shards,
            });
        }

        // The last shard takes whatever the even split leaves over.
        let capacity_per_shard = capacity >> buckets_exp;
        let last_shard_capacity = capacity - capacity_per_shard * (number_of_shards - 1);

        let mut shards = Vec::with_capacity(number_of_shards);
        for _ in 0..number_of_shards - 1 {
            shards.push(Shard::with_capacity_and_hasher(
                capacity_per_shard,
                hash_builder.clone(),
            ));
        }
        shards.push(Shard::with_capacity_and_hasher(
            last_shard_capacity,
            hash_builder.clone(),
        ));

        tracing::debug!(
            capacity,
            shards = number_of_shards,
            capacity_per_shard,
            last_shard_capacity,
            "created sharded LRU cache"
        );

        Ok(Self {
            hash_builder,
            shards,
            capacity,
            buckets_exp,
            metrics_last_accessed: Mutex::new(Instant::now()),
        })
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// Returns true if the key is cached. Does not change its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key, None).contains(key)
    }

    /// Like [`Cache::contains`], looking only in the shard selected by `hint`.
    pub fn contains_with_hint<Q>(&self, key: &Q, hint: usize) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key, Some(hint)).contains(key)
    }

    /// Inserts a key-value pair as the most recently used entry of its shard.
    ///
    /// If the key is already cached, nothing happens: the stored value is kept and its recency
    /// is not refreshed. Use [`Cache::put_if_absent`] to learn whether the insert took place.
    /// A full shard evicts its least recently used entry first.
    pub fn insert(&self, key: K, value: V) {
        self.shard(&key, None).insert(key, value)
    }

    /// Like [`Cache::insert`], storing the entry in the shard selected by `hint`.
    ///
    /// The shard index is `hint & (shard_count - 1)`; the key is not hashed. Callers must use the
    /// same hint for every later call on this key, otherwise the key will be looked up in the
    /// wrong shard.
    pub fn insert_with_hint(&self, key: K, value: V, hint: usize) {
        self.shard(&key, Some(hint)).insert(key, value)
    }

    /// Returns the value corresponding to the key and marks it as most recently used.
    ///
    /// This method clones the value when returning it. Consider wrapping your values in
    /// [`std::sync::Arc`] if cloning is too expensive for your use-case.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key, None).get(key)
    }

    /// Like [`Cache::get`], looking only in the shard selected by `hint`.
    pub fn get_with_hint<Q>(&self, key: &Q, hint: usize) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key, Some(hint)).get(key)
    }

    /// Inserts the pair if the key is absent, as a single step under the shard lock.
    ///
    /// Returns [`PutResult::Inserted`] if this call stored `value`. Otherwise `value` is
    /// discarded, the cached entry is promoted and its value is returned in
    /// [`PutResult::Present`].
    pub fn put_if_absent(&self, key: K, value: V) -> PutResult<V> {
        self.shard(&key, None).put_if_absent(key, value)
    }

    /// Like [`Cache::put_if_absent`], using the shard selected by `hint`.
    pub fn put_if_absent_with_hint(&self, key: K, value: V, hint: usize) -> PutResult<V> {
        self.shard(&key, Some(hint)).put_if_absent(key, value)
    }

    /// Removes the key, returning its value if it was cached.
    pub fn evict<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key, None).evict(key)
    }

    /// Like [`Cache::evict`], looking only in the shard selected by `hint`.
    pub fn evict_with_hint<Q>(&self, key: &Q, hint: usize) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key, Some(hint)).evict(key)
    }

    fn shard<Q>(&self, key: &Q, hint: Option<usize>) -> &Shard<K, V, S>
    where
        Q: ?Sized + Hash,
    {
        &self.shards[self.shard_index(key, hint)]
    }

    fn shard_index<Q>(&self, key: &Q, hint: Option<usize>) -> usize
    where
        Q: ?Sized + Hash,
    {
        let mask = self.shards.len() - 1;
        match hint {
            Some(hint) => hint & mask,
            None => {
                // Shard maps index their tables by the low hash bits, so route on the high ones.
                let hash = self.hash_builder.hash_one(key).rotate_left(32);
                hash as usize & mask
            }
        }
    }
}

impl<K, V, S> Cache<K, V, S> {
    /// Removes every entry, one shard at a time.
    ///
    /// Each shard is cleared under its own lock, so concurrent callers may observe a partially
    /// cleared cache.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
        tracing::debug!(shards = self.shards.len(), "cleared cache");
    }

    /// Number of cached entries, summed shard by shard.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    /// Maximum number of entries across all shards.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn buckets_exp(&self) -> u32 {
        self.buckets_exp
    }

    /// Returns the counters collected since the previous call and resets them.
    ///
    /// Shards are drained one after another, so the counts are not a consistent snapshot while
    /// other threads keep using the cache.
    pub fn stats(&self) -> Stats {
        let now = Instant::now();
        let since = std::mem::replace(&mut *self.metrics_last_accessed.lock(), now);

        let mut stats = Stats {
            millis_elapsed: now.duration_since(since).as_millis(),
            ..Stats::default()
        };
        self.shards
            .iter()
            .for_each(|shard| shard.drain_counters(&mut stats));

        stats
    }

    #[cfg(test)]
    pub(crate) fn shard_capacities(&self) -> Vec<usize> {
        self.shards.iter().map(Shard::capacity).collect()
    }

    #[cfg(test)]
    pub(crate) fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(Shard::len).collect()
    }
}
