use crate::cache::RandomState;
use crate::cache::recency_list::RecencyList;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Single-threaded map that keeps its keys in exact recency order.
///
/// `index` maps every cached key to its slot in `entries`; both always hold the same key set.
/// Inserting into a full map evicts the least recently used entry first.
#[derive(Debug)]
pub(crate) struct Lru<K, V, S = RandomState> {
    index: HashMap<K, usize, S>,
    entries: RecencyList<K, V>,
    capacity: usize,
}

impl<K, V, S> Lru<K, V, S> {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_mru(&self) -> Vec<&K> {
        self.entries.iter().map(|entry| entry.key()).collect()
    }
}

impl<K, V, S> Lru<K, V, S>
where
    S: BuildHasher,
{
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            index: HashMap::with_hasher(hash_builder),
            entries: RecencyList::with_capacity(capacity),
            capacity,
        }
    }
}

impl<K, V, S> Lru<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Inserts `key` at the most recently used position unless it is already cached.
    ///
    /// A key that is already present keeps both its value and its position. When the map is
    /// full, the least recently used entry is evicted and returned.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.index.contains_key(&key) {
            tracing::trace!("key already cached, insert ignored");
            return None;
        }

        let evicted = if self.entries.is_full() {
            self.evict_lru()
        } else {
            None
        };

        if let Some(slot) = self.entries.push_front(key.clone(), value) {
            self.index.insert(key, slot);
            tracing::trace!(len = self.entries.len(), "inserted key");
        }

        evicted
    }

    /// Returns the value for `key` and marks it as most recently used.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&slot) = self.index.get(key) else {
            tracing::trace!("key not found");
            return None;
        };
        self.entries.move_to_front(slot);
        self.entries.get(slot).map(|entry| entry.value())
    }

    /// Removes `key` if present.
    pub(crate) fn evict<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.index.remove(key)?;
        self.entries
            .remove(slot)
            .map(|entry| entry.into_key_value().1)
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        let entry = self.entries.pop_back()?;
        self.index.remove(entry.key());
        Some(entry.into_key_value())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, u16),
        Get(u8),
        Evict(u8),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            5 => (0u8..16, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
            4 => (0u8..16).prop_map(Op::Get),
            2 => (0u8..16).prop_map(Op::Evict),
            1 => Just(Op::Clear),
        ]
    }

    /// Reference model: front of the deque is the most recently used key.
    struct Model {
        capacity: usize,
        order: VecDeque<(u8, u16)>,
    }

    impl Model {
        fn position(&self, key: u8) -> Option<usize> {
            self.order.iter().position(|(k, _)| *k == key)
        }

        fn insert(&mut self, key: u8, value: u16) -> Option<(u8, u16)> {
            if self.position(key).is_some() {
                return None;
            }
            let evicted = if self.order.len() == self.capacity {
                self.order.pop_back()
            } else {
                None
            };
            self.order.push_front((key, value));
            evicted
        }

        fn get(&mut self, key: u8) -> Option<u16> {
            let position = self.position(key)?;
            let entry = self.order.remove(position)?;
            self.order.push_front(entry);
            Some(entry.1)
        }

        fn evict(&mut self, key: u8) -> Option<u16> {
            let position = self.position(key)?;
            self.order.remove(position).map(|(_, v)| v)
        }
    }

    proptest! {
        /// Property: every operation agrees with a naive recency-ordered model
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..8,
            ops in prop::collection::vec(op(), 0..200)
        ) {
            let mut lru: Lru<u8, u16> = Lru::with_capacity_and_hasher(capacity, RandomState::default());
            let mut model = Model { capacity, order: VecDeque::new() };

            for op in ops {
                match op {
                    Op::Insert(k, v) => prop_assert_eq!(lru.insert(k, v), model.insert(k, v)),
                    Op::Get(k) => prop_assert_eq!(lru.get(&k).copied(), model.get(k)),
                    Op::Evict(k) => prop_assert_eq!(lru.evict(&k), model.evict(k)),
                    Op::Clear => {
                        lru.clear();
                        model.order.clear();
                    }
                }

                prop_assert!(lru.len() <= capacity);
                let expected: Vec<u8> = model.order.iter().map(|(k, _)| *k).collect();
                let actual: Vec<u8> = lru.keys_mru().into_iter().copied().collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
