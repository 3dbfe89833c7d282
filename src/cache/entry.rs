/// A cached key-value pair plus its links in the recency list.
///
/// `prev` points towards the most recently used end, `next` towards the least recently used end.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    key: K,
    value: V,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    pub(crate) fn into_key_value(self) -> (K, V) {
        (self.key, self.value)
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn unlink(&mut self) {
        self.prev = None;
        self.next = None;
    }
}
