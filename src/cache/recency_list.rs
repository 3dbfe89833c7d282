use crate::cache::entry::Entry;

/// Doubly linked list of entries stored in at most `capacity` slots.
///
/// Entries are addressed by slot index, which stays stable while the entry is in the list. The
/// front is the most recently used entry, the back the least recently used one. Slots are
/// allocated on first use; `free` only holds slots that have been vacated.
#[derive(Debug)]
pub(crate) struct RecencyList<K, V> {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    capacity: usize,
    slots: Vec<Option<Entry<K, V>>>,
    free: Vec<usize>,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> RecencyList<K, V> {
        RecencyList {
            head: None,
            tail: None,
            len: 0,
            capacity,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    #[cfg(test)]
    pub(crate) fn front_index(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Entry<K, V>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Adds an entry at the most recently used end and returns its slot index.
    ///
    /// If every slot is taken, [None] is returned and the list is left untouched.
    pub(crate) fn push_front(&mut self, key: K, value: V) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let entry = Some(Entry::new(key, value));
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = entry;
                index
            }
            None => {
                self.slots.push(entry);
                self.slots.len() - 1
            }
        };
        self.attach_front(index);
        self.len += 1;
        Some(index)
    }

    /// Moves the entry at `index` to the most recently used end.
    ///
    /// Returns false if the slot is empty.
    pub(crate) fn move_to_front(&mut self, index: usize) -> bool {
        if self.head == Some(index) {
            return true;
        }
        if !self.detach(index) {
            return false;
        }
        self.attach_front(index);
        true
    }

    /// Unlinks the entry at `index` and frees its slot.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Entry<K, V>> {
        if !self.detach(index) {
            return None;
        }
        let entry = self.slots[index].take();
        self.free.push(index);
        self.len -= 1;
        entry
    }

    /// Removes and returns the least recently used entry.
    pub(crate) fn pop_back(&mut self) -> Option<Entry<K, V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Drops every entry. Only slots allocated so far are touched.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates from the most recently used to the least recently used entry.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    fn detach(&mut self, index: usize) -> bool {
        let Some(entry) = self.slots.get_mut(index).and_then(Option::as_mut) else {
            return false;
        };
        let (prev, next) = (entry.prev, entry.next);
        entry.unlink();

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }
        true
    }

    fn attach_front(&mut self, index: usize) {
        let old_head = self.head;
        if let Some(entry) = self.slots[index].as_mut() {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(old_head) => self.set_prev(old_head, Some(index)),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
    }

    fn set_prev(&mut self, index: usize, prev: Option<usize>) {
        if let Some(entry) = self.slots[index].as_mut() {
            entry.prev = prev;
        }
    }

    fn set_next(&mut self, index: usize, next: Option<usize>) {
        if let Some(entry) = self.slots[index].as_mut() {
            entry.next = next;
        }
    }
}

#[cfg(test)]
pub(crate) struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    next: Option<usize>,
}

#[cfg(test)]
impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.get(self.next?)?;
        self.next = entry.next;
        Some(entry)
    }
}
