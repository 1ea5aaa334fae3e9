//! LRU Cache Implementation

use crate::CacheError;
use std::collections::HashMap;

/// Sentinel for "no neighbor" in the recency list
const NIL: usize = usize::MAX;

struct Entry<V> {
    key: u32,
    value: V,
    prev: usize,
    next: usize,
}

/// Bounded key→value cache with exact LRU eviction.
///
/// The recency list is a doubly linked list threaded through an arena of
/// slots; `head` is most recently used, `tail` is the eviction victim. The
/// hash index maps each key to its arena slot, so `get` and `put` are O(1).
/// The cache owns every value it holds: overwrites and evictions drop the
/// previous value in place.
pub struct LruCache<V> {
    capacity: usize,
    slots: Vec<Option<Entry<V>>>,
    /// Arena slots vacated by eviction, reused before growing
    free: Vec<usize>,
    index: HashMap<u32, usize>,
    head: usize,
    tail: usize,
}

impl<V> LruCache<V> {
    /// Create a cache holding at most `capacity` entries (at least 1)
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: NIL,
            tail: NIL,
        })
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Capacity the cache was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when `key` is cached; does not touch recency
    pub fn contains(&self, key: u32) -> bool {
        self.index.contains_key(&key)
    }

    /// Look up `key`, promoting a hit to most recently used.
    ///
    /// A miss returns `None` and leaves the cache untouched.
    pub fn get(&mut self, key: u32) -> Option<&V> {
        let idx = *self.index.get(&key)?;
        self.detach(idx);
        self.push_front(idx);
        self.slots[idx].as_ref().map(|entry| &entry.value)
    }

    /// Insert or overwrite `key`.
    ///
    /// An existing entry has its old value dropped in place and is promoted
    /// to most recently used. Inserting a new key at capacity first evicts
    /// the least recently used entry, dropping its value.
    pub fn put(&mut self, key: u32, value: V) {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.slots[idx].as_mut() {
                entry.value = value;
            }
            self.detach(idx);
            self.push_front(idx);
            return;
        }

        if self.index.len() == self.capacity {
            self.evict_tail();
        }

        let entry = Entry {
            key,
            value,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.push_front(idx);
    }

    /// Keys in recency order, most recently used first
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors((self.head != NIL).then_some(self.head), move |&idx| {
            self.slots[idx]
                .as_ref()
                .and_then(|entry| (entry.next != NIL).then_some(entry.next))
        })
        .filter_map(move |idx| self.slots[idx].as_ref().map(|entry| entry.key))
    }

    fn evict_tail(&mut self) {
        let idx = self.tail;
        if idx == NIL {
            return;
        }
        self.detach(idx);
        if let Some(entry) = self.slots[idx].take() {
            self.index.remove(&entry.key);
        }
        self.free.push(idx);
    }

    /// Unlink `idx` from the recency list; the slot itself stays occupied
    fn detach(&mut self, idx: usize) {
        let (prev, next) = match &self.slots[idx] {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        if prev != NIL {
            if let Some(entry) = self.slots[prev].as_mut() {
                entry.next = next;
            }
        } else {
            self.head = next;
        }

        if next != NIL {
            if let Some(entry) = self.slots[next].as_mut() {
                entry.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        if let Some(entry) = self.slots[idx].as_mut() {
            entry.prev = NIL;
            entry.next = NIL;
        }
    }

    /// Link a detached `idx` in as the new head (most recently used)
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(entry) = self.slots[idx].as_mut() {
            entry.prev = NIL;
            entry.next = old_head;
        }
        if old_head != NIL {
            if let Some(entry) = self.slots[old_head].as_mut() {
                entry.prev = idx;
            }
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }
}
