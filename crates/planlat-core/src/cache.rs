//! Bounded FIFO memo cache.
//!
//! The benchmark-collection layer re-reads the same database's stored
//! telemetry repeatedly; this cache avoids recomputing those reads. It is an
//! explicit, injectable object, never ambient global state. Insertion-ordered,
//! capacity-bounded, evicts the oldest entry on overflow.

use std::collections::VecDeque;

pub struct FifoCache<K, V> {
    entries: VecDeque<(K, V)>,
    capacity: usize,
}

impl<K: PartialEq, V> FifoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert without looking up; evicts the oldest entry past capacity.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.push_back((key, value));
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            tracing::debug!("evicting oldest cache entry");
        }
    }

    /// Memoized lookup: compute and cache on miss.
    pub fn get_or_insert_with<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> std::result::Result<V, E>,
    ) -> std::result::Result<&V, E> {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            return Ok(&self.entries[pos].1);
        }
        let value = compute()?;
        self.insert(key, value);
        // capacity is at least 1, so the new entry survives the insert
        let newest = self.entries.len() - 1;
        Ok(&self.entries[newest].1)
    }
}
