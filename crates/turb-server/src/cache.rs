//! Small concurrent TTL cache.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Entries expire `ttl` after insertion; at most `max_entries` are kept,
/// oldest evicted first.
pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Fresh value for `key`. A stale entry is removed on the way out.
    pub fn get(&self, key: &K) -> Option<V> {
        let stale = match self.entries.get(key) {
            Some(entry) if entry.0.elapsed() <= self.ttl => return Some(entry.1.clone()),
            Some(_) => true,
            None => false,
        };
        if stale {
            self.entries
                .remove_if(key, |_, (stored_at, _)| stored_at.elapsed() > self.ttl);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
        if self.entries.len() > self.max_entries {
            self.prune();
        }
    }

    /// Drop expired entries, then the oldest until within bounds.
    pub fn prune(&self) {
        self.entries
            .retain(|_, (stored_at, _)| stored_at.elapsed() <= self.ttl);
        if self.entries.len() <= self.max_entries {
            return;
        }

        let mut by_age: Vec<(K, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().0))
            .collect();
        by_age.sort_by_key(|(_, stored_at)| *stored_at);
        let excess = self.entries.len().saturating_sub(self.max_entries);
        for (key, _) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
