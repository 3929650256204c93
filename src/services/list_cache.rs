use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;

/// Result pages keyed by their store id. A zero TTL disables the cache.
#[derive(Clone)]
pub struct ListCache<V> {
    ttl: Duration,
    entries: Arc<DashMap<String, (Instant, V)>>,
}

impl<V: Clone> ListCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, store_id: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let fresh = {
            let entry = self.entries.get(store_id)?;
            let (stored_at, value) = entry.value();
            (stored_at.elapsed() < self.ttl).then(|| value.clone())
        };
        if fresh.is_none() {
            self.entries.remove(store_id);
        }
        fresh
    }

    pub fn insert(&self, store_id: String, value: V) {
        if self.is_enabled() {
            self.entries.insert(store_id, (Instant::now(), value));
        }
    }

    /// Drops expired pages.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
