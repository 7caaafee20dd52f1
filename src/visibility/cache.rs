use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::VisibilityRecord;

/// Shared TTL cache for visibility records. Every outcome that gets cached
/// (found, hidden, not found) carries the same fixed expiry; entries are
/// evicted lazily on read, never invalidated explicitly.
///
/// There is intentionally no per-key locking beyond the map's atomic
/// get/insert: concurrent first-time lookups for one key may each probe and
/// each write, converging on the same value.
pub struct VisibilityCache {
    entries: DashMap<String, (VisibilityRecord, Instant)>,
    ttl: Duration,
}

impl VisibilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<VisibilityRecord> {
        if let Some(entry) = self.entries.get(key) {
            let (record, stored_at) = entry.value();
            if stored_at.elapsed() < self.ttl {
                return Some(record.clone());
            }
        }
        // Expired entries are dropped on the next lookup.
        self.entries.remove_if(key, |_, (_, stored_at)| stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: String, record: VisibilityRecord) {
        self.entries.insert(key, (record, Instant::now()));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
