//! Process-wide page cache behind an injectable interface so the feed layer
//! can be stubbed deterministically in tests.
//!
//! Within the TTL a stale page is acceptable (an accepted staleness /
//! performance trade-off); `clear` is the correctness escape hatch.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A rendered response body ready to be replayed.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub content_type: String,
    pub body: Vec<u8>,
}

pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedPage>;
    fn set(&self, key: &str, page: CachedPage, ttl: Duration);
    fn clear(&self);
}

/// In-memory TTL cache keyed by request path + query.
#[derive(Default)]
pub struct MemoryPageCache {
    entries: DashMap<String, (Instant, CachedPage)>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, key: &str) -> Option<CachedPage> {
        match self.entries.get(key) {
            Some(entry) if entry.0 > Instant::now() => Some(entry.1.clone()),
            Some(_) => {
                drop(self.entries.remove(key));
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, page: CachedPage, ttl: Duration) {
        self.entries.insert(key.to_string(), (Instant::now() + ttl, page));
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
