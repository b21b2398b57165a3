//! Cache-store liveness checks
//!
//! The resolver only needs to ask the backing key-value store whether a key
//! is still present. Any `Fn(&str) -> bool` works; `MemoryStore` is an
//! in-process LRU store for hosts that keep cached payloads in memory.

use kvcache_core::{Error, Result};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::trace;

/// Answers whether a cache key is still present in the backing store
pub trait LivenessCheck {
    fn exists(&self, key: &str) -> bool;
}

impl<F> LivenessCheck for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, key: &str) -> bool {
        self(key)
    }
}

/// Capacity-bounded in-memory key-value store with LRU eviction
pub struct MemoryStore {
    entries: Mutex<LruCache<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a store holding at most `capacity` keys
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Error::configuration("memory store capacity must be non-zero"))?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Create a store that never evicts on its own
    pub fn unbounded() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Store `value` under `key`. Returns the key evicted to make room, if any.
    pub fn put(&self, key: impl Into<String>, value: Vec<u8>) -> Option<String> {
        let key = key.into();
        let mut entries = self.entries.lock();
        match entries.push(key.clone(), value) {
            Some((evicted, _)) if evicted != key => {
                trace!(key = %evicted, "Evicted cache entry");
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Read a value, marking it as recently used
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    /// Remove `key`, as an external eviction would. Returns whether it was present.
    pub fn evict(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LivenessCheck for MemoryStore {
    fn exists(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }
}
