//! Bounded memoization cache for analysis results
//!
//! Keyed by file identity plus byte size, with least-recently-used eviction.
//! The cache is a plain value type; callers decide how it is shared (the
//! [`AnalysisService`](crate::analysis::service::AnalysisService) wraps it in
//! a mutex).

use crate::analysis::result::TrackAnalysis;
use std::collections::{HashMap, VecDeque};

/// Cache key: file identity (path or URI) plus byte size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Stable identity of the source file (path, URI, ...)
    pub identity: String,

    /// File size in bytes, to cheaply invalidate on rewrite
    pub size: u64,
}

impl CacheKey {
    /// Build a key from identity and size
    pub fn new(identity: impl Into<String>, size: u64) -> Self {
        Self {
            identity: identity.into(),
            size,
        }
    }
}

/// LRU-bounded analysis result cache
#[derive(Debug)]
pub struct MemoCache {
    capacity: usize,
    entries: HashMap<CacheKey, TrackAnalysis>,
    // Recency order, front = least recently used
    order: VecDeque<CacheKey>,
}

impl MemoCache {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Look up a result, refreshing its recency on hit
    pub fn get(&mut self, key: &CacheKey) -> Option<TrackAnalysis> {
        if let Some(result) = self.entries.get(key) {
            let result = result.clone();
            self.touch(key);
            Some(result)
        } else {
            None
        }
    }

    /// Insert or replace a result, evicting the least recently used entry
    /// when the cache is full
    pub fn insert(&mut self, key: CacheKey, result: TrackAnalysis) {
        if self.entries.insert(key.clone(), result).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                log::debug!("Memo cache evicted {:?}", oldest);
            } else {
                break;
            }
        }
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rate: u32) -> TrackAnalysis {
        TrackAnalysis::empty(rate)
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = MemoCache::new(4);
        let key = CacheKey::new("a.mp3", 1000);
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), result(44100));
        assert_eq!(cache.get(&key).map(|r| r.metadata.sample_rate), Some(44100));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_size_change_is_a_different_key() {
        let mut cache = MemoCache::new(4);
        cache.insert(CacheKey::new("a.mp3", 1000), result(44100));
        assert!(cache.get(&CacheKey::new("a.mp3", 2000)).is_none());
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = MemoCache::new(2);
        let a = CacheKey::new("a", 1);
        let b = CacheKey::new("b", 2);
        let c = CacheKey::new("c", 3);

        cache.insert(a.clone(), result(1));
        cache.insert(b.clone(), result(2));
        // Touch `a` so `b` becomes the eviction candidate
        cache.get(&a);
        cache.insert(c.clone(), result(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_replace_does_not_grow() {
        let mut cache = MemoCache::new(2);
        let a = CacheKey::new("a", 1);
        cache.insert(a.clone(), result(1));
        cache.insert(a.clone(), result(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&a).map(|r| r.metadata.sample_rate), Some(2));
    }

    #[test]
    fn test_clear() {
        let mut cache = MemoCache::new(2);
        cache.insert(CacheKey::new("a", 1), result(1));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped_to_one() {
        let mut cache = MemoCache::new(0);
        cache.insert(CacheKey::new("a", 1), result(1));
        assert_eq!(cache.len(), 1);
    }
}
