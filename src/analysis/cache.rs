//! Bounded cache of LLM summaries keyed by a content fingerprint.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// SHA-256 of `text`, hex encoded
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Least-recently-used cache from text fingerprint to summary
///
/// Holds at most `capacity` entries; inserting past capacity evicts the entry
/// that was read or written longest ago. A capacity of 0 disables caching.
#[derive(Debug)]
pub struct AnalysisCache {
    capacity: usize,
    tick: u64,
    // fingerprint -> (last use, summary)
    entries: HashMap<String, (u64, String)>,
}

impl AnalysisCache {
    /// Create an empty cache
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tick: 0,
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Cached summary for `text`, marking it as recently used
    pub fn get(&mut self, text: &str) -> Option<String> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(&fingerprint(text)).map(|(used, summary)| {
            *used = tick;
            summary.clone()
        })
    }

    /// Store the summary for `text`
    pub fn insert(&mut self, text: &str, summary: String) {
        if self.capacity == 0 {
            return;
        }
        self.tick += 1;
        let key = fingerprint(text);

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (used, _))| *used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(fingerprint = %oldest, "Evicting cached analysis");
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key, (self.tick, summary));
    }

    /// Number of cached summaries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }

    #[test]
    fn test_hit_after_insert() {
        let mut cache = AnalysisCache::new(2);
        assert!(cache.get("comments").is_none());

        cache.insert("comments", "summary".to_string());
        assert_eq!(cache.get("comments").as_deref(), Some("summary"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = AnalysisCache::new(2);
        cache.insert("first", "1".to_string());
        cache.insert("second", "2".to_string());

        // touch "first" so "second" becomes the oldest
        assert!(cache.get("first").is_some());
        cache.insert("third", "3".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("second").is_none());
        assert!(cache.get("first").is_some());
        assert!(cache.get("third").is_some());
    }

    #[test]
    fn test_reinsert_does_not_evict() {
        let mut cache = AnalysisCache::new(1);
        cache.insert("only", "v1".to_string());
        cache.insert("only", "v2".to_string());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("only").as_deref(), Some("v2"));
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = AnalysisCache::new(0);
        cache.insert("text", "summary".to_string());
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
    }
}
