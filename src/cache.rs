//! Response cache for generated recipes.
//!
//! [`ResponseCache`] maps a prompt to the envelope produced for it, so a
//! repeated prompt within the TTL window is served without a provider call.
//! Keys are the exact, unmodified prompt text — byte-for-byte, no
//! case/whitespace normalization and no fuzzy matching: "Eggs" and "eggs"
//! are distinct entries.
//!
//! Entries expire after the TTL (default 1 hour); expiry is enforced lazily
//! when an entry is touched, not by a background sweep. The store has no
//! entry-count cap; memory growth is bounded only by the TTL and prompt
//! diversity, a known scaling limitation.
//!
//! Concurrent inserts for the same key are not deduplicated: if two
//! concurrent misses both complete generation, the second insert overwrites
//! the first (last-writer-wins). Values for one key are expected to be
//! equivalent, so this is tolerable, but there is no at-most-once generation
//! guarantee per key.

use std::time::Duration;

use crate::envelope::RecipeEnvelope;
use crate::telemetry;

/// Configuration for the response cache.
///
/// ```rust
/// # use mirepoix::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new().ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// In-memory prompt → envelope cache.
pub struct ResponseCache {
    entries: moka::sync::Cache<String, RecipeEnvelope>,
}

impl ResponseCache {
    /// Create a cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        // No max_capacity: the entry count is unbounded.
        let entries = moka::sync::Cache::builder()
            .time_to_live(config.ttl)
            .build();
        Self { entries }
    }

    /// Look up the envelope cached for a prompt.
    ///
    /// Returns `None` on miss, including when the entry has outlived the
    /// TTL. Emits cache hit/miss metrics.
    pub fn get(&self, prompt: &str) -> Option<RecipeEnvelope> {
        match self.entries.get(prompt) {
            Some(envelope) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(envelope)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert (or overwrite) the envelope for a prompt.
    pub fn insert(&self, prompt: impl Into<String>, envelope: RecipeEnvelope) {
        self.entries.insert(prompt.into(), envelope);
    }

    /// Number of entries currently in the cache.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> RecipeEnvelope {
        RecipeEnvelope::from_text(text)
    }

    #[test]
    fn miss_returns_none() {
        let cache = ResponseCache::default();
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn insert_then_get() {
        let cache = ResponseCache::default();
        cache.insert("eggs, milk", envelope("omelette"));

        let hit = cache.get("eggs, milk").expect("expected a hit");
        assert_eq!(hit.content[0].text, "omelette");
    }

    #[test]
    fn keys_are_exact_no_case_folding() {
        let cache = ResponseCache::default();
        cache.insert("Eggs", envelope("a"));

        assert!(cache.get("eggs").is_none());
        assert!(cache.get("Eggs").is_some());
    }

    #[test]
    fn keys_are_exact_no_whitespace_normalization() {
        let cache = ResponseCache::default();
        cache.insert("eggs, milk", envelope("a"));

        assert!(cache.get("eggs,  milk").is_none());
        assert!(cache.get(" eggs, milk").is_none());
    }

    #[test]
    fn insert_overwrites_last_writer_wins() {
        let cache = ResponseCache::default();
        cache.insert("eggs", envelope("first"));
        cache.insert("eggs", envelope("second"));

        assert_eq!(cache.get("eggs").unwrap().content[0].text, "second");
    }

    #[test]
    fn expired_entry_reads_as_miss() {
        let cache = ResponseCache::new(&CacheConfig::new().ttl(Duration::from_millis(50)));
        cache.insert("eggs", envelope("omelette"));
        assert!(cache.get("eggs").is_some());

        std::thread::sleep(Duration::from_millis(120));
        assert!(cache.get("eggs").is_none());
    }

    #[test]
    fn overwrite_after_expiry_serves_the_new_value() {
        let cache = ResponseCache::new(&CacheConfig::new().ttl(Duration::from_millis(50)));
        cache.insert("eggs", envelope("stale"));
        std::thread::sleep(Duration::from_millis(120));

        cache.insert("eggs", envelope("fresh"));
        assert_eq!(cache.get("eggs").unwrap().content[0].text, "fresh");
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(ResponseCache::default());
        let mut handles = Vec::new();

        for i in 0..10 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                cache.insert(format!("prompt-{i}"), RecipeEnvelope::from_text("x"));
            }));
        }
        for i in 0..10 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                // May or may not see the entry yet — shouldn't panic
                let _ = cache.get(&format!("prompt-{i}"));
            }));
        }

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        for i in 0..10 {
            assert!(cache.get(&format!("prompt-{i}")).is_some());
        }
    }
}
