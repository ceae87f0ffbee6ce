//! In-memory response cache with TTL and bounded, insertion-ordered eviction.
//!
//! Expiry is lazy: a stale entry is dropped when it is next read, or when it
//! becomes the oldest entry and capacity pressure evicts it. There is no
//! background sweeper.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use sr_core::config::CacheConfig;
use sr_core::{Season, Suggestion, Title};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Namespaced cache key constructors. Free-text parts are trimmed and
/// lowercased so equivalent queries share an entry.
pub mod keys {
    pub fn title(title: &str) -> String {
        format!("title:{}", title.trim().to_lowercase())
    }

    pub fn season(series_id: &str, season_number: u32) -> String {
        format!("season:{series_id}:{season_number}")
    }

    pub fn suggest(query: &str) -> String {
        format!("suggest:{}", query.trim().to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Cached values
// ---------------------------------------------------------------------------

/// Everything the lookup handlers store in the shared cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResponse {
    Title(Title),
    Season(Season),
    Suggestions(Vec<Suggestion>),
}

/// Process-wide cache shared by all handlers.
pub type SharedCache = ResponseCache<CachedResponse>;

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
}

// ---------------------------------------------------------------------------
// ResponseCache
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    /// Insertion sequence number; the key into `CacheState::order`.
    seq: u64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order index: lowest sequence number is the oldest entry.
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

/// Thread-safe TTL cache holding at most `max_entries` values.
#[derive(Debug)]
pub struct ResponseCache<V> {
    state: Mutex<CacheState<V>>,
    max_entries: usize,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache with the given capacity and time-to-live.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: BTreeMap::new(),
                next_seq: 0,
            }),
            max_entries,
            ttl,
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, Duration::from_secs(config.ttl_secs))
    }

    /// Look up a live entry.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Look up a live entry as of `now`, dropping it if it has expired.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut state = self.state.lock();

        let expired = match state.entries.get(key) {
            None => {
                tracing::debug!(key, "Cache miss");
                return None;
            }
            Some(entry) => now.saturating_duration_since(entry.stored_at) > self.ttl,
        };

        if expired {
            if let Some(entry) = state.entries.remove(key) {
                state.order.remove(&entry.seq);
            }
            tracing::debug!(key, "Cache entry expired");
            return None;
        }

        tracing::debug!(key, "Cache hit");
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_at(key, value, Instant::now());
    }

    /// Store a value as of `now`.
    ///
    /// Overwriting an existing key moves it to the newest position. Inserting
    /// a new key into a full cache first evicts the oldest-inserted entry.
    pub fn set_at(&self, key: impl Into<String>, value: V, now: Instant) {
        if self.max_entries == 0 {
            return;
        }

        let key = key.into();
        let mut state = self.state.lock();

        if let Some(previous) = state.entries.remove(&key) {
            state.order.remove(&previous.seq);
        } else if state.entries.len() >= self.max_entries {
            if let Some((_, oldest)) = state.order.pop_first() {
                state.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "Cache full, evicted oldest entry");
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.insert(seq, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                seq,
            },
        );
    }

    /// Number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            max_size: self.max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn set_then_get_round_trips() {
        let cache = ResponseCache::new(10, DAY);
        cache.set("k", 42);
        assert_eq!(cache.get("k"), Some(42));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn full_cache_evicts_oldest_insert() {
        let cache = ResponseCache::new(3, DAY);
        let t0 = Instant::now();
        cache.set_at("a", 1, t0);
        cache.set_at("b", 2, t0);
        cache.set_at("c", 3, t0);

        // Reads do not refresh insertion order.
        assert_eq!(cache.get_at("a", t0), Some(1));

        cache.set_at("d", 4, t0);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_at("a", t0), None);
        assert_eq!(cache.get_at("b", t0), Some(2));
        assert_eq!(cache.get_at("d", t0), Some(4));
    }

    #[test]
    fn never_exceeds_capacity() {
        let cache = ResponseCache::new(5, DAY);
        for i in 0..50 {
            cache.set(format!("key-{i}"), i);
            assert!(cache.len() <= 5);
        }
        // The five most recent survive.
        for i in 45..50 {
            assert_eq!(cache.get(&format!("key-{i}")), Some(i));
        }
    }

    #[test]
    fn overwrite_moves_key_to_newest_position() {
        let cache = ResponseCache::new(2, DAY);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);

        assert_eq!(cache.len(), 2);
        cache.set("c", 3);

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let ttl = Duration::from_secs(60);
        let cache = ResponseCache::new(10, ttl);
        let t0 = Instant::now();
        cache.set_at("k", "v", t0);

        assert_eq!(cache.get_at("k", t0 + ttl), Some("v"));
        assert_eq!(cache.get_at("k", t0 + ttl + Duration::from_millis(1)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_key_can_be_set_again() {
        let cache = ResponseCache::new(10, DAY);
        let t0 = Instant::now();
        cache.set_at("k", 1, t0);

        let later = t0 + DAY + Duration::from_secs(1);
        assert_eq!(cache.get_at("k", later), None);

        cache.set_at("k", 2, later);
        assert_eq!(cache.get_at("k", later), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unread_expired_entries_still_count_toward_size() {
        let cache = ResponseCache::new(2, Duration::from_secs(1));
        let t0 = Instant::now();
        cache.set_at("old", 1, t0);

        let later = t0 + Duration::from_secs(10);
        cache.set_at("a", 2, later);
        assert_eq!(cache.len(), 2);

        cache.set_at("b", 3, later);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at("a", later), Some(2));
        assert_eq!(cache.get_at("b", later), Some(3));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = ResponseCache::new(0, DAY);
        cache.set("k", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn stats_report_size_and_capacity() {
        let cache = ResponseCache::new(1000, DAY);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 2,
                max_size: 1000
            }
        );
        assert!(!cache.is_empty());
    }

    #[test]
    fn keys_are_normalized() {
        assert_eq!(keys::title("  Breaking BAD "), "title:breaking bad");
        assert_eq!(keys::season("tt0903747", 3), "season:tt0903747:3");
        assert_eq!(keys::suggest("The Wi"), "suggest:the wi");
        assert_eq!(keys::title("Lost"), keys::title("lost"));
    }
}
