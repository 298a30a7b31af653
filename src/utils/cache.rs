//! In-memory TTL cache for upstream query results.
//!
//! Entries are keyed by a composite string built from the query parameters
//! and stamped with the time they were stored. An entry older than the TTL
//! is treated as absent; it is not removed until it is overwritten (or
//! pushed out when a size bound is configured).
//!
//! Time comes from a [`Clock`] so expiry can be tested without sleeping.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

/// Source of the current time for cache stamping
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A stored value and when it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    /// Item was found and is valid
    Hit(T),

    /// Item was not found
    Miss,

    /// Item was found but has expired
    Expired,
}

impl<T> CacheResult<T> {
    /// The cached value, if it is still valid
    pub fn hit(self) -> Option<T> {
        match self {
            CacheResult::Hit(value) => Some(value),
            CacheResult::Miss | CacheResult::Expired => None,
        }
    }
}

/// Time-bounded memo of query results
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an unbounded cache on the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create an unbounded cache on the given clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: None,
            clock,
        }
    }

    /// Create a cache from configuration
    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(config.ttl(), clock).max_entries(config.max_entries)
    }

    /// Bound the number of stored entries (`None` means unbounded)
    pub fn max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.filter(|&n| n > 0);
        self
    }

    /// Validity window of an entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a key, distinguishing absent from expired
    pub fn lookup(&self, key: &str) -> CacheResult<V> {
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry) => {
                tracing::debug!("Cache HIT: {}", key);
                CacheResult::Hit(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!("Cache expired: {}", key);
                CacheResult::Expired
            }
            None => {
                tracing::debug!("Cache MISS: {}", key);
                CacheResult::Miss
            }
        }
    }

    /// Return the value for a key if it is younger than the TTL
    pub fn get(&self, key: &str) -> Option<V> {
        self.lookup(key).hit()
    }

    /// Store a value, overwriting any previous entry for the key
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let mut entries = self.lock();

        if let Some(limit) = self.max_entries {
            if !entries.contains_key(&key) && entries.len() >= limit {
                self.make_room(&mut entries, now);
            }
        }

        tracing::debug!("Cached: {}", key);
        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
            },
        );
    }

    /// Number of stored entries, including expired ones
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now().saturating_duration_since(entry.created_at) < self.ttl
    }

    /// Purge expired entries; if that frees nothing, evict the oldest one.
    fn make_room(&self, entries: &mut HashMap<String, CacheEntry<V>>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.created_at) < self.ttl);
        if entries.len() < before {
            tracing::debug!("Purged {} expired cache entries", before - entries.len());
            return;
        }

        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            tracing::debug!("Evicted oldest cache entry: {}", key);
            entries.remove(&key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("max_entries", &self.max_entries)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
