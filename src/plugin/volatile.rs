//! Volatile (short TTL) plugin cache
//!
//! Entries live in a side table owned by the consumer rather than in the
//! request, so they survive across requests until they age out. This absorbs
//! bursts of identical lookups, e.g. one page render asking for the same
//! group listing many times.
//!
//! ```text
//! Empty --set--> Fresh --max age elapses--> Stale (reads miss) --set--> Fresh
//!   ^                                          |
//!   +---------------- invalidate --------------+
//! ```

use super::clock::{Clock, SystemClock};
use super::{plugin_cache_key, PluginCache};
use crate::config::CacheSettings;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct VolatileEntry<T> {
    created_at: DateTime<Utc>,
    value: T,
}

/// Side table of timestamped values keyed by consumer cache key
pub struct VolatileStore<T> {
    entries: DashMap<String, VolatileEntry<T>>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl<T> std::fmt::Debug for VolatileStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolatileStore")
            .field("entries", &self.entries.len())
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> VolatileStore<T> {
    pub fn new(max_age: Duration) -> Arc<Self> {
        Self::with_clock(max_age, Arc::new(SystemClock))
    }

    /// Store aged by `volatile_max_age_seconds` from `settings`
    pub fn from_settings(settings: &CacheSettings) -> Arc<Self> {
        Self::new(settings.volatile_max_age())
    }

    pub fn with_clock(max_age: Duration, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            entries: DashMap::new(),
            max_age,
            clock,
        })
    }

    /// Cache handle for one consumer
    pub fn handle(self: &Arc<Self>, consumer_id: &str) -> VolatilePluginCache<T> {
        VolatilePluginCache {
            store: Arc::clone(self),
            key: plugin_cache_key(consumer_id),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        // a clock that moved backwards counts as fresh
        let expired = match (self.clock.now() - entry.created_at).to_std() {
            Ok(age) => age > self.max_age,
            Err(_) => false,
        };
        if expired {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: T) {
        self.entries.insert(
            key.to_string(),
            VolatileEntry {
                created_at: self.clock.now(),
                value,
            },
        );
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Volatile cache handle bound to one consumer key
pub struct VolatilePluginCache<T> {
    store: Arc<VolatileStore<T>>,
    key: String,
}

impl<T> Clone for VolatilePluginCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
        }
    }
}

impl<T> std::fmt::Debug for VolatilePluginCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolatilePluginCache")
            .field("key", &self.key)
            .field("store", &self.store)
            .finish()
    }
}

impl<T> VolatilePluginCache<T> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T: Clone + Send + Sync + 'static> PluginCache<T> for VolatilePluginCache<T> {
    fn get(&self) -> Option<T> {
        self.store.get(&self.key)
    }

    fn set(&self, value: T) {
        self.store.set(&self.key, value);
    }

    fn invalidate(&self) {
        self.store.invalidate(&self.key);
    }
}
