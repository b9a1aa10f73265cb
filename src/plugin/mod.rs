//! # Plugin Cache Tier
//!
//! Per-consumer caching of a single computed value, e.g. the full user or
//! group listing of one directory plugin.
//!
//! [`select_plugin_cache`] picks the strategy:
//!
//! - caching disabled → [`NullPluginCache`] (every read misses)
//! - consumer supplies its own handler → that handler (typically a
//!   [`VolatilePluginCache`])
//! - otherwise → [`RequestPluginCache`], scoped to the active request
//!
//! A miss is `None`; cached values of any shape (including `None`, `false`,
//! empty collections) come back as `Some(value)`.

pub mod clock;
pub mod request;
pub mod volatile;

use crate::constants::PLUGIN_KEY_NAMESPACE;
use tracing::trace;

pub use clock::{Clock, ManualClock, SystemClock};
pub use request::{ActiveRequest, RequestContext, RequestPluginCache};
pub use volatile::{VolatilePluginCache, VolatileStore};

/// Uniform get/set/invalidate contract of every plugin cache strategy
pub trait PluginCache<T>: Send + Sync {
    /// `None` means "not cached"
    fn get(&self) -> Option<T>;

    fn set(&self, value: T);

    fn invalidate(&self);
}

/// An object whose expensive result is cached by the plugin tier
pub trait CacheConsumer {
    type Value: Clone + Send + Sync + 'static;

    /// Stable identifier used to derive the cache key
    fn consumer_id(&self) -> &str;

    /// Custom cache handler overriding the request-scoped default
    fn cache_handler(&self) -> Option<PluginCacheHandle<Self::Value>> {
        None
    }
}

/// Cache key for a consumer: `"<namespace>_<consumer-id>_"`
pub fn plugin_cache_key(consumer_id: &str) -> String {
    format!("{}_{}_", PLUGIN_KEY_NAMESPACE, consumer_id)
}

/// Plugin cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPluginCache;

impl<T> PluginCache<T> for NullPluginCache {
    fn get(&self) -> Option<T> {
        None
    }

    fn set(&self, _value: T) {}

    fn invalidate(&self) {}
}

/// Strategy chosen by [`select_plugin_cache`]
pub enum PluginCacheHandle<T> {
    Null(NullPluginCache),
    Request(RequestPluginCache),
    Volatile(VolatilePluginCache<T>),
    Custom(Box<dyn PluginCache<T>>),
}

impl<T> PluginCacheHandle<T> {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Null(_) => "null",
            Self::Request(_) => "request",
            Self::Volatile(_) => "volatile",
            Self::Custom(_) => "custom",
        }
    }
}

impl<T> std::fmt::Debug for PluginCacheHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PluginCacheHandle")
            .field(&self.strategy_name())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> PluginCache<T> for PluginCacheHandle<T> {
    fn get(&self) -> Option<T> {
        match self {
            Self::Null(cache) => PluginCache::<T>::get(cache),
            Self::Request(cache) => PluginCache::<T>::get(cache),
            Self::Volatile(cache) => cache.get(),
            Self::Custom(cache) => cache.get(),
        }
    }

    fn set(&self, value: T) {
        match self {
            Self::Null(cache) => PluginCache::<T>::set(cache, value),
            Self::Request(cache) => PluginCache::<T>::set(cache, value),
            Self::Volatile(cache) => cache.set(value),
            Self::Custom(cache) => cache.set(value),
        }
    }

    fn invalidate(&self) {
        match self {
            Self::Null(cache) => PluginCache::<T>::invalidate(cache),
            Self::Request(cache) => PluginCache::<T>::invalidate(cache),
            Self::Volatile(cache) => cache.invalidate(),
            Self::Custom(cache) => cache.invalidate(),
        }
    }
}

/// Choose the plugin cache strategy for `consumer`
///
/// `caching_enabled == false` bypasses caching deterministically, which tests
/// and degraded-mode operation rely on.
pub fn select_plugin_cache<C>(consumer: &C, caching_enabled: bool) -> PluginCacheHandle<C::Value>
where
    C: CacheConsumer + ?Sized,
{
    let handle = if !caching_enabled {
        PluginCacheHandle::Null(NullPluginCache)
    } else if let Some(handler) = consumer.cache_handler() {
        handler
    } else {
        PluginCacheHandle::Request(RequestPluginCache::new(consumer.consumer_id()))
    };

    trace!(
        consumer = consumer.consumer_id(),
        strategy = handle.strategy_name(),
        "Selected plugin cache"
    );
    handle
}
