//! Logging decorator for cache services
//!
//! Wraps any [`CacheService`] and reports each lookup as HIT or MISS and each
//! write at debug level. Results are passed through untouched.

use crate::cache::traits::CacheService;
use crate::error::CacheResult;
use std::time::Duration;
use tracing::debug;

/// Cache service wrapper that emits HIT/MISS/SET events
#[derive(Debug, Clone)]
pub struct LoggingCache<S> {
    inner: S,
}

impl<S: CacheService> LoggingCache<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: CacheService> CacheService for LoggingCache<S> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self.inner.get(key)?;
        let result = if value.is_some() { "HIT" } else { "MISS" };
        debug!(
            key = %key,
            result = result,
            provider = self.inner.provider_name(),
            "Cache {} for key {}",
            result,
            key
        );
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        debug!(
            key = %key,
            provider = self.inner.provider_name(),
            "Setting value for key {}",
            key
        );
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.inner.delete(key)
    }

    fn disconnect(&self) -> CacheResult<()> {
        self.inner.disconnect()
    }

    fn expiration(&self) -> Duration {
        self.inner.expiration()
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
