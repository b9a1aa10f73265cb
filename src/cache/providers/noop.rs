//! No-op cache provider
//!
//! Always misses, always succeeds. Backs the null connection handed out when no
//! endpoints are configured.

use crate::cache::traits::CacheService;
use crate::constants::DEFAULT_EXPIRATION_SECONDS;
use crate::error::CacheResult;
use std::time::Duration;

/// No-op cache service that never caches anything
#[derive(Debug, Clone, Default)]
pub struct NoOpCacheService;

impl NoOpCacheService {
    pub fn new() -> Self {
        Self
    }
}

impl CacheService for NoOpCacheService {
    fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> CacheResult<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    fn disconnect(&self) -> CacheResult<()> {
        Ok(())
    }

    fn expiration(&self) -> Duration {
        Duration::from_secs(DEFAULT_EXPIRATION_SECONDS)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
